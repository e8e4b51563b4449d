pub mod context_request;
pub mod custom_field;
pub mod document;
pub mod project;
pub mod vocabulary;
pub mod version;

pub use context_request::ContextRequest;
pub use custom_field::CustomField;
pub use document::Document;
pub use project::Project;
pub use version::{NewVersion, ProjectVersion};
pub use vocabulary::{Approval, ImprovementSize};
