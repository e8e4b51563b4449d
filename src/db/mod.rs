pub mod context_requests;
pub mod custom_fields;
pub mod documents;
pub mod projects;
pub mod versions;
