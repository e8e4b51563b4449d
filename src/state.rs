use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::storage::UploadStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub uploads: UploadStore,
}
