use std::sync::Arc;

use common::storage::UploadStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::vision::VisionClient;

/// Handles shared by every request. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub uploads: Arc<dyn UploadStore>,
    pub vision: Arc<dyn VisionClient>,
}
