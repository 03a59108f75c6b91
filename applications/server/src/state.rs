/// Shared application state
use crate::services::AuthService;
use musicify_core::{MetadataLookup, ObjectUploader};
use musicify_storage::Database;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth_service: Arc<AuthService>,
    pub uploader: Arc<dyn ObjectUploader>,
    /// Absent when third-party lookup is disabled
    pub metadata: Option<Arc<dyn MetadataLookup>>,
}

impl AppState {
    pub fn new(
        db: Database,
        auth_service: Arc<AuthService>,
        uploader: Arc<dyn ObjectUploader>,
    ) -> Self {
        Self {
            db,
            auth_service,
            uploader,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataLookup>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }
}
