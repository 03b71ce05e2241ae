#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use site_safety::{
    attachments::PhotoStore,
    config::AppConfig,
    db::{self, DbPool},
    notifications::InMemoryNotificationSink,
    AppServices,
};
use tempfile::TempDir;

/// Services backed by a private in-memory SQLite database and a temporary
/// attachments directory.
pub struct TestApp {
    pub services: AppServices,
    pub db: Arc<DbPool>,
    pub notifications: InMemoryNotificationSink,
    pub attachments: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".to_string());
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(pool);

        let attachments = tempfile::tempdir().expect("failed to create attachments dir");
        let notifications = InMemoryNotificationSink::new();
        let services = AppServices::new(
            db.clone(),
            PhotoStore::new(attachments.path()),
            Arc::new(notifications.clone()),
        );

        Self {
            services,
            db,
            notifications,
            attachments,
        }
    }

    /// Writes a small fake image outside the `images/` directory.
    pub fn sample_photo(&self, name: &str) -> PathBuf {
        let dir = self.attachments.path().join("incoming");
        std::fs::create_dir_all(&dir).expect("failed to create incoming dir");
        let path = dir.join(name);
        std::fs::write(&path, b"\x89PNG fake image").expect("failed to write sample photo");
        path
    }

    pub fn attachment_exists(&self, relative: &str) -> bool {
        self.attachments.path().join(relative).is_file()
    }

    pub fn stored_photo_count(&self) -> usize {
        std::fs::read_dir(self.attachments.path().join("images"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
