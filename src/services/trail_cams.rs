use crate::{
    attachments::PhotoStore,
    db::{with_transaction, DbPool},
    entities::trail_cam_capture::{self, Entity as TrailCamCapture},
    errors::ServiceError,
    reports::{self, ExportFormat},
};
use chrono::Utc;
use sea_orm::{entity::*, query::*};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::non_blank;

/// A batch of frames pulled from one camera.
#[derive(Debug, Clone, Validate)]
pub struct NewCaptures {
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "At least one photo is required"))]
    pub photos: Vec<PathBuf>,
    pub notes: Option<String>,
}

/// Trail camera capture log
#[derive(Clone)]
pub struct TrailCamService {
    db_pool: Arc<DbPool>,
    photos: PhotoStore,
}

impl TrailCamService {
    pub fn new(db_pool: Arc<DbPool>, photos: PhotoStore) -> Self {
        Self { db_pool, photos }
    }

    /// Stores one capture per photo. Either every capture is recorded or none is.
    #[instrument(skip(self, request), fields(location = %request.location, photos = request.photos.len()))]
    pub async fn add_captures(
        &self,
        request: NewCaptures,
    ) -> Result<Vec<trail_cam_capture::Model>, ServiceError> {
        request.validate()?;

        let mut stored: Vec<String> = Vec::with_capacity(request.photos.len());
        for src in &request.photos {
            match self.photos.store(src, "trailcam").await {
                Ok(path) => stored.push(path),
                Err(e) => {
                    self.discard_all(&stored).await;
                    return Err(e);
                }
            }
        }

        let location = request.location.trim().to_string();
        let notes = non_blank(request.notes);
        let captured_at = Utc::now();
        let paths = stored.clone();
        let result = with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let mut captures = Vec::with_capacity(paths.len());
                for path in paths {
                    let model = trail_cam_capture::ActiveModel {
                        location: Set(location.clone()),
                        photo_path: Set(path),
                        notes: Set(notes.clone()),
                        captured_at: Set(captured_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    captures.push(model);
                }
                Ok(captures)
            })
        })
        .await;

        match result {
            Ok(captures) => {
                info!(count = captures.len(), "Trail camera captures stored");
                Ok(captures)
            }
            Err(e) => {
                self.discard_all(&stored).await;
                Err(e)
            }
        }
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn list_captures(&self) -> Result<Vec<trail_cam_capture::Model>, ServiceError> {
        let rows = TrailCamCapture::find()
            .order_by_desc(trail_cam_capture::Column::CapturedAt)
            .order_by_desc(trail_cam_capture::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn export_captures(&self, format: ExportFormat) -> Result<Vec<u8>, ServiceError> {
        let rows = self.list_captures().await?;
        info!(rows = rows.len(), %format, "Exporting trail camera captures");
        reports::render(format, "Trail Camera Report", &rows)
    }

    async fn discard_all(&self, paths: &[String]) {
        for path in paths {
            self.photos.discard(path).await;
        }
    }
}
