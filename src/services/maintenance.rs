use crate::{
    attachments::PhotoStore,
    db::DbPool,
    entities::maintenance_log::{self, Entity as MaintenanceLog},
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

#[derive(Debug, Clone, Validate)]
pub struct NewMaintenance {
    #[validate(length(min = 1, message = "Equipment is required"))]
    pub equipment: String,
    #[validate(length(min = 1, message = "Issue is required"))]
    pub issue: String,
    pub done: bool,
    pub notes: Option<String>,
    pub photo: Option<PathBuf>,
}

/// Equipment fault log
#[derive(Clone)]
pub struct MaintenanceService {
    db_pool: Arc<DbPool>,
    photos: PhotoStore,
}

impl MaintenanceService {
    pub fn new(db_pool: Arc<DbPool>, photos: PhotoStore) -> Self {
        Self { db_pool, photos }
    }

    #[instrument(skip(self, request), fields(equipment = %request.equipment))]
    pub async fn log_maintenance(
        &self,
        request: NewMaintenance,
    ) -> Result<maintenance_log::Model, ServiceError> {
        request.validate()?;

        let photo_path = match &request.photo {
            Some(src) => Some(self.photos.store(src, "maintenance").await?),
            None => None,
        };

        let active = maintenance_log::ActiveModel {
            equipment: Set(request.equipment.trim().to_string()),
            issue: Set(request.issue),
            done: Set(request.done),
            notes: Set(non_blank(request.notes)),
            photo_path: Set(photo_path.clone()),
            reported_at: Set(Utc::now()),
            ..Default::default()
        };

        match active.insert(&*self.db_pool).await {
            Ok(model) => {
                info!(maintenance_id = model.id, "Maintenance issue logged");
                Ok(model)
            }
            Err(e) => {
                if let Some(path) = photo_path {
                    self.photos.discard(&path).await;
                }
                Err(e.into())
            }
        }
    }

    /// Marks an entry resolved. Marking a resolved entry again is a no-op.
    #[instrument(skip(self))]
    pub async fn mark_maintenance_done(
        &self,
        id: i32,
    ) -> Result<maintenance_log::Model, ServiceError> {
        let existing = MaintenanceLog::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Maintenance entry", id))?;
        if existing.done {
            return Ok(existing);
        }

        let mut active: maintenance_log::ActiveModel = existing.into();
        active.done = Set(true);
        let model = active.update(&*self.db_pool).await?;
        info!(maintenance_id = id, "Maintenance issue resolved");
        Ok(model)
    }

    /// Newest first, optionally only open (`Some(false)`) or resolved entries.
    #[instrument(skip(self))]
    pub async fn list_maintenance(
        &self,
        done: Option<bool>,
    ) -> Result<Vec<maintenance_log::Model>, ServiceError> {
        let mut query = MaintenanceLog::find();
        if let Some(done) = done {
            query = query.filter(maintenance_log::Column::Done.eq(done));
        }
        let rows = query
            .order_by_desc(maintenance_log::Column::ReportedAt)
            .order_by_desc(maintenance_log::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn export_maintenance(
        &self,
        done: Option<bool>,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ServiceError> {
        let rows = self.list_maintenance(done).await?;
        info!(rows = rows.len(), %format, "Exporting maintenance log");
        reports::render(format, "Maintenance Report", &rows)
    }
}
