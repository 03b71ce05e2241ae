use crate::{
    attachments::PhotoStore,
    db::DbPool,
    entities::{
        incident::{self, Entity as Incident},
        shift::{self, Entity as Shift},
    },
    errors::ServiceError,
    reports::{self, ExportFormat},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::*, query::*};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::{day_bounds, validate_coordinates};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewShift {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Time slot is required"))]
    pub time_slot: String,
    #[validate(length(min = 1, message = "Crew is required"))]
    pub crew: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewIncident {
    pub shift_id: i32,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub description: String,
    pub photo: Option<PathBuf>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Defaults to the time of logging.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewIncident {
    pub fn new(shift_id: i32, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            shift_id,
            category: category.into(),
            description: description.into(),
            photo: None,
            latitude: None,
            longitude: None,
            occurred_at: None,
        }
    }
}

/// Patrol roster and incident log
#[derive(Clone)]
pub struct PatrolService {
    db_pool: Arc<DbPool>,
    photos: PhotoStore,
}

impl PatrolService {
    pub fn new(db_pool: Arc<DbPool>, photos: PhotoStore) -> Self {
        Self { db_pool, photos }
    }

    #[instrument(skip(self, request), fields(date = %request.date))]
    pub async fn add_shift(&self, request: NewShift) -> Result<shift::Model, ServiceError> {
        request.validate()?;
        let model = shift::ActiveModel {
            date: Set(request.date),
            time_slot: Set(request.time_slot.trim().to_string()),
            crew: Set(request.crew.trim().to_string()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(shift_id = model.id, "Shift scheduled");
        Ok(model)
    }

    /// Removes the shift only. Incidents that reference it keep their `shift_id`.
    #[instrument(skip(self))]
    pub async fn delete_shift(&self, id: i32) -> Result<(), ServiceError> {
        let result = Shift::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Shift", id));
        }
        info!(shift_id = id, "Shift deleted");
        Ok(())
    }

    /// Shifts on `date`, by time slot.
    #[instrument(skip(self))]
    pub async fn list_shifts_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<shift::Model>, ServiceError> {
        let shifts = Shift::find()
            .filter(shift::Column::Date.eq(date))
            .order_by_asc(shift::Column::TimeSlot)
            .order_by_asc(shift::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(shifts)
    }

    /// Logs an incident. `shift_id` is stored as given without checking that
    /// the shift exists.
    #[instrument(skip(self, request), fields(shift_id = request.shift_id))]
    pub async fn log_incident(&self, request: NewIncident) -> Result<incident::Model, ServiceError> {
        request.validate()?;
        validate_coordinates(request.latitude, request.longitude)?;

        let photo_path = match &request.photo {
            Some(src) => Some(self.photos.store(src, "incident").await?),
            None => None,
        };

        let active = incident::ActiveModel {
            shift_id: Set(request.shift_id),
            category: Set(request.category.trim().to_string()),
            description: Set(request.description),
            photo_path: Set(photo_path.clone()),
            latitude: Set(request.latitude),
            longitude: Set(request.longitude),
            occurred_at: Set(request.occurred_at.unwrap_or_else(Utc::now)),
            ..Default::default()
        };

        match active.insert(&*self.db_pool).await {
            Ok(model) => {
                info!(incident_id = model.id, category = %model.category, "Incident logged");
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

    /// Incidents that occurred on `date` (UTC), oldest first.
    #[instrument(skip(self))]
    pub async fn list_incidents_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<incident::Model>, ServiceError> {
        let (start, end) = day_bounds(date);
        let mut query = Incident::find().filter(incident::Column::OccurredAt.gte(start));
        if let Some(end) = end {
            query = query.filter(incident::Column::OccurredAt.lt(end));
        }
        let incidents = query
            .order_by_asc(incident::Column::OccurredAt)
            .order_by_asc(incident::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(incidents)
    }

    #[instrument(skip(self))]
    pub async fn list_incidents_for_shift(
        &self,
        shift_id: i32,
    ) -> Result<Vec<incident::Model>, ServiceError> {
        let incidents = Incident::find()
            .filter(incident::Column::ShiftId.eq(shift_id))
            .order_by_asc(incident::Column::OccurredAt)
            .order_by_asc(incident::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(incidents)
    }

    #[instrument(skip(self))]
    pub async fn delete_incident(&self, id: i32) -> Result<(), ServiceError> {
        let result = Incident::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Incident", id));
        }
        info!(incident_id = id, "Incident deleted");
        Ok(())
    }

    /// Every incident in the log, unfiltered.
    #[instrument(skip(self))]
    pub async fn export_incidents(&self, format: ExportFormat) -> Result<Vec<u8>, ServiceError> {
        let incidents = Incident::find()
            .order_by_asc(incident::Column::Id)
            .all(&*self.db_pool)
            .await?;
        info!(rows = incidents.len(), %format, "Exporting incidents");
        reports::render(format, "Incident Report", &incidents)
    }
}
