pub mod hazards;
pub mod inventory;
pub mod maintenance;
pub mod patrols;
pub mod trail_cams;

use crate::attachments::PhotoStore;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::notifications::NotificationSink;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Every service, sharing one pool, photo store and notification sink.
#[derive(Clone)]
pub struct AppServices {
    pub hazards: Arc<hazards::HazardService>,
    pub patrols: Arc<patrols::PatrolService>,
    pub inventory: Arc<inventory::InventoryService>,
    pub maintenance: Arc<maintenance::MaintenanceService>,
    pub trail_cams: Arc<trail_cams::TrailCamService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        photos: PhotoStore,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            hazards: Arc::new(hazards::HazardService::new(db_pool.clone(), photos.clone())),
            patrols: Arc::new(patrols::PatrolService::new(db_pool.clone(), photos.clone())),
            inventory: Arc::new(inventory::InventoryService::new(
                db_pool.clone(),
                photos.clone(),
                notifier,
            )),
            maintenance: Arc::new(maintenance::MaintenanceService::new(
                db_pool.clone(),
                photos.clone(),
            )),
            trail_cams: Arc::new(trail_cams::TrailCamService::new(db_pool, photos)),
        }
    }
}

/// Optional inclusive date range. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ServiceError::ValidationError(
                format!("range start {} is after end {}", start, end),
            )),
            _ => Ok(()),
        }
    }

    /// Lower bound (inclusive) as a UTC instant.
    pub fn lower(&self) -> Option<DateTime<Utc>> {
        self.start.map(start_of_day)
    }

    /// Upper bound (exclusive) as a UTC instant: midnight after `end`.
    pub fn upper(&self) -> Option<DateTime<Utc>> {
        self.end.and_then(|end| end.succ_opt()).map(start_of_day)
    }
}

/// Half-open UTC bounds `[date 00:00, date+1 00:00)` of a calendar day.
pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    (start_of_day(date), date.succ_opt().map(start_of_day))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::ValidationError(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

pub(crate) fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), ServiceError> {
    if let Some(lat) = latitude {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ServiceError::ValidationError(format!(
                "latitude {} is out of range",
                lat
            )));
        }
    }
    if let Some(lon) = longitude {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ServiceError::ValidationError(format!(
                "longitude {} is out of range",
                lon
            )));
        }
    }
    Ok(())
}

/// Blank strings become `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
