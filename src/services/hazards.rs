use crate::{
    attachments::PhotoStore,
    db::{with_transaction, DbPool},
    entities::{
        hazard::{self, Entity as Hazard, HazardStatus, Severity},
        mitigation_note::{self, Entity as MitigationNote},
    },
    errors::ServiceError,
    reports::{self, ExportFormat},
};
use chrono::{DateTime, Utc};
use sea_orm::{entity::*, query::*, Condition, DatabaseTransaction};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::{non_blank, require_text, validate_coordinates};

/// Where a hazard was reported: a map click or a named place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HazardLocation {
    Coordinates { latitude: f64, longitude: f64 },
    Named(String),
}

#[derive(Debug, Clone)]
pub struct NewHazard {
    pub location: HazardLocation,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<HazardStatus>,
    pub photo: Option<PathBuf>,
}

impl NewHazard {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            location: HazardLocation::Coordinates {
                latitude,
                longitude,
            },
            description: None,
            severity: None,
            status: None,
            photo: None,
        }
    }

    pub fn named(location: impl Into<String>) -> Self {
        Self {
            location: HazardLocation::Named(location.into()),
            description: None,
            severity: None,
            status: None,
            photo: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardUpdate {
    pub description: String,
    pub severity: Severity,
    pub status: HazardStatus,
}

/// Equality predicates shared by listing and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardFilter {
    pub severity: Option<Severity>,
    pub status: Option<HazardStatus>,
}

impl HazardFilter {
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(severity) = self.severity {
            cond = cond.add(hazard::Column::Severity.eq(severity));
        }
        if let Some(status) = self.status {
            cond = cond.add(hazard::Column::Status.eq(status));
        }
        cond
    }
}

/// One CSV import row. Every column is optional at this stage so that a
/// missing or malformed value rejects only its own row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardRecord {
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default, alias = "date_reported")]
    pub reported_at: Option<String>,
}

/// Outcome of one import row. Rows are numbered from 1, header excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowOutcome {
    Imported { row: usize, id: i32 },
    Rejected { row: usize, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Imported { .. }))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.imported()
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewMitigationNote {
    pub hazard_id: i32,
    #[validate(length(min = 1, message = "Note text is required"))]
    pub note_text: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub photo: Option<PathBuf>,
}

/// Hazard log, mitigation notes and hazard import/export
#[derive(Clone)]
pub struct HazardService {
    db_pool: Arc<DbPool>,
    photos: PhotoStore,
}

impl HazardService {
    pub fn new(db_pool: Arc<DbPool>, photos: PhotoStore) -> Self {
        Self { db_pool, photos }
    }

    /// Records a new hazard. Severity defaults to `Low`, status to `Logged`.
    #[instrument(skip(self, request))]
    pub async fn report_hazard(&self, request: NewHazard) -> Result<hazard::Model, ServiceError> {
        let (latitude, longitude, location) = match request.location {
            HazardLocation::Coordinates {
                latitude,
                longitude,
            } => {
                validate_coordinates(Some(latitude), Some(longitude))?;
                (Some(latitude), Some(longitude), None)
            }
            HazardLocation::Named(name) => {
                require_text("location", &name)?;
                (None, None, Some(name.trim().to_string()))
            }
        };

        let active = hazard::ActiveModel {
            latitude: Set(latitude),
            longitude: Set(longitude),
            location: Set(location),
            description: Set(request.description.unwrap_or_default()),
            severity: Set(request.severity.unwrap_or_default()),
            status: Set(request.status.unwrap_or_default()),
            photo_path: Set(None),
            reported_at: Set(Utc::now()),
            ..Default::default()
        };

        let photos = self.photos.clone();
        let photo = request.photo;
        let model = with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let model = active.insert(txn).await?;
                match photo {
                    Some(src) => attach_photo(txn, &photos, model, &src).await,
                    None => Ok(model),
                }
            })
        })
        .await?;

        info!(hazard_id = model.id, severity = %model.severity, "Hazard reported");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_hazard(&self, id: i32) -> Result<hazard::Model, ServiceError> {
        Hazard::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Hazard", id))
    }

    #[instrument(skip(self, update))]
    pub async fn update_hazard(
        &self,
        id: i32,
        update: HazardUpdate,
    ) -> Result<hazard::Model, ServiceError> {
        let existing = self.get_hazard(id).await?;
        let mut active: hazard::ActiveModel = existing.into();
        active.description = Set(update.description);
        active.severity = Set(update.severity);
        active.status = Set(update.status);

        let model = active.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, hazard_id = id, "Failed to update hazard");
            ServiceError::db_error(e)
        })?;
        info!(hazard_id = id, status = %model.status, "Hazard updated");
        Ok(model)
    }

    /// Copies a photo for the hazard, replacing any earlier path.
    #[instrument(skip(self))]
    pub async fn attach_hazard_photo(
        &self,
        id: i32,
        source: PathBuf,
    ) -> Result<hazard::Model, ServiceError> {
        let photos = self.photos.clone();
        with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let existing = Hazard::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Hazard", id))?;
                attach_photo(txn, &photos, existing, &source).await
            })
        })
        .await
    }

    /// Newest first; ties broken by descending id.
    #[instrument(skip(self))]
    pub async fn list_hazards(
        &self,
        filter: &HazardFilter,
    ) -> Result<Vec<hazard::Model>, ServiceError> {
        let hazards = Hazard::find()
            .filter(filter.condition())
            .order_by_desc(hazard::Column::ReportedAt)
            .order_by_desc(hazard::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(hazards)
    }

    /// Same rows as `list_hazards(filter)`, rendered as CSV or a PDF report.
    #[instrument(skip(self))]
    pub async fn export_hazards(
        &self,
        filter: &HazardFilter,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ServiceError> {
        let hazards = self.list_hazards(filter).await?;
        info!(rows = hazards.len(), %format, "Exporting hazards");
        reports::render(format, "Hazard Report", &hazards)
    }

    /// Parses a CSV document with a header row and imports every row.
    pub async fn import_csv<R: Read>(&self, reader: R) -> Result<ImportReport, ServiceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut records = Vec::new();
        for result in csv_reader.records() {
            let parsed = result.and_then(|raw| {
                fit_to_headers(&raw, headers.len()).deserialize::<HazardRecord>(Some(&headers))
            });
            records.push(parsed.map_err(|e| e.to_string()));
        }
        self.import_parsed(records).await
    }

    /// Imports already-split records.
    ///
    /// Rows failing validation are reported and skipped; the valid rows are
    /// written in one transaction, so a storage failure imports nothing.
    pub async fn import_records(
        &self,
        records: Vec<HazardRecord>,
    ) -> Result<ImportReport, ServiceError> {
        self.import_parsed(records.into_iter().map(Ok).collect())
            .await
    }

    #[instrument(skip(self, records), fields(rows = records.len()))]
    async fn import_parsed(
        &self,
        records: Vec<Result<HazardRecord, String>>,
    ) -> Result<ImportReport, ServiceError> {
        let now = Utc::now();
        let mut pending: Vec<(usize, hazard::ActiveModel)> = Vec::new();
        let mut rejected: Vec<RowOutcome> = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let row = index + 1;
            match record
                .map_err(|e| format!("malformed record: {}", e))
                .and_then(|r| hazard_from_record(r, now).map_err(|e| e.to_string()))
            {
                Ok(active) => pending.push((row, active)),
                Err(reason) => {
                    warn!(row, %reason, "Skipping hazard import row");
                    rejected.push(RowOutcome::Rejected { row, reason });
                }
            }
        }

        let imported = with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let mut imported = Vec::with_capacity(pending.len());
                for (row, active) in pending {
                    let model = active.insert(txn).await?;
                    imported.push(RowOutcome::Imported { row, id: model.id });
                }
                Ok(imported)
            })
        })
        .await?;

        let mut outcomes = imported;
        outcomes.extend(rejected);
        outcomes.sort_by_key(|o| match o {
            RowOutcome::Imported { row, .. } | RowOutcome::Rejected { row, .. } => *row,
        });

        let report = ImportReport { outcomes };
        info!(
            imported = report.imported(),
            rejected = report.rejected(),
            "Hazard import finished"
        );
        Ok(report)
    }

    #[instrument(skip(self, request), fields(hazard_id = request.hazard_id))]
    pub async fn add_mitigation_note(
        &self,
        request: NewMitigationNote,
    ) -> Result<mitigation_note::Model, ServiceError> {
        request.validate()?;
        let hazard = self.get_hazard(request.hazard_id).await?;

        let photo_path = match &request.photo {
            Some(src) => Some(
                self.photos
                    .store(src, &format!("note_{}", hazard.id))
                    .await?,
            ),
            None => None,
        };

        let active = mitigation_note::ActiveModel {
            hazard_id: Set(hazard.id),
            note_text: Set(request.note_text),
            photo_path: Set(photo_path.clone()),
            author: Set(request.author),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match active.insert(&*self.db_pool).await {
            Ok(note) => {
                info!(note_id = note.id, hazard_id = hazard.id, "Mitigation note added");
                Ok(note)
            }
            Err(e) => {
                if let Some(path) = photo_path {
                    self.photos.discard(&path).await;
                }
                Err(e.into())
            }
        }
    }

    /// Oldest first.
    #[instrument(skip(self))]
    pub async fn list_mitigation_notes(
        &self,
        hazard_id: i32,
    ) -> Result<Vec<mitigation_note::Model>, ServiceError> {
        let hazard = self.get_hazard(hazard_id).await?;
        let notes = hazard
            .find_related(MitigationNote)
            .order_by_asc(mitigation_note::Column::CreatedAt)
            .order_by_asc(mitigation_note::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(notes)
    }
}

async fn attach_photo(
    txn: &DatabaseTransaction,
    photos: &PhotoStore,
    model: hazard::Model,
    source: &std::path::Path,
) -> Result<hazard::Model, ServiceError> {
    let path = photos.store(source, &format!("hazard_{}", model.id)).await?;
    let mut active: hazard::ActiveModel = model.into();
    active.photo_path = Set(Some(path.clone()));
    match active.update(txn).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            photos.discard(&path).await;
            Err(e.into())
        }
    }
}

/// Pads a short row with empty fields and drops cells past the last header,
/// so omitted trailing columns fall back to their defaults.
fn fit_to_headers(raw: &csv::StringRecord, width: usize) -> csv::StringRecord {
    let mut record: csv::StringRecord = raw.iter().take(width).collect();
    while record.len() < width {
        record.push_field("");
    }
    record
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::ValidationError(format!("{} is required", name)))?;
    raw.parse::<f64>()
        .map_err(|_| ServiceError::ValidationError(format!("{} '{}' is not a number", name, raw)))
}

fn hazard_from_record(
    record: HazardRecord,
    now: DateTime<Utc>,
) -> Result<hazard::ActiveModel, ServiceError> {
    let location = non_blank(record.location);
    let no_coordinates = non_blank(record.latitude.clone()).is_none()
        && non_blank(record.longitude.clone()).is_none();

    // A named place stands in for coordinates only when both are absent.
    let (latitude, longitude) = if no_coordinates && location.is_some() {
        (None, None)
    } else {
        let latitude = parse_coordinate("latitude", record.latitude.as_deref())?;
        let longitude = parse_coordinate("longitude", record.longitude.as_deref())?;
        validate_coordinates(Some(latitude), Some(longitude))?;
        (Some(latitude), Some(longitude))
    };

    let severity = match non_blank(record.severity) {
        Some(raw) => raw
            .parse::<Severity>()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?,
        None => Severity::default(),
    };
    let status = match non_blank(record.status) {
        Some(raw) => raw
            .parse::<HazardStatus>()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?,
        None => HazardStatus::default(),
    };
    let reported_at = match non_blank(record.reported_at) {
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| {
                ServiceError::ValidationError(format!("reported_at '{}' is not a timestamp", raw))
            })?,
        None => now,
    };

    Ok(hazard::ActiveModel {
        latitude: Set(latitude),
        longitude: Set(longitude),
        location: Set(location),
        description: Set(record.description.unwrap_or_default()),
        severity: Set(severity),
        status: Set(status),
        photo_path: Set(non_blank(record.photo_path)),
        reported_at: Set(reported_at),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn record(lat: &str, lon: &str) -> HazardRecord {
        HazardRecord {
            latitude: Some(lat.into()),
            longitude: Some(lon.into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_optional_columns_take_defaults() {
        let now = Utc::now();
        let active = hazard_from_record(record("51.5", "-0.1"), now).unwrap();
        assert_eq!(active.severity, Set(Severity::Low));
        assert_eq!(active.status, Set(HazardStatus::Logged));
        assert_eq!(active.reported_at, Set(now));
        assert_eq!(active.description, Set(String::new()));
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let err = hazard_from_record(record("north", "-0.1"), Utc::now()).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("latitude"));

        let err = hazard_from_record(record("51.5", ""), Utc::now()).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("longitude"));
    }

    #[test]
    fn named_location_replaces_blank_coordinates() {
        let rec = HazardRecord {
            location: Some("North gate".into()),
            latitude: Some(String::new()),
            ..Default::default()
        };
        let active = hazard_from_record(rec, Utc::now()).unwrap();
        assert_eq!(active.latitude, Set(None));
        assert_eq!(active.longitude, Set(None));
        assert_eq!(active.location, Set(Some("North gate".to_string())));

        let err = hazard_from_record(HazardRecord::default(), Utc::now()).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("latitude"));

        let half = HazardRecord {
            location: Some("North gate".into()),
            latitude: Some("51.5".into()),
            ..Default::default()
        };
        assert!(hazard_from_record(half, Utc::now()).is_err());

        let garbled = HazardRecord {
            location: Some("North gate".into()),
            latitude: Some("north".into()),
            longitude: Some("-0.1".into()),
            ..Default::default()
        };
        assert!(hazard_from_record(garbled, Utc::now()).is_err());
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_cut() {
        let short = csv::StringRecord::from(vec!["1.0", "2.0"]);
        let fitted = fit_to_headers(&short, 4);
        assert_eq!(fitted.len(), 4);
        assert_eq!(&fitted[3], "");

        let long = csv::StringRecord::from(vec!["a", "b", "c"]);
        assert_eq!(fit_to_headers(&long, 2).len(), 2);
    }

    #[test]
    fn medium_alias_and_timestamp_are_preserved() {
        let mut rec = record("1", "2");
        rec.severity = Some("Medium".into());
        rec.status = Some("in progress".into());
        rec.reported_at = Some("2024-06-01T09:30:00+00:00".into());

        let active = hazard_from_record(rec, Utc::now()).unwrap();
        assert_eq!(active.severity, Set(Severity::Medium));
        assert_eq!(active.status, Set(HazardStatus::InProgress));
        assert_eq!(
            active.reported_at.unwrap().to_rfc3339(),
            "2024-06-01T09:30:00+00:00"
        );
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let mut rec = record("1", "2");
        rec.severity = Some("Catastrophic".into());
        assert!(hazard_from_record(rec, Utc::now()).is_err());
    }

    #[test]
    fn import_report_counts() {
        let report = ImportReport {
            outcomes: vec![
                RowOutcome::Imported { row: 1, id: 10 },
                RowOutcome::Rejected {
                    row: 2,
                    reason: "latitude is required".into(),
                },
            ],
        };
        assert_eq!(report.imported(), 1);
        assert_eq!(report.rejected(), 1);
    }
}
