use super::{opt_field, truncate, ReportRecord};
use crate::entities::{hazard, incident, item, maintenance_log, trail_cam_capture, transaction};
use chrono::{DateTime, Utc};

const SUMMARY_CHARS: usize = 30;

fn short_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// The named place when there is one, otherwise `lat,lon`.
fn hazard_place(hazard: &hazard::Model) -> String {
    match (&hazard.location, hazard.latitude, hazard.longitude) {
        (Some(name), _, _) => name.clone(),
        (None, Some(lat), Some(lon)) => format!("{:.5},{:.5}", lat, lon),
        _ => "-".to_string(),
    }
}

impl ReportRecord for hazard::Model {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "latitude",
        "longitude",
        "location",
        "description",
        "severity",
        "status",
        "photo_path",
        "reported_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_field(&self.latitude),
            opt_field(&self.longitude),
            opt_field(&self.location),
            self.description.clone(),
            self.severity.to_string(),
            self.status.to_string(),
            opt_field(&self.photo_path),
            self.reported_at.to_rfc3339(),
        ]
    }

    fn report_line(&self) -> String {
        format!(
            "ID:{} | {} | {} | {} | {} | {}",
            self.id,
            hazard_place(self),
            truncate(&self.description, SUMMARY_CHARS),
            self.severity,
            self.status,
            short_time(&self.reported_at)
        )
    }
}

impl ReportRecord for incident::Model {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "shift_id",
        "category",
        "description",
        "photo_path",
        "latitude",
        "longitude",
        "occurred_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.shift_id.to_string(),
            self.category.clone(),
            self.description.clone(),
            opt_field(&self.photo_path),
            opt_field(&self.latitude),
            opt_field(&self.longitude),
            self.occurred_at.to_rfc3339(),
        ]
    }

    fn report_line(&self) -> String {
        format!(
            "ID:{} | Shift:{} | {} | {} | {}",
            self.id,
            self.shift_id,
            self.category,
            truncate(&self.description, SUMMARY_CHARS),
            short_time(&self.occurred_at)
        )
    }
}

impl ReportRecord for item::Model {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "location",
        "quantity",
        "unit",
        "threshold",
        "supplier",
        "supplier_contact",
        "supplier_sku",
        "unit_cost",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.location.clone(),
            self.quantity.to_string(),
            self.unit.clone(),
            self.threshold.to_string(),
            opt_field(&self.supplier),
            opt_field(&self.supplier_contact),
            opt_field(&self.supplier_sku),
            opt_field(&self.unit_cost),
        ]
    }

    fn report_line(&self) -> String {
        format!(
            "ID:{} | {} | Qty:{} | Thr:{} | Sup:{}",
            self.id,
            self.name,
            self.quantity,
            self.threshold,
            self.supplier.as_deref().unwrap_or("-")
        )
    }
}

impl ReportRecord for transaction::Model {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "item_id",
        "person",
        "out_date",
        "expected_return_date",
        "actual_return_date",
        "out_notes",
        "return_notes",
        "out_photo",
        "return_photo",
        "status",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.item_id.to_string(),
            self.person.clone(),
            self.out_date.to_rfc3339(),
            opt_field(&self.expected_return_date),
            self.actual_return_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            opt_field(&self.out_notes),
            opt_field(&self.return_notes),
            opt_field(&self.out_photo),
            opt_field(&self.return_photo),
            self.status.to_string(),
        ]
    }

    fn report_line(&self) -> String {
        let returned = self
            .actual_return_date
            .as_ref()
            .map(short_time)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "ID:{} | Item:{} | {} | Out:{} | In:{} | {}",
            self.id,
            self.item_id,
            self.person,
            short_time(&self.out_date),
            returned,
            self.status
        )
    }
}

impl ReportRecord for maintenance_log::Model {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "equipment",
        "issue",
        "done",
        "notes",
        "photo_path",
        "reported_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.equipment.clone(),
            self.issue.clone(),
            self.done.to_string(),
            opt_field(&self.notes),
            opt_field(&self.photo_path),
            self.reported_at.to_rfc3339(),
        ]
    }

    fn report_line(&self) -> String {
        format!(
            "ID:{} | {} | {} | {} | {}",
            self.id,
            self.equipment,
            truncate(&self.issue, SUMMARY_CHARS),
            if self.done { "Done" } else { "Open" },
            short_time(&self.reported_at)
        )
    }
}

impl ReportRecord for trail_cam_capture::Model {
    const HEADERS: &'static [&'static str] =
        &["id", "location", "photo_path", "notes", "captured_at"];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.location.clone(),
            self.photo_path.clone(),
            opt_field(&self.notes),
            self.captured_at.to_rfc3339(),
        ]
    }

    fn report_line(&self) -> String {
        format!(
            "ID:{} | {} | {} | {}",
            self.id,
            self.location,
            self.photo_path,
            short_time(&self.captured_at)
        )
    }
}
