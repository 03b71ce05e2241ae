//! Tabular exports: CSV files and paginated text-report PDFs.

mod pdf;
mod records;

pub use pdf::{render_pdf, PageLayout};

use crate::errors::ServiceError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A record that can be written as one CSV row and one report line.
pub trait ReportRecord {
    /// CSV header row; `csv_fields` must yield the same number of values.
    const HEADERS: &'static [&'static str];

    fn csv_fields(&self) -> Vec<String>;

    fn report_line(&self) -> String;
}

/// Supported export encodings.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ServiceError::ValidationError(format!(
                "unsupported export format: {}",
                other
            ))),
        }
    }
}

/// Renders `rows` in the requested format. `title` heads the PDF report.
pub fn render<R: ReportRecord>(
    format: ExportFormat,
    title: &str,
    rows: &[R],
) -> Result<Vec<u8>, ServiceError> {
    match format {
        ExportFormat::Csv => to_csv(rows),
        ExportFormat::Pdf => to_pdf(title, rows),
    }
}

/// Header row followed by one row per record. The header is written even
/// when `rows` is empty.
pub fn to_csv<R: ReportRecord>(rows: &[R]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.csv_fields())?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::ExportError(e.to_string()))
}

pub fn to_pdf<R: ReportRecord>(title: &str, rows: &[R]) -> Result<Vec<u8>, ServiceError> {
    let lines: Vec<String> = rows.iter().map(ReportRecord::report_line).collect();
    render_pdf(title, &lines, &PageLayout::default())
}

/// First `max` characters of `text`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub(crate) fn opt_field<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
