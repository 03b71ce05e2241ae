use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

/// How dangerous a hazard is; `AreaClosed` means the area is shut to traffic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Severity {
    #[default]
    #[sea_orm(string_value = "Low")]
    Low,
    #[sea_orm(string_value = "Med")]
    #[serde(rename = "Med")]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Area Closed")]
    #[serde(rename = "Area Closed")]
    AreaClosed,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Med",
            Severity::High => "High",
            Severity::AreaClosed => "Area Closed",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    /// Case-insensitive; `Medium` is accepted as an alias of `Med`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "med" | "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "area closed" | "area_closed" | "closed" => Ok(Severity::AreaClosed),
            _ => Err(UnknownVariant {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mitigation progress of a hazard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum HazardStatus {
    #[default]
    #[sea_orm(string_value = "Logged")]
    Logged,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Mitigated")]
    Mitigated,
}

impl HazardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardStatus::Logged => "Logged",
            HazardStatus::InProgress => "In Progress",
            HazardStatus::Mitigated => "Mitigated",
        }
    }
}

impl FromStr for HazardStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logged" => Ok(HazardStatus::Logged),
            "in progress" | "in_progress" => Ok(HazardStatus::InProgress),
            "mitigated" => Ok(HazardStatus::Mitigated),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HazardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `hazards` table.
///
/// A hazard is placed either by coordinates (map click) or by a free-text
/// location name; both may be present after an import.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hazards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
    pub description: String,
    pub severity: Severity,
    pub status: HazardStatus,
    pub photo_path: Option<String>,
    pub reported_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mitigation_note::Entity")]
    MitigationNotes,
}

impl Related<super::mitigation_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MitigationNotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use sea_orm::Iterable;

    #[rstest]
    #[case("Low", Severity::Low)]
    #[case("Medium", Severity::Medium)]
    #[case("med", Severity::Medium)]
    #[case(" HIGH ", Severity::High)]
    #[case("Area Closed", Severity::AreaClosed)]
    fn severity_parses_labels_and_aliases(#[case] label: &str, #[case] expected: Severity) {
        assert_eq!(label.parse::<Severity>(), Ok(expected));
    }

    #[test]
    fn unknown_severity_names_the_value() {
        let err = "Severe".parse::<Severity>().unwrap_err();
        assert_eq!(err.to_string(), "unknown severity 'Severe'");
    }

    #[test]
    fn labels_round_trip_through_display() {
        for severity in Severity::iter() {
            assert_eq!(severity.to_string().parse::<Severity>(), Ok(severity));
        }
        for status in HazardStatus::iter() {
            assert_eq!(status.to_string().parse::<HazardStatus>(), Ok(status));
        }
    }

    #[test]
    fn serde_uses_stored_labels() {
        let json = serde_json::to_string(&HazardStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let sev: Severity = serde_json::from_str("\"Area Closed\"").unwrap();
        assert_eq!(sev, Severity::AreaClosed);
    }
}
