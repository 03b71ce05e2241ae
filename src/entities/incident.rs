use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categories offered by the patrol log; any other label is stored verbatim.
pub const KNOWN_CATEGORIES: [&str; 3] = ["Trespasser", "Fence Damage", "Other"];

/// The `incidents` table.
///
/// `shift_id` is a soft reference: it is neither validated on insert nor
/// cleared when the shift is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub shift_id: i32,
    pub category: String,
    pub description: String,
    pub photo_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
