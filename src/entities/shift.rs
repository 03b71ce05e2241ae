use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `shifts` table: one patrol crew assignment for a date and time slot.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    /// Free-form slot such as `08:00-16:00`; listings sort on it lexically.
    pub time_slot: String,
    pub crew: String,
}

// Incidents point at shifts by bare id; no relation is declared so that
// deleting a shift never touches them.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
