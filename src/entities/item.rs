use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `items` table: equipment and consumables tracked by the custody ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,
    pub location: String,
    pub quantity: i32,
    pub unit: String,
    /// Low-stock trigger: the item is low when `quantity <= threshold`.
    pub threshold: i32,
    pub supplier: Option<String>,
    pub supplier_contact: Option<String>,
    pub supplier_sku: Option<String>,
    pub unit_cost: Option<f64>,
}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.threshold
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
