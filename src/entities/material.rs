use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A consumable stock item, keyed by (category, name, variant).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub category: String,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: i32,
    pub min_threshold: i32,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Display label used in transaction notes and low-stock alerts.
    pub fn label(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{} {} ({})", self.name, variant, self.category),
            None => format!("{} ({})", self.name, self.category),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::material_transaction::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::material_request::Entity")]
    Requests,
}

impl Related<super::material_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::material_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
