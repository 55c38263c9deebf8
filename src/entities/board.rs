use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default minimum threshold for a board row auto-created during job
/// completion. Wall-mounted enclosures move slower, so they carry a
/// higher reorder floor.
pub fn default_min_threshold(board_type: &str) -> i32 {
    match board_type {
        "Surface Mounted" | "Enclosure" => 5,
        _ => 2,
    }
}

/// A finished-goods stock item, keyed by (type, color). Color comparisons
/// are case-insensitive.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub board_type: String,
    pub color: String,
    pub quantity: i32,
    pub min_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn label(&self) -> String {
        format!("{} {}", self.board_type, self.color)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::board_transaction::Entity")]
    Transactions,
}

impl Related<super::board_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_defaults_by_board_type() {
        assert_eq!(default_min_threshold("Surface Mounted"), 5);
        assert_eq!(default_min_threshold("Enclosure"), 5);
        assert_eq!(default_min_threshold("Mini-Flush"), 2);
        assert_eq!(default_min_threshold("Flush Mounted"), 2);
    }
}
