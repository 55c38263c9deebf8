use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::job_card::JobStage;

/// Append-only record of material usage on a job card. Bookkeeping only:
/// recording usage here does not move material stock (see
/// MaterialRequestService for the deduction path).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_card_materials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub job_card_id: i64,
    pub material_id: i64,
    pub material_name: String,
    pub quantity: i32,
    pub process: JobStage,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_card::Entity",
        from = "Column::JobCardId",
        to = "super::job_card::Column::Id"
    )]
    JobCard,
}

impl Related<super::job_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobCard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
