use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a single production stage on a job card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// The two production stages that make up a job card's workflow.
/// Also used as the `process` tag on material-usage rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStage {
    #[sea_orm(string_value = "fabrication")]
    Fabrication,
    #[sea_orm(string_value = "assembling")]
    Assembling,
}

/// Overall phase of a job card. Always computed from the pair of stage
/// statuses via [`derive_phase`]; never set independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    #[sea_orm(string_value = "fabrication")]
    Fabrication,
    #[sea_orm(string_value = "assembling")]
    Assembling,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Computes the overall phase from the two stage statuses.
///
/// Assembling counts only once it has actually started; a card whose
/// fabrication is complete but whose assembling is still pending is still
/// in the fabrication phase.
pub fn derive_phase(fabrication: StageStatus, assembling: StageStatus) -> JobPhase {
    match (fabrication, assembling) {
        (_, StageStatus::Completed) => JobPhase::Completed,
        (_, StageStatus::InProgress) => JobPhase::Assembling,
        (_, StageStatus::Pending) => JobPhase::Fabrication,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub job_card_number: String,
    pub job_name: String,
    pub client_name: String,
    pub board_name: String,
    pub board_type: String,
    pub board_color: String,
    pub recipient: Option<String>,
    pub supervisor: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
    pub photo_urls: Json,
    pub fabrication_status: StageStatus,
    pub assembling_status: StageStatus,
    pub phase: JobPhase,
    pub fabrication_by_id: Option<String>,
    pub fabrication_by_name: Option<String>,
    pub fabrication_completed_at: Option<DateTime<Utc>>,
    pub assembling_by_id: Option<String>,
    pub assembling_by_name: Option<String>,
    pub assembling_completed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn photo_urls(&self) -> Vec<String> {
        serde_json::from_value(self.photo_urls.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_card_material::Entity")]
    MaterialsUsed,
}

impl Related<super::job_card_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialsUsed.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_matches_stage_pair_for_every_reachable_combination() {
        use JobPhase as P;
        use StageStatus as S;

        let cases = [
            ((S::Pending, S::Pending), P::Fabrication),
            ((S::InProgress, S::Pending), P::Fabrication),
            ((S::Completed, S::Pending), P::Fabrication),
            ((S::Completed, S::InProgress), P::Assembling),
            ((S::Completed, S::Completed), P::Completed),
        ];

        for ((fab, asm), expected) in cases {
            assert_eq!(derive_phase(fab, asm), expected, "({:?}, {:?})", fab, asm);
        }
    }
}
