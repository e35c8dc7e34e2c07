//! Marks that a worker's day was folded into a closure.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClosure {
    pub business_date: NaiveDate,
    pub user_id: String,
    pub user_name: String,
    pub cash_closure_id: Uuid,
    pub closed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_user_closures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub business_date: Date,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub user_name: String,
    pub cash_closure_id: Uuid,
    pub closed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_summaries::Entity",
        from = "Column::CashClosureId",
        to = "super::cash_summaries::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CashSummaries,
}

impl Related<super::cash_summaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashSummaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserClosure {
    fn from(model: Model) -> Self {
        Self {
            business_date: model.business_date,
            user_id: model.user_id,
            user_name: model.user_name,
            cash_closure_id: model.cash_closure_id,
            closed_at: model.closed_at,
        }
    }
}
