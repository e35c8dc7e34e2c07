//! Payroll accruals: what the business owes a worker for a business date.
//!
//! Rows are only created by closure, at most one per (date, worker).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// Default description stored on every accrual.
pub const DEFAULT_ACCRUAL_DESCRIPTION: &str = "Sueldo diario";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollAccrual {
    pub id: Uuid,
    pub business_date: NaiveDate,
    pub user_id: String,
    pub user_name: String,
    pub amount: Money,
    pub description: String,
    /// Summary that triggered the accrual (provenance only).
    pub cash_closure_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of [`Engine::accrue_if_absent`](crate::Engine::accrue_if_absent).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccrualOutcome {
    Accrued(PayrollAccrual),
    Skipped,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payroll_accruals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_date: Date,
    pub user_id: String,
    pub user_name: String,
    pub amount_minor: i64,
    pub description: String,
    pub cash_closure_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_summaries::Entity",
        from = "Column::CashClosureId",
        to = "super::cash_summaries::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    CashSummaries,
}

impl Related<super::cash_summaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashSummaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PayrollAccrual> for ActiveModel {
    fn from(accrual: &PayrollAccrual) -> Self {
        Self {
            id: ActiveValue::Set(accrual.id),
            business_date: ActiveValue::Set(accrual.business_date),
            user_id: ActiveValue::Set(accrual.user_id.clone()),
            user_name: ActiveValue::Set(accrual.user_name.clone()),
            amount_minor: ActiveValue::Set(accrual.amount.cents()),
            description: ActiveValue::Set(accrual.description.clone()),
            cash_closure_id: ActiveValue::Set(accrual.cash_closure_id),
            created_at: ActiveValue::Set(accrual.created_at),
        }
    }
}

impl From<Model> for PayrollAccrual {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            business_date: model.business_date,
            user_id: model.user_id,
            user_name: model.user_name,
            amount: Money::new(model.amount_minor),
            description: model.description,
            cash_closure_id: model.cash_closure_id,
            created_at: model.created_at,
        }
    }
}
