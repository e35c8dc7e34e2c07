//! Cash entries (cortes de caja).
//!
//! Both incomes and expenses are represented by `CashEntry`. An entry is
//! attributed to a *business date*, which is independent from the instant
//! the row was created.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashEntryKind {
    Income,
    Expense,
}

impl CashEntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for CashEntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidRequest(format!(
                "invalid cash entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    pub id: Uuid,
    pub business_date: NaiveDate,
    pub kind: CashEntryKind,
    pub description: String,
    /// Always > 0; the kind carries the sign.
    pub amount: Money,
    pub created_by: String,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
}

impl CashEntry {
    pub fn new(
        business_date: NaiveDate,
        kind: CashEntryKind,
        description: String,
        amount: Money,
        created_by: String,
        created_by_name: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidRequest(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            business_date,
            kind,
            description,
            amount,
            created_by,
            created_by_name,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_date: Date,
    pub kind: String,
    pub description: String,
    pub amount_minor: i64,
    pub created_by: String,
    pub created_by_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashEntry> for ActiveModel {
    fn from(entry: &CashEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id),
            business_date: ActiveValue::Set(entry.business_date),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            description: ActiveValue::Set(entry.description.clone()),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            created_by: ActiveValue::Set(entry.created_by.clone()),
            created_by_name: ActiveValue::Set(entry.created_by_name.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for CashEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            business_date: model.business_date,
            kind: CashEntryKind::try_from(model.kind.as_str())?,
            description: model.description,
            amount: Money::new(model.amount_minor),
            created_by: model.created_by,
            created_by_name: model.created_by_name,
            created_at: model.created_at,
        })
    }
}
