//! Daily cash totals and the summary row materialised on closure.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CashEntry, CashEntryKind, Money, ResultEngine, money::too_large};

/// Per-date income/expense projection of the cash entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub incomes: Money,
    pub expenses: Money,
    pub balance: Money,
}

impl DailyTotals {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            incomes: Money::ZERO,
            expenses: Money::ZERO,
            balance: Money::ZERO,
        }
    }

    fn add(&mut self, entry: &CashEntry) -> ResultEngine<()> {
        let side = match entry.kind {
            CashEntryKind::Income => &mut self.incomes,
            CashEntryKind::Expense => &mut self.expenses,
        };
        *side = side.checked_add(entry.amount).ok_or_else(too_large)?;
        self.balance = self
            .incomes
            .checked_sub(self.expenses)
            .ok_or_else(too_large)?;
        Ok(())
    }

    /// Groups entries by business date, ordered by date.
    ///
    /// Dates without entries are not reported. A date whose totals do not fit
    /// in i64 cents fails with `InvalidRequest`.
    pub fn group<'a>(
        entries: impl IntoIterator<Item = &'a CashEntry>,
    ) -> ResultEngine<Vec<DailyTotals>> {
        let mut by_date: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
        for entry in entries {
            by_date
                .entry(entry.business_date)
                .or_insert_with(|| DailyTotals::zero(entry.business_date))
                .add(entry)?;
        }
        Ok(by_date.into_values().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashDailySummary {
    pub id: Uuid,
    pub business_date: NaiveDate,
    pub incomes: Money,
    pub expenses: Money,
    pub balance: Money,
    /// Username of the admin who closed the day, or `system` for the
    /// scheduler.
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_daily_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub business_date: Date,
    pub incomes_minor: i64,
    pub expenses_minor: i64,
    pub balance_minor: i64,
    pub closed_by: String,
    pub closed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payroll_accruals::Entity")]
    PayrollAccruals,
}

impl Related<super::payroll_accruals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollAccruals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CashDailySummary {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            business_date: model.business_date,
            incomes: Money::new(model.incomes_minor),
            expenses: Money::new(model.expenses_minor),
            balance: Money::new(model.balance_minor),
            closed_by: model.closed_by,
            closed_at: model.closed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: NaiveDate, kind: CashEntryKind, cents: i64) -> CashEntry {
        CashEntry::new(
            date,
            kind,
            "test".to_string(),
            Money::new(cents),
            "w".to_string(),
            "Worker".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn group_sums_per_date_in_order() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let entries = vec![
            entry(d1, CashEntryKind::Income, 15000),
            entry(d1, CashEntryKind::Expense, 4000),
            entry(d2, CashEntryKind::Expense, 500),
        ];

        let totals = DailyTotals::group(&entries).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date, d2);
        assert_eq!(totals[0].balance, Money::new(-500));
        assert_eq!(totals[1].incomes, Money::new(15000));
        assert_eq!(totals[1].expenses, Money::new(4000));
        assert_eq!(totals[1].balance, Money::new(11000));
    }

    #[test]
    fn group_of_nothing_is_empty() {
        assert!(DailyTotals::group(std::iter::empty()).unwrap().is_empty());
    }

    #[test]
    fn group_rejects_totals_past_i64() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let entries = vec![
            entry(date, CashEntryKind::Income, i64::MAX),
            entry(date, CashEntryKind::Income, 1),
        ];

        let err = DailyTotals::group(&entries).unwrap_err();
        assert!(matches!(err, crate::EngineError::InvalidRequest(_)));
    }
}
