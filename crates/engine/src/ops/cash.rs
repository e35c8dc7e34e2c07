use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CashEntry, CashEntryKind, DailyTotals, EngineError, Money, ResultEngine, calendar,
    cash_entries, cash_summaries, util::normalize_required,
};

use super::{Engine, with_tx};

/// Input for [`Engine::new_cash_entry`].
#[derive(Clone, Debug)]
pub struct CashEntryCmd {
    /// Defaults to today in the business timezone.
    pub business_date: Option<NaiveDate>,
    pub kind: CashEntryKind,
    pub description: String,
    pub amount: Money,
    pub user_id: String,
    pub user_name: String,
}

/// Inclusive business-date range, optionally restricted to one creator.
#[derive(Clone, Debug)]
pub struct CashEntryFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub created_by: Option<String>,
}

impl CashEntryFilter {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
            created_by: None,
        }
    }
}

impl Engine {
    /// Records an income or expense for a business date.
    pub async fn new_cash_entry(&self, cmd: CashEntryCmd) -> ResultEngine<CashEntry> {
        let description = normalize_required(&cmd.description, "description")?;
        let user_name = normalize_required(&cmd.user_name, "user name")?;
        let business_date = cmd.business_date.unwrap_or_else(|| self.today());
        let entry = CashEntry::new(
            business_date,
            cmd.kind,
            description,
            cmd.amount,
            cmd.user_id,
            user_name,
        )?;

        cash_entries::ActiveModel::from(&entry)
            .insert(&self.database)
            .await?;
        tracing::debug!(
            entry_id = %entry.id,
            date = %entry.business_date,
            kind = entry.kind.as_str(),
            amount = %entry.amount,
            "cash entry created"
        );
        Ok(entry)
    }

    /// Entries in the range, ordered by business date then creation time.
    pub async fn cash_entries(&self, filter: &CashEntryFilter) -> ResultEngine<Vec<CashEntry>> {
        self.load_cash_entries(&self.database, filter).await
    }

    /// Deletes an entry whose business date has not been closed yet.
    pub async fn delete_cash_entry(&self, entry_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let entry = cash_entries::Entity::find_by_id(entry_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("cash entry {entry_id}")))?;

            let closed = cash_summaries::Entity::find()
                .filter(cash_summaries::Column::BusinessDate.eq(entry.business_date))
                .one(&db_tx)
                .await?
                .is_some();
            if closed {
                return Err(EngineError::Conflict(format!(
                    "{} is already closed",
                    entry.business_date
                )));
            }

            cash_entries::Entity::delete_by_id(entry_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Per-date incomes, expenses and balance over `[from, to]`.
    ///
    /// Always recomputed from the entries; summaries written by closure are
    /// never consulted.
    pub async fn compute_totals(
        &self,
        filter: &CashEntryFilter,
    ) -> ResultEngine<Vec<DailyTotals>> {
        let entries = self.cash_entries(filter).await?;
        DailyTotals::group(&entries)
    }

    pub(super) async fn load_cash_entries<C: ConnectionTrait>(
        &self,
        db: &C,
        filter: &CashEntryFilter,
    ) -> ResultEngine<Vec<CashEntry>> {
        calendar::ensure_range(filter.from, filter.to)?;

        let mut query = cash_entries::Entity::find()
            .filter(cash_entries::Column::BusinessDate.gte(filter.from))
            .filter(cash_entries::Column::BusinessDate.lte(filter.to));
        if let Some(created_by) = &filter.created_by {
            query = query.filter(cash_entries::Column::CreatedBy.eq(created_by.clone()));
        }

        let models = query
            .order_by_asc(cash_entries::Column::BusinessDate)
            .order_by_asc(cash_entries::Column::CreatedAt)
            .all(db)
            .await?;
        models.into_iter().map(CashEntry::try_from).collect()
    }
}
