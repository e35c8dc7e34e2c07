use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    AccrualOutcome, CashDailySummary, DailyTotals, EngineError, PayrollAccrual, ResultEngine,
    UserClosure, calendar, cash_summaries, user_closures, users, util::normalize_required,
};

use super::{CashEntryFilter, Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseStatus {
    /// First closure of the date.
    Closed,
    /// The date was already closed; its summary was recomputed in place.
    Reclosed,
}

impl CloseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Reclosed => "reclosed",
        }
    }
}

/// Outcome of [`Engine::close_day`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayClosure {
    pub status: CloseStatus,
    pub summary: CashDailySummary,
    /// Every worker folded into this date, including earlier closures.
    pub closures: Vec<UserClosure>,
    /// Accruals created by this call only.
    pub accrued: Vec<PayrollAccrual>,
}

impl Engine {
    /// Closes a business date.
    ///
    /// Recomputes the totals of `date` from the entries, upserts the summary
    /// row, marks every contributing worker as closed for the date and
    /// accrues their daily wage once. Calling it again for the same date
    /// overwrites the summary and never accrues twice.
    ///
    /// A date without entries still gets an all-zero summary.
    pub async fn close_day(&self, date: NaiveDate, closed_by: &str) -> ResultEngine<DayClosure> {
        let closed_by = normalize_required(closed_by, "closed_by")?;

        let closure = with_tx!(self, |db_tx| {
            let entries = self
                .load_cash_entries(&db_tx, &CashEntryFilter::day(date))
                .await?;
            let totals = DailyTotals::group(&entries)?
                .into_iter()
                .next()
                .unwrap_or_else(|| DailyTotals::zero(date));

            let (status, summary) = self.upsert_summary(&db_tx, &totals, &closed_by).await?;

            // username -> display name, first spelling wins
            let mut contributors: BTreeMap<String, String> = BTreeMap::new();
            for entry in &entries {
                contributors
                    .entry(entry.created_by.clone())
                    .or_insert_with(|| entry.created_by_name.clone());
            }

            for (user_id, user_name) in &contributors {
                self.upsert_user_closure(&db_tx, date, user_id, user_name, summary.id)
                    .await?;
            }

            let mut accrued = Vec::new();
            for (user_id, user_name) in &contributors {
                if !self.worker_is_active(&db_tx, user_id).await? {
                    tracing::debug!(%date, user_id, "inactive worker, no accrual");
                    continue;
                }
                let outcome = self
                    .accrue_in_tx(
                        &db_tx,
                        date,
                        user_id,
                        user_name,
                        self.payroll.daily_rate,
                        summary.id,
                    )
                    .await?;
                if let AccrualOutcome::Accrued(accrual) = outcome {
                    accrued.push(accrual);
                }
            }

            let closures = self.load_user_closures(&db_tx, date).await?;
            Ok::<_, EngineError>(DayClosure {
                status,
                summary,
                closures,
                accrued,
            })
        })?;

        tracing::info!(
            %date,
            status = closure.status.as_str(),
            incomes = %closure.summary.incomes,
            expenses = %closure.summary.expenses,
            balance = %closure.summary.balance,
            workers = closure.closures.len(),
            accrued = closure.accrued.len(),
            closed_by = %closure.summary.closed_by,
            "cash day closed"
        );
        Ok(closure)
    }

    /// Summary of a closed date.
    pub async fn daily_summary(&self, date: NaiveDate) -> ResultEngine<CashDailySummary> {
        self.find_summary(&self.database, date)
            .await?
            .map(CashDailySummary::from)
            .ok_or_else(|| EngineError::NotFound(format!("closure for {date}")))
    }

    /// Summaries of the closed dates in `[from, to]`, ordered by date.
    pub async fn daily_summaries(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<CashDailySummary>> {
        calendar::ensure_range(from, to)?;
        let models = cash_summaries::Entity::find()
            .filter(cash_summaries::Column::BusinessDate.gte(from))
            .filter(cash_summaries::Column::BusinessDate.lte(to))
            .order_by_asc(cash_summaries::Column::BusinessDate)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(CashDailySummary::from).collect())
    }

    /// Workers whose day was folded into the closure of `date`.
    pub async fn user_closures(&self, date: NaiveDate) -> ResultEngine<Vec<UserClosure>> {
        self.load_user_closures(&self.database, date).await
    }

    async fn find_summary<C: ConnectionTrait>(
        &self,
        db: &C,
        date: NaiveDate,
    ) -> ResultEngine<Option<cash_summaries::Model>> {
        Ok(cash_summaries::Entity::find()
            .filter(cash_summaries::Column::BusinessDate.eq(date))
            .one(db)
            .await?)
    }

    /// Insert-or-update keyed on the business date. The insert that wins the
    /// unique index reports `Closed`; every later call updates in place and
    /// reports `Reclosed`.
    async fn upsert_summary(
        &self,
        db_tx: &DatabaseTransaction,
        totals: &DailyTotals,
        closed_by: &str,
    ) -> ResultEngine<(CloseStatus, CashDailySummary)> {
        let values = cash_summaries::ActiveModel {
            incomes_minor: ActiveValue::Set(totals.incomes.cents()),
            expenses_minor: ActiveValue::Set(totals.expenses.cents()),
            balance_minor: ActiveValue::Set(totals.balance.cents()),
            closed_by: ActiveValue::Set(closed_by.to_string()),
            closed_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let row = cash_summaries::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            business_date: ActiveValue::Set(totals.date),
            ..values.clone()
        };

        let inserted = cash_summaries::Entity::insert(row)
            .on_conflict(
                OnConflict::column(cash_summaries::Column::BusinessDate)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        let status = if inserted == 0 {
            cash_summaries::Entity::update_many()
                .set(values)
                .filter(cash_summaries::Column::BusinessDate.eq(totals.date))
                .exec(db_tx)
                .await?;
            CloseStatus::Reclosed
        } else {
            CloseStatus::Closed
        };

        let summary = self
            .find_summary(db_tx, totals.date)
            .await?
            .map(CashDailySummary::from)
            .ok_or_else(|| EngineError::NotFound(format!("closure for {}", totals.date)))?;
        Ok((status, summary))
    }

    async fn upsert_user_closure(
        &self,
        db_tx: &DatabaseTransaction,
        date: NaiveDate,
        user_id: &str,
        user_name: &str,
        cash_closure_id: Uuid,
    ) -> ResultEngine<()> {
        let row = user_closures::ActiveModel {
            business_date: ActiveValue::Set(date),
            user_id: ActiveValue::Set(user_id.to_string()),
            user_name: ActiveValue::Set(user_name.to_string()),
            cash_closure_id: ActiveValue::Set(cash_closure_id),
            closed_at: ActiveValue::Set(Utc::now()),
        };
        user_closures::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    user_closures::Column::BusinessDate,
                    user_closures::Column::UserId,
                ])
                .update_columns([
                    user_closures::Column::UserName,
                    user_closures::Column::CashClosureId,
                    user_closures::Column::ClosedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        Ok(())
    }

    async fn load_user_closures<C: ConnectionTrait>(
        &self,
        db: &C,
        date: NaiveDate,
    ) -> ResultEngine<Vec<UserClosure>> {
        let models = user_closures::Entity::find()
            .filter(user_closures::Column::BusinessDate.eq(date))
            .order_by_asc(user_closures::Column::UserId)
            .all(db)
            .await?;
        Ok(models.into_iter().map(UserClosure::from).collect())
    }

    /// Identities come from the auth layer and may have no local row; only an
    /// explicit deactivation stops accruals.
    async fn worker_is_active(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let user = users::Entity::find_by_id(user_id.to_string())
            .one(db_tx)
            .await?;
        Ok(user.is_none_or(|user| user.active))
    }
}
