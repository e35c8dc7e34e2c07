use chrono::{NaiveDate, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    AccrualOutcome, EngineError, Money, PayrollAccrual, ResultEngine, calendar, cash_summaries,
    payroll_accruals, util::normalize_required,
};

use super::{Engine, with_tx};

/// Inclusive business-date range, optionally restricted to one worker.
#[derive(Clone, Debug)]
pub struct AccrualFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub user_id: Option<String>,
}

impl Engine {
    /// Accrues `amount` to a worker for a business date unless an accrual
    /// for the same (date, worker) already exists.
    ///
    /// `cash_closure_id` must reference an existing daily summary.
    pub async fn accrue_if_absent(
        &self,
        business_date: NaiveDate,
        user_id: &str,
        user_name: &str,
        amount: Money,
        cash_closure_id: Uuid,
    ) -> ResultEngine<AccrualOutcome> {
        let user_id = normalize_required(user_id, "user id")?;
        let user_name = normalize_required(user_name, "user name")?;
        if amount.cents() < 0 {
            return Err(EngineError::InvalidRequest(
                "accrual amount must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            cash_summaries::Entity::find_by_id(cash_closure_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("closure {cash_closure_id}")))?;
            self.accrue_in_tx(
                &db_tx,
                business_date,
                &user_id,
                &user_name,
                amount,
                cash_closure_id,
            )
            .await
        })
    }

    /// Accruals in the range, ordered by date then worker.
    pub async fn accruals(&self, filter: &AccrualFilter) -> ResultEngine<Vec<PayrollAccrual>> {
        calendar::ensure_range(filter.from, filter.to)?;

        let mut query = payroll_accruals::Entity::find()
            .filter(payroll_accruals::Column::BusinessDate.gte(filter.from))
            .filter(payroll_accruals::Column::BusinessDate.lte(filter.to));
        if let Some(user_id) = &filter.user_id {
            query = query.filter(payroll_accruals::Column::UserId.eq(user_id.clone()));
        }
        let models = query
            .order_by_asc(payroll_accruals::Column::BusinessDate)
            .order_by_asc(payroll_accruals::Column::UserId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(PayrollAccrual::from).collect())
    }

    /// The (date, worker) unique index is the real guard: a concurrent
    /// insert that lost the race affects no row and reports `Skipped`.
    pub(super) async fn accrue_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        business_date: NaiveDate,
        user_id: &str,
        user_name: &str,
        amount: Money,
        cash_closure_id: Uuid,
    ) -> ResultEngine<AccrualOutcome> {
        let existing = payroll_accruals::Entity::find()
            .filter(payroll_accruals::Column::BusinessDate.eq(business_date))
            .filter(payroll_accruals::Column::UserId.eq(user_id))
            .one(db_tx)
            .await?;
        if existing.is_some() {
            return Ok(AccrualOutcome::Skipped);
        }

        let accrual = PayrollAccrual {
            id: Uuid::new_v4(),
            business_date,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            amount,
            description: self.payroll.description.clone(),
            cash_closure_id,
            created_at: Utc::now(),
        };
        let inserted = payroll_accruals::Entity::insert(payroll_accruals::ActiveModel::from(
            &accrual,
        ))
        .on_conflict(
            OnConflict::columns([
                payroll_accruals::Column::BusinessDate,
                payroll_accruals::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db_tx)
        .await?;
        if inserted == 0 {
            return Ok(AccrualOutcome::Skipped);
        }

        tracing::info!(
            %business_date,
            user_id,
            amount = %accrual.amount,
            "payroll accrued"
        );
        Ok(AccrualOutcome::Accrued(accrual))
    }
}
