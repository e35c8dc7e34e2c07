//! Automatic daily closure.
//!
//! On start the scheduler closes the previous `backfill_days` dates, then
//! sleeps until the configured local time and closes the current business
//! date, every day, until cancelled. Failures are logged and never stop the
//! loop.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use engine::{Engine, SYSTEM_USER, calendar};
use tokio_util::sync::CancellationToken;

/// Used when no future instant of `close_time` can be resolved.
const RETRY_DELAY: Duration = Duration::from_secs(60 * 60);

pub struct AutoClose {
    engine: Arc<Engine>,
    close_time: NaiveTime,
    backfill_days: u32,
}

impl AutoClose {
    pub fn new(engine: Arc<Engine>, close_time: NaiveTime, backfill_days: u32) -> Self {
        Self {
            engine,
            close_time,
            backfill_days,
        }
    }

    /// Closes the last `backfill_days` dates before today, oldest first.
    /// Returns how many of them were closed successfully.
    pub async fn backfill(&self) -> usize {
        let today = self.engine.today();
        let mut closed = 0;
        for date in calendar::previous_days(today, self.backfill_days) {
            if self.close(date).await {
                closed += 1;
            }
        }
        tracing::info!(days = self.backfill_days, closed, "auto-close backfill done");
        closed
    }

    pub async fn run(self, token: CancellationToken) {
        self.backfill().await;

        loop {
            let now = Utc::now().with_timezone(&self.engine.timezone());
            let wait = match next_occurrence(now, self.close_time) {
                Some(next) => {
                    tracing::debug!(next = %next, "next auto-close scheduled");
                    (next - now).to_std().unwrap_or(Duration::ZERO)
                }
                None => {
                    tracing::warn!(close_time = %self.close_time, "cannot resolve next auto-close");
                    RETRY_DELAY
                }
            };

            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("auto-close scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let date = self.engine.today();
            self.close(date).await;
        }
    }

    async fn close(&self, date: NaiveDate) -> bool {
        match self.engine.close_day(date, SYSTEM_USER).await {
            Ok(closure) => {
                tracing::info!(
                    %date,
                    status = closure.status.as_str(),
                    balance = %closure.summary.balance,
                    "auto-close done"
                );
                true
            }
            Err(err) => {
                tracing::error!(%date, "auto-close failed: {err}");
                false
            }
        }
    }
}

/// First instant strictly after `now` whose local time is `at`.
///
/// Days where `at` falls in a DST gap are skipped.
pub fn next_occurrence(now: DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    (0..=2)
        .filter_map(|offset| now.date_naive().checked_add_days(Days::new(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(at)).earliest())
        .find(|candidate| *candidate > now)
}

#[cfg(test)]
mod tests {
    use engine::{CashEntryCmd, CashEntryKind, Money};
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn next_occurrence_is_today_before_close_time() {
        let tz = calendar::DEFAULT_TIMEZONE;
        let now = tz.with_ymd_and_hms(2024, 1, 10, 19, 59, 0).unwrap();
        let next = next_occurrence(now, at(20, 0)).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow_at_or_after_close_time() {
        let tz = calendar::DEFAULT_TIMEZONE;
        let exactly = tz.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap();
        let later = tz.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();

        assert_eq!(
            next_occurrence(exactly, at(20, 0)).unwrap(),
            tz.with_ymd_and_hms(2024, 1, 11, 20, 0, 0).unwrap()
        );
        assert_eq!(
            next_occurrence(later, at(20, 0)).unwrap(),
            tz.with_ymd_and_hms(2024, 2, 1, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_occurrence_skips_dst_gap() {
        // 02:30 does not exist in New York on 2024-03-10.
        let tz = chrono_tz::America::New_York;
        let now = tz.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let next = next_occurrence(now, at(2, 30)).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2024, 3, 11, 2, 30, 0).unwrap());
    }

    async fn engine() -> Arc<Engine> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Arc::new(
            Engine::builder()
                .database(db)
                .build()
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn backfill_closes_previous_days_and_keeps_values() {
        let engine = engine().await;
        let today = engine.today();
        let yesterday = calendar::previous_days(today, 1)[0];
        engine
            .new_cash_entry(CashEntryCmd {
                business_date: Some(yesterday),
                kind: CashEntryKind::Income,
                description: "venta".to_string(),
                amount: Money::new(2500),
                user_id: "walter".to_string(),
                user_name: "Walter".to_string(),
            })
            .await
            .unwrap();

        let auto_close = AutoClose::new(engine.clone(), at(20, 0), 3);
        assert_eq!(auto_close.backfill().await, 3);

        let first = engine.daily_summary(yesterday).await.unwrap();
        assert_eq!(first.balance, Money::new(2500));
        assert_eq!(first.closed_by, SYSTEM_USER);
        assert!(engine.daily_summary(today).await.is_err());

        assert_eq!(auto_close.backfill().await, 3);
        let second = engine.daily_summary(yesterday).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.incomes, first.incomes);
        assert_eq!(second.expenses, first.expenses);
        assert_eq!(second.balance, first.balance);

        let summaries = engine
            .daily_summaries(calendar::previous_days(today, 3)[0], today)
            .await
            .unwrap();
        assert_eq!(summaries.len(), 3);
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let engine = engine().await;
        let token = CancellationToken::new();
        let auto_close = AutoClose::new(engine.clone(), at(20, 0), 0);

        let handle = tokio::spawn(auto_close.run(token.clone()));
        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
