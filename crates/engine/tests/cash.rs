use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccrualFilter, AccrualOutcome, CashEntryCmd, CashEntryFilter, CashEntryKind, CloseStatus,
    Engine, EngineError, Money, PayrollPolicy, SYSTEM_USER,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn date(raw: &str) -> NaiveDate {
    engine::calendar::parse_date(raw).unwrap()
}

fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

async fn insert_user(db: &DatabaseConnection, username: &str, active: bool) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, display_name, role, active) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            username.into(),
            "password".into(),
            username.into(),
            "worker".into(),
            active.into(),
        ],
    ))
    .await
    .unwrap();
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    insert_user(&db, "walter", true).await;
    let engine = Engine::builder()
        .database(db.clone())
        .payroll(PayrollPolicy {
            daily_rate: money("100.00"),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn entry(day: &str, kind: CashEntryKind, amount: &str, user: &str) -> CashEntryCmd {
    CashEntryCmd {
        business_date: Some(date(day)),
        kind,
        description: format!("{} {amount}", kind.as_str()),
        amount: money(amount),
        user_id: user.to_string(),
        user_name: user.to_uppercase(),
    }
}

fn range(from: &str, to: &str) -> CashEntryFilter {
    CashEntryFilter {
        from: date(from),
        to: date(to),
        created_by: None,
    }
}

#[tokio::test]
async fn close_day_sums_marks_worker_and_accrues_once() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "150.00", "walter"))
        .await
        .unwrap();
    engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Expense, "40.00", "walter"))
        .await
        .unwrap();

    let first = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();
    assert_eq!(first.status, CloseStatus::Closed);
    assert_eq!(first.summary.incomes, money("150.00"));
    assert_eq!(first.summary.expenses, money("40.00"));
    assert_eq!(first.summary.balance, money("110.00"));
    assert_eq!(first.closures.len(), 1);
    assert_eq!(first.closures[0].user_id, "walter");
    assert_eq!(first.closures[0].cash_closure_id, first.summary.id);
    assert_eq!(first.accrued.len(), 1);
    assert_eq!(first.accrued[0].amount, money("100.00"));
    assert_eq!(first.accrued[0].description, "Sueldo diario");

    let second = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();
    assert_eq!(second.status, CloseStatus::Reclosed);
    assert_eq!(second.summary.id, first.summary.id);
    assert_eq!(second.summary.balance, money("110.00"));
    assert!(second.accrued.is_empty());

    let accruals = engine
        .accruals(&AccrualFilter {
            from: date("2024-01-10"),
            to: date("2024-01-10"),
            user_id: Some("walter".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(accruals.len(), 1);

    let summaries = engine
        .daily_summaries(date("2024-01-01"), date("2024-01-31"))
        .await
        .unwrap();
    assert_eq!(summaries.len(), 1);
}

#[tokio::test]
async fn close_day_without_entries_writes_zero_summary() {
    let (engine, _db) = engine_with_db().await;

    let closure = engine
        .close_day(date("2024-02-01"), SYSTEM_USER)
        .await
        .unwrap();
    assert!(closure.summary.incomes.is_zero());
    assert!(closure.summary.expenses.is_zero());
    assert!(closure.summary.balance.is_zero());
    assert_eq!(closure.summary.closed_by, SYSTEM_USER);
    assert!(closure.closures.is_empty());
    assert!(closure.accrued.is_empty());

    let summary = engine.daily_summary(date("2024-02-01")).await.unwrap();
    assert_eq!(summary.id, closure.summary.id);
}

#[tokio::test]
async fn reclose_picks_up_late_entries_and_new_workers() {
    let (engine, db) = engine_with_db().await;
    insert_user(&db, "maria", true).await;
    engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "10.00", "walter"))
        .await
        .unwrap();
    engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();

    engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "5.50", "maria"))
        .await
        .unwrap();
    let closure = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();

    assert_eq!(closure.summary.incomes, money("15.50"));
    assert_eq!(closure.closures.len(), 2);
    assert_eq!(closure.accrued.len(), 1);
    assert_eq!(closure.accrued[0].user_id, "maria");
}

#[tokio::test]
async fn repeated_close_keeps_existing_values() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_cash_entry(entry("2024-01-09", CashEntryKind::Income, "20.00", "walter"))
        .await
        .unwrap();
    let before = engine
        .close_day(date("2024-01-09"), "admin")
        .await
        .unwrap()
        .summary;

    let after = engine
        .close_day(date("2024-01-09"), SYSTEM_USER)
        .await
        .unwrap()
        .summary;
    assert_eq!(after.id, before.id);
    assert_eq!(after.incomes, before.incomes);
    assert_eq!(after.expenses, before.expenses);
    assert_eq!(after.balance, before.balance);
}

#[tokio::test]
async fn inactive_worker_is_closed_but_not_accrued() {
    let (engine, db) = engine_with_db().await;
    insert_user(&db, "pedro", false).await;
    engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "1.00", "pedro"))
        .await
        .unwrap();

    let closure = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();
    assert_eq!(closure.closures.len(), 1);
    assert!(closure.accrued.is_empty());
}

#[tokio::test]
async fn accrue_if_absent_skips_existing_pair() {
    let (engine, _db) = engine_with_db().await;
    let closure = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();

    let first = engine
        .accrue_if_absent(
            date("2024-01-10"),
            "walter",
            "Walter",
            money("80.00"),
            closure.summary.id,
        )
        .await
        .unwrap();
    assert!(matches!(first, AccrualOutcome::Accrued(_)));

    let second = engine
        .accrue_if_absent(
            date("2024-01-10"),
            "walter",
            "Walter",
            money("80.00"),
            closure.summary.id,
        )
        .await
        .unwrap();
    assert_eq!(second, AccrualOutcome::Skipped);

    let err = engine
        .accrue_if_absent(
            date("2024-01-11"),
            "walter",
            "Walter",
            money("80.00"),
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn compute_totals_is_a_pure_read() {
    let (engine, _db) = engine_with_db().await;
    for cmd in [
        entry("2024-01-09", CashEntryKind::Income, "12.00", "walter"),
        entry("2024-01-10", CashEntryKind::Income, "150.00", "walter"),
        entry("2024-01-10", CashEntryKind::Expense, "40.00", "maria"),
        entry("2024-01-11", CashEntryKind::Expense, "3.25", "walter"),
    ] {
        engine.new_cash_entry(cmd).await.unwrap();
    }

    let filter = range("2024-01-09", "2024-01-11");
    let first = engine.compute_totals(&filter).await.unwrap();
    let second = engine.compute_totals(&filter).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    for totals in &first {
        assert_eq!(
            Some(totals.balance),
            totals.incomes.checked_sub(totals.expenses)
        );
    }
    assert_eq!(first[2].balance, money("-3.25"));

    // nothing was closed by reading
    let err = engine.daily_summary(date("2024-01-10")).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let walter_only = engine
        .compute_totals(&CashEntryFilter {
            created_by: Some("walter".to_string()),
            ..range("2024-01-10", "2024-01-10")
        })
        .await
        .unwrap();
    assert_eq!(walter_only.len(), 1);
    assert_eq!(walter_only[0].balance, money("150.00"));
}

#[tokio::test]
async fn invalid_entries_and_ranges_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "0.00", "walter"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));

    let mut blank = entry("2024-01-10", CashEntryKind::Income, "1.00", "walter");
    blank.description = "  ".to_string();
    let err = engine.new_cash_entry(blank).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));

    let err = engine
        .compute_totals(&range("2024-01-11", "2024-01-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}

#[tokio::test]
async fn totals_past_i64_are_rejected_not_wrapped() {
    let (engine, _db) = engine_with_db().await;
    for _ in 0..2 {
        engine
            .new_cash_entry(entry(
                "2024-01-10",
                CashEntryKind::Income,
                "50000000000000000.00",
                "walter",
            ))
            .await
            .unwrap();
    }

    let err = engine
        .compute_totals(&range("2024-01-10", "2024-01-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));

    let err = engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
    let err = engine.daily_summary(date("2024-01-10")).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn entry_without_date_lands_on_business_today() {
    let (engine, _db) = engine_with_db().await;
    let mut cmd = entry("2024-01-10", CashEntryKind::Income, "1.00", "walter");
    cmd.business_date = None;

    let created = engine.new_cash_entry(cmd).await.unwrap();
    assert_eq!(created.business_date, engine.today());
}

#[tokio::test]
async fn delete_entry_is_blocked_after_closure() {
    let (engine, _db) = engine_with_db().await;
    let open = engine
        .new_cash_entry(entry("2024-01-09", CashEntryKind::Income, "1.00", "walter"))
        .await
        .unwrap();
    let closed = engine
        .new_cash_entry(entry("2024-01-10", CashEntryKind::Income, "1.00", "walter"))
        .await
        .unwrap();
    engine
        .close_day(date("2024-01-10"), "admin")
        .await
        .unwrap();

    engine.delete_cash_entry(open.id).await.unwrap();
    let err = engine.delete_cash_entry(closed.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    let err = engine.delete_cash_entry(open.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let left = engine
        .cash_entries(&range("2024-01-01", "2024-01-31"))
        .await
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, closed.id);
}
