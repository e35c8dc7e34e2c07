use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::Database;
use tempfile::TempDir;

use engine::{
    AccrualFilter, CashEntryCmd, CashEntryKind, CloseStatus, Engine, Money, MovementCmd,
    MovementKind, NewItem, PayrollPolicy,
};
use migration::MigratorTrait;

/// Pooled engine over a SQLite file, so concurrent calls really run on
/// separate connections.
async fn file_engine() -> (Arc<Engine>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("perla.db").display());
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .payroll(PayrollPolicy {
            daily_rate: "100.00".parse().unwrap(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();
    (Arc::new(engine), dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_movements_on_one_pair_all_land() {
    let (engine, _dir) = file_engine().await;
    let item = engine
        .new_item(NewItem {
            sku: "ONU-1".to_string(),
            name: "ONU".to_string(),
            category: None,
            min_stock: 0,
        })
        .await
        .unwrap();
    let main = engine.new_warehouse("Main", None).await.unwrap();
    let (item_id, warehouse_id) = (item.id, main.id);

    let tasks: Vec<_> = (0..20)
        .map(|n| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .apply_movement(MovementCmd {
                        item_id,
                        warehouse_id: Some(warehouse_id),
                        kind: MovementKind::In,
                        quantity: 1,
                        note: Some(format!("batch {n}")),
                        user_id: "alice".to_string(),
                    })
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(engine.stock_quantity(item.id, main.id).await.unwrap(), 20);
    let history = engine.movements_for_item(item.id, 100).await.unwrap();
    assert_eq!(history.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_closes_of_one_date_accrue_once() {
    let (engine, _dir) = file_engine().await;
    let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    for (user, amount) in [("walter", "150.00"), ("ana", "20.00")] {
        engine
            .new_cash_entry(CashEntryCmd {
                business_date: Some(day),
                kind: CashEntryKind::Income,
                description: "plan mensual".to_string(),
                amount: amount.parse().unwrap(),
                user_id: user.to_string(),
                user_name: user.to_uppercase(),
            })
            .await
            .unwrap();
    }

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.close_day(day, "admin").await })
        })
        .collect();
    let mut closures = Vec::new();
    for task in tasks {
        closures.push(task.await.unwrap().unwrap());
    }

    let first_closes = closures
        .iter()
        .filter(|closure| closure.status == CloseStatus::Closed)
        .count();
    assert_eq!(first_closes, 1);
    assert_eq!(
        closures.iter().map(|c| c.accrued.len()).sum::<usize>(),
        2
    );

    let summaries = engine.daily_summaries(day, day).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].balance, Money::new(170_00));
    assert_eq!(engine.user_closures(day).await.unwrap().len(), 2);

    let accruals = engine
        .accruals(&AccrualFilter {
            from: day,
            to: day,
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(accruals.len(), 2);
    assert!(accruals.iter().all(|a| a.cash_closure_id == summaries[0].id));
}
