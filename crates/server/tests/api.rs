use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, PayrollPolicy};
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, display_name, role, active) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            "walter".into(),
            "secret".into(),
            "Walter".into(),
            "worker".into(),
            true.into(),
        ],
    ))
    .await
    .unwrap();

    let engine = Engine::builder()
        .database(db.clone())
        .payroll(PayrollPolicy {
            daily_rate: "100.00".parse().unwrap(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic("walter", "secret"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;
    let request = Request::builder()
        .uri("/items")
        .header(header::AUTHORIZATION, basic("walter", "nope"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn movements_follow_stock_rules() {
    let app = app().await;

    let (status, item) = call(
        &app,
        "POST",
        "/items",
        Some(json!({"sku": "RTR-X", "name": "Router X", "min_stock": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, warehouse) = call(&app, "POST", "/warehouses", Some(json!({"name": "Main"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let warehouse_id = warehouse["id"].as_str().unwrap().to_string();

    let movement = |kind: &str, quantity: i64| {
        json!({
            "item_id": item_id,
            "warehouse_id": warehouse_id,
            "type": kind,
            "quantity": quantity,
        })
    };

    let (status, _) = call(&app, "POST", "/movements", Some(movement("IN", 10))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, out) = call(&app, "POST", "/movements", Some(movement("OUT", 3))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(out["created_by"], "walter");
    let (status, err) = call(&app, "POST", "/movements", Some(movement("OUT", 8))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("available 7"));

    let (status, levels) = call(&app, "GET", &format!("/stock?item_id={item_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels[0]["quantity"], 7);

    let (status, history) =
        call(&app, "GET", &format!("/items/{item_id}/movements?limit=1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["type"], "OUT");

    let (status, low) = call(&app, "GET", "/items/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(low.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn movement_without_warehouse_is_422() {
    let app = app().await;
    let (_, item) = call(
        &app,
        "POST",
        "/items",
        Some(json!({"sku": "ONU-1", "name": "ONU"})),
    )
    .await;

    let (status, _) = call(
        &app,
        "POST",
        "/movements",
        Some(json!({"item_id": item["id"], "type": "IN", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn close_day_over_http_is_idempotent() {
    let app = app().await;

    for (kind, amount) in [("INCOME", "150.00"), ("EXPENSE", "40,00")] {
        let (status, entry) = call(
            &app,
            "POST",
            "/cash/entries",
            Some(json!({
                "date": "2024-01-10",
                "type": kind,
                "description": "mostrador",
                "amount": amount,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["created_by_name"], "Walter");
    }

    let (status, totals) = call(
        &app,
        "GET",
        "/cash/totals?from=2024-01-10&to=2024-01-10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals[0]["balance"], "110.00");

    let (status, first) = call(&app, "POST", "/cash/close", Some(json!({"date": "2024-01-10"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "closed");
    assert_eq!(first["summary"]["incomes"], "150.00");
    assert_eq!(first["summary"]["expenses"], "40.00");
    assert_eq!(first["summary"]["balance"], "110.00");
    assert_eq!(first["workers"][0]["user_id"], "walter");
    assert_eq!(first["accrued"][0]["amount"], "100.00");

    let (status, second) =
        call(&app, "POST", "/cash/close", Some(json!({"date": "2024-01-10"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "reclosed");
    assert!(second["accrued"].as_array().unwrap().is_empty());

    let (status, detail) = call(&app, "GET", "/cash/closures/2024-01-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["summary"]["balance_minor"], 11000);

    let (status, accruals) = call(
        &app,
        "GET",
        "/payroll/accruals?from=2024-01-01&to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accruals["accruals"].as_array().unwrap().len(), 1);
    assert_eq!(accruals["total"], "100.00");
}

#[tokio::test]
async fn bad_inputs_map_to_4xx() {
    let app = app().await;

    let (status, _) = call(&app, "GET", "/cash/closures/10-01-2024", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "GET", "/cash/closures/2024-01-10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/cash/entries",
        Some(json!({"type": "INCOME", "description": "x", "amount": "1.234"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "GET",
        "/cash/totals?from=2024-01-11&to=2024-01-10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
