use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::{future::Future, sync::Arc};

use crate::{cash, inventory, movements, payroll};
use engine::{Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the acting user from HTTP Basic credentials.
///
/// The matching `users::Model` is stored in the request extensions; handlers
/// take it with `Extension<users::Model>`. Deactivated accounts are refused.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Username.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .filter(users::Column::Active.eq(true))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("auth lookup failed: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/items", post(inventory::item_new).get(inventory::items))
        .route("/items/low-stock", get(inventory::low_stock))
        .route(
            "/items/{id}",
            get(inventory::item)
                .patch(inventory::item_update)
                .delete(inventory::item_delete),
        )
        .route("/items/{id}/movements", get(movements::for_item))
        .route(
            "/warehouses",
            post(inventory::warehouse_new).get(inventory::warehouses),
        )
        .route(
            "/warehouses/{id}",
            axum::routing::delete(inventory::warehouse_delete),
        )
        .route("/movements", post(movements::apply))
        .route("/stock", get(inventory::stock))
        .route("/cash/entries", post(cash::entry_new).get(cash::entries))
        .route(
            "/cash/entries/{id}",
            axum::routing::delete(cash::entry_delete),
        )
        .route("/cash/totals", get(cash::totals))
        .route("/cash/close", post(cash::close))
        .route("/cash/closures", get(cash::closures))
        .route("/cash/closures/{date}", get(cash::closure))
        .route("/payroll/accruals", get(payroll::accruals))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn run_with_listener<F>(
    engine: Arc<Engine>,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine, db };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
