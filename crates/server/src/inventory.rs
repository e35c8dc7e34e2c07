//! Catalogue and stock level endpoints.

use api_types::inventory::{
    ItemNew, ItemUpdate, ItemView, LowStockView, StockLevelView, StockQuery, WarehouseNew,
    WarehouseView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{StockFilter, users};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn item_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .new_item(engine::NewItem {
            sku: payload.sku,
            name: payload.name,
            category: payload.category,
            min_stock: payload.min_stock,
        })
        .await?;
    tracing::debug!(sku = %item.sku, by = %user.username, "item created via api");

    Ok((StatusCode::CREATED, Json(views::item(item))))
}

pub async fn items(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.items().await?;
    Ok(Json(items.into_iter().map(views::item).collect()))
}

pub async fn item(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.item(id).await?;
    Ok(Json(views::item(item)))
}

pub async fn item_update(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .update_item(
            id,
            engine::ItemUpdate {
                name: payload.name,
                category: payload.category,
                min_stock: payload.min_stock,
            },
        )
        .await?;
    Ok(Json(views::item(item)))
}

pub async fn item_delete(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Items below their minimum, summed over every warehouse.
pub async fn low_stock(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<LowStockView>>, ServerError> {
    let low = state.engine.low_stock().await?;
    Ok(Json(low.into_iter().map(views::low_stock).collect()))
}

pub async fn warehouse_new(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WarehouseNew>,
) -> Result<(StatusCode, Json<WarehouseView>), ServerError> {
    let warehouse = state
        .engine
        .new_warehouse(&payload.name, payload.location.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(views::warehouse(warehouse))))
}

pub async fn warehouses(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WarehouseView>>, ServerError> {
    let warehouses = state.engine.warehouses().await?;
    Ok(Json(warehouses.into_iter().map(views::warehouse).collect()))
}

pub async fn warehouse_delete(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_warehouse(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stock(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Vec<StockLevelView>>, ServerError> {
    let levels = state
        .engine
        .stock_levels(StockFilter {
            item_id: query.item_id,
            warehouse_id: query.warehouse_id,
        })
        .await?;
    Ok(Json(levels.into_iter().map(views::stock_level).collect()))
}
