//! Stock movement endpoints.

use api_types::movement::{MovementList, MovementNew, MovementView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{MovementCmd, users};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

/// Applies an IN/OUT movement for the authenticated user.
///
/// 409 when an OUT asks for more than the stock level holds.
pub async fn apply(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<MovementView>), ServerError> {
    let movement = state
        .engine
        .apply_movement(MovementCmd {
            item_id: payload.item_id,
            warehouse_id: payload.warehouse_id,
            kind: views::movement_kind(payload.kind),
            quantity: payload.quantity,
            note: payload.note,
            user_id: user.username,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(views::movement(movement))))
}

pub async fn for_item(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MovementList>,
) -> Result<Json<Vec<MovementView>>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let movements = state.engine.movements_for_item(id, limit).await?;
    Ok(Json(movements.into_iter().map(views::movement).collect()))
}
