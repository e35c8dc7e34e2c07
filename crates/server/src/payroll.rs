//! Payroll accrual listing.

use api_types::payroll::{AccrualList, AccrualListResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{AccrualFilter, Money, users};

use crate::{ServerError, server::ServerState, views};

pub async fn accruals(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AccrualList>,
) -> Result<Json<AccrualListResponse>, ServerError> {
    let today = state.engine.today();
    let accruals = state
        .engine
        .accruals(&AccrualFilter {
            from: query.from.unwrap_or(today),
            to: query.to.unwrap_or(today),
            user_id: query.user_id,
        })
        .await?;

    let total = Money::try_sum(accruals.iter().map(|accrual| accrual.amount))?;
    Ok(Json(AccrualListResponse {
        accruals: accruals.into_iter().map(views::accrual).collect(),
        total: total.to_string(),
        total_minor: total.cents(),
    }))
}
