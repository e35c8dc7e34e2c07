//! Cash entries and daily closure endpoints.

use api_types::cash::{
    CashEntryNew, CashEntryView, CashRange, CloseDay, ClosureResponse, DailyTotalsView,
    SummaryDetail, SummaryView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use engine::{CashEntryCmd, CashEntryFilter, Money, calendar, users};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn display_name(user: &users::Model) -> String {
    if user.display_name.trim().is_empty() {
        user.username.clone()
    } else {
        user.display_name.clone()
    }
}

/// Missing bounds default to today in the business timezone.
fn filter(state: &ServerState, range: CashRange) -> CashEntryFilter {
    let today = state.engine.today();
    CashEntryFilter {
        from: range.from.unwrap_or(today),
        to: range.to.unwrap_or(today),
        created_by: range.created_by,
    }
}

pub async fn entry_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashEntryNew>,
) -> Result<(StatusCode, Json<CashEntryView>), ServerError> {
    let amount: Money = payload.amount.parse()?;
    let entry = state
        .engine
        .new_cash_entry(CashEntryCmd {
            business_date: payload.date,
            kind: views::cash_kind(payload.kind),
            description: payload.description,
            amount,
            user_name: display_name(&user),
            user_id: user.username,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(views::cash_entry(entry))))
}

pub async fn entries(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Query(range): Query<CashRange>,
) -> Result<Json<Vec<CashEntryView>>, ServerError> {
    let filter = filter(&state, range);
    let entries = state.engine.cash_entries(&filter).await?;
    Ok(Json(entries.into_iter().map(views::cash_entry).collect()))
}

pub async fn entry_delete(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_cash_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live totals per date, never read from closures.
pub async fn totals(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Query(range): Query<CashRange>,
) -> Result<Json<Vec<DailyTotalsView>>, ServerError> {
    let filter = filter(&state, range);
    let totals = state.engine.compute_totals(&filter).await?;
    Ok(Json(totals.into_iter().map(views::totals).collect()))
}

pub async fn close(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CloseDay>,
) -> Result<Json<ClosureResponse>, ServerError> {
    let date = payload.date.unwrap_or_else(|| state.engine.today());
    let closure = state.engine.close_day(date, &user.username).await?;

    Ok(Json(ClosureResponse {
        status: closure.status.as_str().to_string(),
        summary: views::summary(closure.summary),
        workers: closure
            .closures
            .into_iter()
            .map(views::user_closure)
            .collect(),
        accrued: closure.accrued.into_iter().map(views::accrual).collect(),
    }))
}

pub async fn closures(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Query(range): Query<CashRange>,
) -> Result<Json<Vec<SummaryView>>, ServerError> {
    let filter = filter(&state, range);
    let summaries = state
        .engine
        .daily_summaries(filter.from, filter.to)
        .await?;
    Ok(Json(summaries.into_iter().map(views::summary).collect()))
}

pub async fn closure(
    _: Extension<users::Model>,
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> Result<Json<SummaryDetail>, ServerError> {
    let date: NaiveDate = calendar::parse_date(&date)?;
    let summary = state.engine.daily_summary(date).await?;
    let workers = state.engine.user_closures(date).await?;

    Ok(Json(SummaryDetail {
        summary: views::summary(summary),
        workers: workers.into_iter().map(views::user_closure).collect(),
    }))
}
