use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::{run_blocking, today, ApiResult, AppState};
use crate::models::{DateRange, TransactionId};
use crate::services::{
    CategoryTotal, CreateTransactionInput, TransactionFilter, TransactionService,
    TransactionStats, TransactionView, UpdateTransactionInput,
};

use super::Deleted;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/stats", get(transaction_stats))
        .route("/transactions/breakdown", get(transaction_breakdown))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    date_range: Option<DateRange>,
}

async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> ApiResult<Json<Vec<TransactionView>>> {
    let today = today();
    let transactions = run_blocking(&state, move |storage| {
        TransactionService::new(storage).list(user.id, &filter, today)
    })
    .await?;
    Ok(Json(transactions))
}

async fn get_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TransactionId>,
) -> ApiResult<Json<TransactionView>> {
    let view = run_blocking(&state, move |storage| {
        TransactionService::new(storage).view(user.id, id)
    })
    .await?;
    Ok(Json(view))
}

async fn create_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateTransactionInput>,
) -> ApiResult<(StatusCode, Json<TransactionView>)> {
    let today = today();
    let view = run_blocking(&state, move |storage| {
        TransactionService::new(storage).create(user.id, input, today)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TransactionId>,
    ApiJson(input): ApiJson<UpdateTransactionInput>,
) -> ApiResult<Json<TransactionView>> {
    let view = run_blocking(&state, move |storage| {
        TransactionService::new(storage).update(user.id, id, input)
    })
    .await?;
    Ok(Json(view))
}

async fn delete_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TransactionId>,
) -> ApiResult<Json<Deleted>> {
    run_blocking(&state, move |storage| {
        TransactionService::new(storage).delete(user.id, id)
    })
    .await?;
    Ok(Json(Deleted::new("Transaction deleted")))
}

async fn transaction_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Json<TransactionStats>> {
    let today = today();
    let stats = run_blocking(&state, move |storage| {
        TransactionService::new(storage).stats(user.id, query.date_range, today)
    })
    .await?;
    Ok(Json(stats))
}

async fn transaction_breakdown(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Json<Vec<CategoryTotal>>> {
    let today = today();
    let breakdown = run_blocking(&state, move |storage| {
        TransactionService::new(storage).breakdown(user.id, query.date_range, today)
    })
    .await?;
    Ok(Json(breakdown))
}
