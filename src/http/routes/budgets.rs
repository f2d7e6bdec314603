use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::http::extract::{ApiJson, ApiPath, CurrentUser};
use crate::http::{run_blocking, ApiResult, AppState};
use crate::models::{Budget, BudgetId};
use crate::services::{BudgetService, CreateBudgetInput, UpdateBudgetInput};

use super::Deleted;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route(
            "/budgets/:id",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
}

async fn list_budgets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Budget>>> {
    let budgets = run_blocking(&state, move |storage| BudgetService::new(storage).list(user.id)).await?;
    Ok(Json(budgets))
}

async fn get_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<BudgetId>,
) -> ApiResult<Json<Budget>> {
    let budget = run_blocking(&state, move |storage| BudgetService::new(storage).get(user.id, id)).await?;
    Ok(Json(budget))
}

async fn create_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateBudgetInput>,
) -> ApiResult<(StatusCode, Json<Budget>)> {
    let budget = run_blocking(&state, move |storage| {
        BudgetService::new(storage).create(user.id, input)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

async fn update_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<BudgetId>,
    ApiJson(input): ApiJson<UpdateBudgetInput>,
) -> ApiResult<Json<Budget>> {
    let budget = run_blocking(&state, move |storage| {
        BudgetService::new(storage).update(user.id, id, input)
    })
    .await?;
    Ok(Json(budget))
}

async fn delete_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<BudgetId>,
) -> ApiResult<Json<Deleted>> {
    let budget = run_blocking(&state, move |storage| {
        BudgetService::new(storage).delete(user.id, id)
    })
    .await?;
    Ok(Json(Deleted::new(format!("Budget '{}' deleted", budget.name))))
}
