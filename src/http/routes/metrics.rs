use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::extract::{ApiQuery, CurrentUser};
use crate::http::{run_blocking, today, ApiResult, AppState};
use crate::metrics::dashboard::{DEFAULT_MONTHS, DEFAULT_RECENT};
use crate::metrics::{
    budget_alerts, budget_overview, budget_performance, category_data, generate_insights,
    monthly_data, recent_transactions, BudgetAnalytics, BudgetOverviewStats, BudgetPeriod,
    BudgetSummary, CompleteDashboard, FinancialSummary,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics/financial-summary", get(financial_summary))
        .route("/metrics/monthly-data", get(monthly_chart))
        .route("/metrics/category-data", get(category_chart))
        .route("/metrics/recent-transactions", get(recent))
        .route("/metrics/budget-overview", get(overview))
        .route("/metrics/budget-alerts", get(alerts))
        .route("/metrics/budget-summary", get(summary))
        .route("/metrics/budget-analytics", get(analytics))
        .route("/metrics/budget-performance", get(performance))
        .route("/metrics/insights", get(insights))
        .route("/metrics/complete", get(complete))
        .route("/metrics/health", get(health))
}

#[derive(Debug, Deserialize)]
struct MonthsQuery {
    months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

async fn financial_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let today = today();
    let summary = run_blocking(&state, move |storage| {
        FinancialSummary::generate(storage, user.id, today)
    })
    .await?;
    Ok(Json(json!({ "success": true, "data": summary })))
}

async fn monthly_chart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<MonthsQuery>,
) -> ApiResult<Json<Value>> {
    let months = query.months.unwrap_or(DEFAULT_MONTHS);
    let today = today();
    let data = run_blocking(&state, move |storage| {
        monthly_data(storage, user.id, months, today)
    })
    .await?;
    Ok(Json(json!({ "success": true, "data": data, "period_month": months })))
}

async fn category_chart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let today = today();
    let data = run_blocking(&state, move |storage| category_data(storage, user.id, today)).await?;
    let total = data.len();
    Ok(Json(json!({ "success": true, "data": data, "total_categories": total })))
}

async fn recent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Value>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT);
    let data = run_blocking(&state, move |storage| {
        recent_transactions(storage, user.id, limit)
    })
    .await?;
    let count = data.len();
    Ok(Json(json!({ "success": true, "data": data, "count": count })))
}

async fn overview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let today = today();
    let items = run_blocking(&state, move |storage| budget_overview(storage, user.id, today)).await?;
    let stats = BudgetOverviewStats::from_items(&items);
    Ok(Json(json!({ "success": true, "data": items, "stats": stats })))
}

async fn alerts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let alerts = run_blocking(&state, move |storage| budget_alerts(storage, user.id)).await?;
    let count = alerts.len();
    Ok(Json(json!({ "success": true, "data": alerts, "count": count })))
}

async fn summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let summary = run_blocking(&state, move |storage| BudgetSummary::generate(storage, user.id)).await?;
    Ok(Json(json!({ "success": true, "data": summary })))
}

async fn analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<Value>> {
    let period = match query.period.as_deref() {
        Some(name) => name.parse::<BudgetPeriod>()?,
        None => BudgetPeriod::default(),
    };
    let today = today();
    let analytics = run_blocking(&state, move |storage| {
        BudgetAnalytics::generate(storage, user.id, period, today)
    })
    .await?;
    Ok(Json(json!({ "success": true, "data": analytics })))
}

async fn performance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let today = today();
    let data = run_blocking(&state, move |storage| {
        budget_performance(storage, user.id, today)
    })
    .await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

async fn insights(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let today = today();
    let insights = run_blocking(&state, move |storage| {
        generate_insights(storage, user.id, today)
    })
    .await?;
    Ok(Json(json!({ "success": true, "data": insights })))
}

async fn complete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let user_id = user.id;
    let today = today();
    let dashboard = run_blocking(&state, move |storage| {
        CompleteDashboard::generate(storage, user_id, today)
    })
    .await?;
    Ok(Json(json!({
        "success": true,
        "data": dashboard,
        "user_id": user_id,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "dashboard" }))
}
