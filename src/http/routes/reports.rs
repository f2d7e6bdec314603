use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::FinTrackError;
use crate::http::extract::{ApiQuery, CurrentUser};
use crate::http::{run_blocking, today, ApiResult, AppState};
use crate::models::{DateRange, TransactionKind, UserId};
use crate::reports::{
    category_analysis, export_report, trends, CategoryAnalysis, ExportFormat, ExportRange,
    FinancialReport, ReportSummary, TrendPoint,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/custom", get(custom_report))
        .route("/reports/weekly", get(weekly_report))
        .route("/reports/monthly", get(monthly_report))
        .route("/reports/summary", get(summary))
        .route("/reports/expenses", get(expense_analysis))
        .route("/reports/income", get(income_analysis))
        .route("/reports/trends", get(monthly_trends))
        .route("/reports/export", get(export))
}

#[derive(Debug, Deserialize)]
struct CustomQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct PeriodQuery {
    period: Option<DateRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportQuery {
    format: Option<String>,
    date_range: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn custom_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<CustomQuery>,
) -> ApiResult<Json<FinancialReport>> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(FinTrackError::Validation("Start date must be before end date".into()).into());
        }
    }

    let report = run_blocking(&state, move |storage| {
        FinancialReport::generate(storage, user.id, query.start_date, query.end_date)
    })
    .await?;
    Ok(Json(report))
}

async fn named_report(
    state: &AppState,
    user_id: UserId,
    range: DateRange,
) -> ApiResult<Json<FinancialReport>> {
    let window = range.window(today());
    let report = run_blocking(state, move |storage| {
        FinancialReport::for_window(storage, user_id, window)
    })
    .await?;
    Ok(Json(report))
}

async fn weekly_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<FinancialReport>> {
    named_report(&state, user.id, DateRange::Week).await
}

async fn monthly_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<FinancialReport>> {
    named_report(&state, user.id, DateRange::Month).await
}

async fn summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<ReportSummary>> {
    let period = query.period.unwrap_or(DateRange::Month);
    let today = today();
    let summary = run_blocking(&state, move |storage| {
        ReportSummary::generate(storage, user.id, period, today)
    })
    .await?;
    Ok(Json(summary))
}

async fn analysis(
    state: &AppState,
    user_id: UserId,
    kind: TransactionKind,
    query: PeriodQuery,
) -> ApiResult<Json<Vec<CategoryAnalysis>>> {
    let period = query.period.unwrap_or(DateRange::Month);
    let today = today();
    let analysis = run_blocking(state, move |storage| {
        category_analysis(storage, user_id, kind, period, today)
    })
    .await?;
    Ok(Json(analysis))
}

async fn expense_analysis(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<CategoryAnalysis>>> {
    analysis(&state, user.id, TransactionKind::Expense, query).await
}

async fn income_analysis(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<CategoryAnalysis>>> {
    analysis(&state, user.id, TransactionKind::Income, query).await
}

async fn monthly_trends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<TrendPoint>>> {
    let today = today();
    let points = run_blocking(&state, move |storage| {
        trends(storage, user.id, query.period, today)
    })
    .await?;
    Ok(Json(points))
}

async fn export(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> ApiResult<Response> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;
    let range = ExportRange::parse(
        query.date_range.as_deref().unwrap_or("month"),
        query.start_date,
        query.end_date,
    )?;
    let today = today();

    let exported = run_blocking(&state, move |storage| {
        export_report(storage, user.id, range, format, today)
    })
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", exported.filename);
    Ok((
        [
            (header::CONTENT_TYPE, exported.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.body,
    )
        .into_response())
}
