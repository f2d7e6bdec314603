use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::http::extract::{ApiJson, ApiPath, CurrentUser};
use crate::http::{run_blocking, ApiResult, AppState};
use crate::models::{Category, CategoryId};
use crate::services::CategoryService;

use super::Deleted;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(rename_category).delete(delete_category),
        )
}

#[derive(Debug, Deserialize)]
struct CategoryBody {
    name: String,
}

async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = run_blocking(&state, move |storage| {
        CategoryService::new(storage).list(user.id)
    })
    .await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<CategoryId>,
) -> ApiResult<Json<Category>> {
    let category = run_blocking(&state, move |storage| {
        CategoryService::new(storage).get(user.id, id)
    })
    .await?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CategoryBody>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = run_blocking(&state, move |storage| {
        CategoryService::new(storage).create(user.id, &body.name)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn rename_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<CategoryBody>,
) -> ApiResult<Json<Category>> {
    let category = run_blocking(&state, move |storage| {
        CategoryService::new(storage).rename(user.id, id, &body.name)
    })
    .await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<CategoryId>,
) -> ApiResult<Json<Deleted>> {
    let category = run_blocking(&state, move |storage| {
        CategoryService::new(storage).delete(user.id, id)
    })
    .await?;
    Ok(Json(Deleted::new(format!(
        "Category '{}' deleted",
        category.name
    ))))
}
