use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::FinTrackError;
use crate::http::extract::{ApiJson, ApiPath, CurrentUser};
use crate::http::{run_blocking, ApiResult, AppState};
use crate::models::{User, UserId, UserProfile};
use crate::services::{UpdateUserInput, UserService};

use super::Deleted;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Accounts may only be read or changed by their owner
fn ensure_self(caller: &User, id: UserId) -> Result<(), FinTrackError> {
    if caller.id == id {
        Ok(())
    } else {
        Err(FinTrackError::Forbidden(
            "Not allowed to access another user's account".into(),
        ))
    }
}

async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = run_blocking(&state, |storage| UserService::new(storage).list()).await?;
    Ok(Json(users.iter().map(User::profile).collect()))
}

async fn get_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<UserProfile>> {
    ensure_self(&caller, id)?;
    let user = run_blocking(&state, move |storage| UserService::new(storage).get(id)).await?;
    Ok(Json(user.profile()))
}

async fn update_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<UpdateUserInput>,
) -> ApiResult<Json<UserProfile>> {
    ensure_self(&caller, id)?;
    let user = run_blocking(&state, move |storage| UserService::new(storage).update(id, input)).await?;
    Ok(Json(user.profile()))
}

async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<Deleted>> {
    ensure_self(&caller, id)?;
    let user = run_blocking(&state, move |storage| UserService::new(storage).delete(id)).await?;
    Ok(Json(Deleted::new(format!("User '{}' deleted", user.username))))
}
