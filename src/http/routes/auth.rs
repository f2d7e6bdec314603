use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::extract::{ApiJson, CurrentUser};
use crate::http::{run_blocking, ApiResult, AppState};
use crate::models::UserProfile;
use crate::services::{RegisterInput, UserService};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let user = run_blocking(&state, move |storage| UserService::new(storage).register(input)).await?;
    let token = state.signer.issue(&user.username)?;
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginBody>,
) -> ApiResult<Json<TokenResponse>> {
    let user = run_blocking(&state, move |storage| {
        UserService::new(storage).authenticate(&body.username, &body.password)
    })
    .await?;
    let token = state.signer.issue(&user.username)?;
    Ok(Json(TokenResponse::bearer(token)))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}
