use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{ApiResponse, LoginRequest, PublicUser, RegisterRequest, Session, UserPayload},
        jwt::{AuthUser, JwtKeys},
        services,
    },
    error::{AppError, AppResult},
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserPayload>>)> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Registration request sent. Please wait for admin approval.",
            UserPayload { user: user.into() },
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<Session>>> {
    let keys = JwtKeys::from_ref(&state);
    let session = services::login(
        state.users.as_ref(),
        &keys,
        &payload.email,
        &payload.password,
        payload.selected_role.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::with_message("Login successful", session)))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApiResponse<UserPayload>>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(Json(ApiResponse::ok(UserPayload {
        user: PublicUser::from(user),
    })))
}

/// Tokens are stateless; the client drops its copy.
#[instrument(skip_all)]
pub async fn logout(_user: AuthUser) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logged out successfully"))
}
