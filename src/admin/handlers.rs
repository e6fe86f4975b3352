use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    admin::{
        dto::{ListUsersQuery, PendingUsers, UserPage},
        services,
    },
    auth::{
        dto::{ApiResponse, UserPayload},
        jwt::AdminUser,
    },
    error::AppResult,
    extract::{ApiPath, ApiQuery},
    state::AppState,
    users::StatusCounts,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users/pending", get(list_pending))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:user_id", get(get_user).delete(delete_user))
        .route("/admin/users/:user_id/approve", put(approve_user))
        .route("/admin/users/:user_id/reject", put(reject_user))
        .route("/admin/stats", get(stats))
}

#[instrument(skip_all)]
pub async fn list_pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<PendingUsers>>> {
    let pending = services::list_pending(state.users.as_ref()).await?;
    Ok(Json(ApiResponse::with_message(
        "Pending users retrieved successfully",
        pending,
    )))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> AppResult<Json<ApiResponse<UserPage>>> {
    let page = services::list_all(state.users.as_ref(), query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<UserPayload>>> {
    let user = services::get_by_id(state.users.as_ref(), user_id).await?;
    Ok(Json(ApiResponse::ok(UserPayload { user: user.into() })))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn approve_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<UserPayload>>> {
    let user = services::approve(state.users.as_ref(), user_id).await?;
    Ok(Json(ApiResponse::with_message(
        "User approved",
        UserPayload { user: user.into() },
    )))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn reject_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<UserPayload>>> {
    let user = services::reject(state.users.as_ref(), user_id).await?;
    Ok(Json(ApiResponse::with_message(
        "User rejected",
        UserPayload { user: user.into() },
    )))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    services::delete_user(state.users.as_ref(), user_id).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}

#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<StatusCounts>>> {
    let counts = services::stats(state.users.as_ref()).await?;
    Ok(Json(ApiResponse::ok(counts)))
}
