//! Moderation and user administration. Callers are already known to be admins.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{ListUsersQuery, Pagination, PendingUsers, UserPage},
    auth::dto::PublicUser,
    error::{AppError, AppResult},
    users::{Role, StatusCounts, User, UserFilter, UserStatus, UserStore},
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

pub async fn approve(store: &dyn UserStore, id: Uuid) -> AppResult<User> {
    decide(store, id, UserStatus::Approved).await
}

pub async fn reject(store: &dyn UserStore, id: Uuid) -> AppResult<User> {
    decide(store, id, UserStatus::Rejected).await
}

/// The write is conditional on the row still being pending, so two racing
/// decisions cannot both succeed.
async fn decide(store: &dyn UserStore, id: Uuid, to: UserStatus) -> AppResult<User> {
    if let Some(user) = store.decide(id, to).await? {
        info!(user_id = %id, status = %to, "user moderated");
        return Ok(user);
    }
    match store.find_by_id(id).await? {
        None => Err(AppError::NotFound),
        Some(user) => {
            warn!(user_id = %id, current = %user.status, requested = %to, "user already decided");
            Err(AppError::AlreadyDecided {
                status: user.status,
            })
        }
    }
}

pub async fn list_pending(store: &dyn UserStore) -> AppResult<PendingUsers> {
    let filter = UserFilter {
        status: Some(UserStatus::Pending),
        role: None,
    };
    let users: Vec<PublicUser> = store
        .list(filter, 0, i64::MAX)
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();
    Ok(PendingUsers {
        count: users.len(),
        users,
    })
}

pub async fn list_all(store: &dyn UserStore, query: ListUsersQuery) -> AppResult<UserPage> {
    let filter = UserFilter {
        status: parse_filter::<UserStatus>(query.status.as_deref(), "Invalid status filter")?,
        role: parse_filter::<Role>(query.role.as_deref(), "Invalid role filter")?,
    };
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return Err(AppError::InvalidInput("page must be at least 1".into()));
    }
    if limit < 1 {
        return Err(AppError::InvalidInput("limit must be at least 1".into()));
    }
    let limit = limit.min(MAX_PAGE_SIZE);
    let offset = (page - 1).saturating_mul(limit);

    let total = store.count(filter).await?;
    let users = store
        .list(filter, offset, limit)
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(UserPage {
        users,
        pagination: Pagination {
            total,
            page,
            pages: (total + limit - 1) / limit,
        },
    })
}

fn parse_filter<T: std::str::FromStr>(raw: Option<&str>, message: &str) -> AppResult<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(message.into())),
    }
}

pub async fn get_by_id(store: &dyn UserStore, id: Uuid) -> AppResult<User> {
    store.find_by_id(id).await?.ok_or(AppError::NotFound)
}

/// Hard delete; there is no tombstone.
pub async fn delete_user(store: &dyn UserStore, id: Uuid) -> AppResult<()> {
    if !store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %id, "user deleted");
    Ok(())
}

pub async fn stats(store: &dyn UserStore) -> AppResult<StatusCounts> {
    store.count_by_status().await
}
