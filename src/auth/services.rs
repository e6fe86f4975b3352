//! Registration and the login pipeline.
//!
//! Login runs a fixed sequence of checks and stops at the first failure:
//! email shape, account lookup, password, role presence, role match, status
//! gate. Only when every check passes is a token issued.

use tracing::{info, warn};

use crate::{
    auth::{
        dto::{PublicUser, RegisterRequest, Session},
        gate::{check_status, is_valid_email, matches_role, StatusCheck},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{AppError, AppResult},
    users::{NewUser, Role, User, UserStatus, UserStore},
};

/// Lookup key for an email that already passed `is_valid_email`.
pub(crate) fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Creates a `pending` account, whatever role is requested.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> AppResult<User> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name is required".into()));
    }

    if !is_valid_email(&req.email) {
        return Err(AppError::invalid_email());
    }
    let email = normalize_email(&req.email);

    if req.password.is_empty() {
        return Err(AppError::InvalidInput("Password is required".into()));
    }

    let role = req
        .role
        .trim()
        .parse::<Role>()
        .map_err(|_| AppError::InvalidInput("Invalid role selected".into()))?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(&req.password)?;

    // The unique index still guards against a concurrent insert of the same email.
    let user = store
        .insert(NewUser {
            name,
            email,
            password_hash,
            role,
            status: UserStatus::Pending,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok(user)
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
    requested_role: Option<&str>,
) -> AppResult<Session> {
    if !is_valid_email(email) {
        warn!("login with malformed email");
        return Err(AppError::invalid_email());
    }
    let email = normalize_email(email);

    // Same error as a malformed email so accounts cannot be enumerated.
    let user = match store.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::invalid_email());
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredential);
    }

    // Blank means absent; anything else is compared verbatim.
    let requested_role = match requested_role {
        Some(r) if !r.trim().is_empty() => r,
        _ => {
            warn!(user_id = %user.id, "login without role");
            return Err(AppError::MissingRole);
        }
    };

    if !matches_role(requested_role, &user.role) {
        warn!(user_id = %user.id, requested = %requested_role, "login role mismatch");
        return Err(AppError::RoleMismatch);
    }

    if let StatusCheck::Denied { reason } = check_status(&user.status) {
        warn!(user_id = %user.id, status = %user.status, "login for unapproved account");
        return Err(AppError::AccountNotApproved(reason.into()));
    }

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Session {
        token,
        expires_in: keys.ttl.as_secs(),
        user: PublicUser::from(user),
    })
}
