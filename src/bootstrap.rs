use tracing::{info, warn};

use crate::{
    auth::{gate::is_valid_email, password::hash_password, services::normalize_email},
    config::AdminSeed,
    error::{AppError, AppResult},
    users::{NewUser, Role, User, UserFilter, UserStatus, UserStore},
};

/// Creates a pre-approved admin when the store has no approved one.
///
/// Runs outside the registration flow; existing accounts are never touched.
pub async fn ensure_admin(store: &dyn UserStore, seed: &AdminSeed) -> AppResult<Option<User>> {
    let approved_admins = UserFilter {
        status: Some(UserStatus::Approved),
        role: Some(Role::Admin),
    };
    if store.count(approved_admins).await? > 0 {
        info!("approved admin present; skipping bootstrap");
        return Ok(None);
    }

    // Env values may carry stray whitespace from `.env` files.
    let raw = seed.email.trim();
    if !is_valid_email(raw) {
        return Err(AppError::invalid_email());
    }
    let email = normalize_email(raw);
    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "bootstrap email already registered; skipping");
        return Ok(None);
    }

    let user = store
        .insert(NewUser {
            name: seed.name.trim().to_string(),
            email,
            password_hash: hash_password(&seed.password)?,
            role: Role::Admin,
            status: UserStatus::Approved,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::MemoryUserStore;

    fn seed() -> AdminSeed {
        AdminSeed {
            name: "System Administrator".into(),
            email: "Admin@Example.com".into(),
            password: "admin-pass".into(),
        }
    }

    #[tokio::test]
    async fn creates_approved_admin_once() {
        let store = MemoryUserStore::new();
        let admin = ensure_admin(&store, &seed())
            .await
            .unwrap()
            .expect("created");
        assert_eq!(admin.role, "admin");
        assert_eq!(admin.status, "approved");
        assert_eq!(admin.email, "admin@example.com");

        assert!(ensure_admin(&store, &seed()).await.unwrap().is_none());
        assert_eq!(store.count(Default::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn pending_admin_registrations_do_not_count() {
        let store = MemoryUserStore::new();
        let pending = store
            .insert(NewUser {
                name: "Other".into(),
                email: "other@example.com".into(),
                password_hash: "$argon2id$placeholder".into(),
                role: Role::Admin,
                status: UserStatus::Pending,
            })
            .await
            .unwrap();
        let admin = ensure_admin(&store, &seed())
            .await
            .unwrap()
            .expect("created");
        assert_ne!(admin.id, pending.id);
        let still = store.find_by_id(pending.id).await.unwrap().unwrap();
        assert_eq!(still.status, "pending");
    }

    #[tokio::test]
    async fn never_promotes_an_existing_account() {
        let store = MemoryUserStore::new();
        let existing = store
            .insert(NewUser {
                name: "Taken".into(),
                email: "admin@example.com".into(),
                password_hash: "$argon2id$placeholder".into(),
                role: Role::Client,
                status: UserStatus::Pending,
            })
            .await
            .unwrap();
        assert!(ensure_admin(&store, &seed()).await.unwrap().is_none());
        let still = store.find_by_id(existing.id).await.unwrap().unwrap();
        assert_eq!(still.role, "client");
        assert_eq!(still.status, "pending");
    }
}
