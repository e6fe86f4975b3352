use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::users::repo_types::{NewUser, StatusCounts, User, UserFilter, UserStatus};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, status, created_at";

/// Persisted user records. Uniqueness of emails and atomicity of a single
/// record update are the store's responsibility.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateEmail` if the (lower-cased) email is taken.
    async fn insert(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    /// Moves a pending user to `to`. Returns `None` when the user is missing
    /// or no longer pending; nothing is written in that case.
    async fn decide(&self, id: Uuid, to: UserStatus) -> AppResult<Option<User>>;
    /// Newest first.
    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<Vec<User>>;
    async fn count(&self, filter: UserFilter) -> AppResult<i64>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_by_status(&self) -> AppResult<StatusCounts>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.status.as_str())
            .fetch_one(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateEmail,
                other => AppError::StoreUnavailable(other),
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn decide(&self, id: Uuid, to: UserStatus) -> AppResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(to.as_str())
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR role = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.role.map(|r| r.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn count(&self, filter: UserFilter) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR role = $2)
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.role.map(|r| r.as_str()))
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> AppResult<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM users GROUP BY status")
                .fetch_all(&self.db)
                .await?;
        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            match status.parse::<UserStatus>() {
                Ok(UserStatus::Pending) => counts.pending = n,
                Ok(UserStatus::Approved) => counts.approved = n,
                Ok(UserStatus::Rejected) => counts.rejected = n,
                Err(()) => {}
            }
        }
        Ok(counts)
    }
}
