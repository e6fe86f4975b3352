use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, StatusCounts, User, UserFilter, UserStatus};

fn matches(filter: &UserFilter, user: &User) -> bool {
    filter.status.map_or(true, |s| user.status == s.as_str())
        && filter.role.map_or(true, |r| user.role == r.as_str())
}

/// In-process store with the same contract as `PgUserStore`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a stored column directly, bypassing moderation rules.
    pub fn force_status(&self, id: Uuid, status: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.status = status.to_string();
        }
    }

    fn newest_first(&self, filter: UserFilter) -> Vec<User> {
        let users = self.users.lock().unwrap();
        let mut rows: Vec<User> = users
            .iter()
            .rev()
            .filter(|u| matches(&filter, u))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::DuplicateEmail);
        }
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            status: user.status.as_str().to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn decide(&self, id: Uuid, to: UserStatus) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id && u.status == UserStatus::Pending.as_str()) {
            Some(u) => {
                u.status = to.as_str().to_string();
                Ok(Some(u.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<Vec<User>> {
        Ok(self
            .newest_first(filter)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> AppResult<i64> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| matches(&filter, u)).count() as i64)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn count_by_status(&self) -> AppResult<StatusCounts> {
        let users = self.users.lock().unwrap();
        let mut counts = StatusCounts::default();
        for u in users.iter() {
            match u.status.parse::<UserStatus>() {
                Ok(UserStatus::Pending) => counts.pending += 1,
                Ok(UserStatus::Approved) => counts.approved += 1,
                Ok(UserStatus::Rejected) => counts.rejected += 1,
                Err(()) => {}
            }
        }
        Ok(counts)
    }
}
