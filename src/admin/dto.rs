use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;

/// Query string for `GET /admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<String>,
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct PendingUsers {
    pub users: Vec<PublicUser>,
    pub count: usize,
}
