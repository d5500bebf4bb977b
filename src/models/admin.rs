use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use super::common::{Page, filter_value, non_blank};
use super::user::{User, UserRole};
use crate::error::{AppError, Result};

/// DashboardStats
///
/// Platform-wide counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_job_seekers: i64,
    pub total_recruiters: i64,
    pub total_admins: i64,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub new_contact_messages: i64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// `job_seeker`, `recruiter`, `admin` or `all`.
    pub role: Option<String>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: Page,
}

impl TryFrom<UserListQuery> for UserFilter {
    type Error = AppError;

    fn try_from(q: UserListQuery) -> Result<Self> {
        Ok(Self {
            role: filter_value(q.role.as_deref())
                .map(str::parse::<UserRole>)
                .transpose()?,
            search: non_blank(q.search.as_deref()),
            page: Page::new(q.page, q.limit),
        })
    }
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                user.name.to_lowercase().contains(&term) || user.email.contains(&term)
            }
            None => true,
        }
    }
}
