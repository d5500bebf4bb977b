use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{Page, filter_value, normalize_email};
use super::user::UserRole;
use crate::error::{AppError, Result};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
}

impl FromStr for ContactStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim() {
            "new" => Ok(ContactStatus::New),
            "read" => Ok(ContactStatus::Read),
            "replied" => Ok(ContactStatus::Replied),
            _ => Err(AppError::validation("Invalid status")),
        }
    }
}

/// ContactMessage
///
/// A support message from the `contact_messages` table. `user_type` is the submitter's
/// role when they were signed in, `null` for guests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub user_type: Option<UserRole>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(input: NewContactMessage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            subject: input.subject,
            message: input.message,
            user_type: input.user_type,
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub user_type: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl ContactRequest {
    /// Trims every field and lowercases the email before validating, so whitespace-only
    /// required fields fail.
    pub fn into_new(self, user_type: Option<UserRole>) -> Result<NewContactMessage> {
        let trimmed = ContactRequest {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        trimmed.validate()?;
        Ok(NewContactMessage {
            name: trimmed.name,
            email: trimmed.email,
            phone: trimmed.phone,
            subject: trimmed.subject,
            message: trimmed.message,
            user_type,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactReceipt {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    /// `new`, `read`, `replied` or `all`.
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub page: Page,
}

impl TryFrom<ContactListQuery> for ContactFilter {
    type Error = AppError;

    fn try_from(q: ContactListQuery) -> Result<Self> {
        Ok(Self {
            status: filter_value(q.status.as_deref())
                .map(str::parse::<ContactStatus>)
                .transpose()?,
            page: Page::new(q.page, q.limit),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateContactStatusRequest {
    #[schema(example = "read")]
    pub status: String,
}
