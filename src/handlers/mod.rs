//! Request handlers, one module per area of the API.
//!
//! Handlers resolve the caller through the `AuthUser` extractor, apply role gates with
//! `AuthUser::require_role`, and delegate persistence to the `Repository` in `AppState`.
//! Every failure is an `AppError`, rendered as `{ success: false, message }`.

use chrono::{NaiveDate, Utc};

pub mod admin;
pub mod applications;
pub mod auth;
pub mod contact;
pub mod cvs;
pub mod jobs;
pub mod uploads;

/// Today's date in UTC, used for age derivation.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
