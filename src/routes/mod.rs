//! Router Module Index
//!
//! Routes are split by access level so the authentication layer is applied per module
//! instead of per handler. Role checks (job seeker, recruiter, admin) happen in the
//! handlers through `AuthUser::require_role`.

/// Routes open to anonymous callers.
pub mod public;

/// Routes behind the `auth_middleware` layer. Requires a valid bearer token.
pub mod authenticated;

/// Admin console routes, nested under `/admin` and also behind `auth_middleware`.
pub mod admin;
