//! Data model of the portal: persisted records, request payloads and response shapes.
//!
//! Wire format is camelCase JSON. Records derive `FromRow` for the Postgres repository,
//! `ToSchema` for the OpenAPI document and `TS` for the frontend bindings.

pub mod admin;
pub mod application;
pub mod common;
pub mod contact;
pub mod cv;
pub mod job;
pub mod upload;
pub mod user;

pub use admin::*;
pub use application::*;
pub use common::*;
pub use contact::*;
pub use cv::*;
pub use job::*;
pub use upload::*;
pub use user::*;
