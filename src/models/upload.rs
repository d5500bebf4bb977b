use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// MIME types accepted for resume uploads.
pub const RESUME_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// PresignedUrlRequest
///
/// Input payload for POST /api/upload/resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the object key.
    #[schema(example = "resume.pdf")]
    pub filename: String,
    /// Must be one of the resume MIME types; the URL is signed for it.
    #[schema(example = "application/pdf")]
    pub file_type: String,
}

/// PresignedUrlResponse
///
/// A short-lived PUT URL and the object key to store in the profile's `resume` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub resource_key: String,
}
