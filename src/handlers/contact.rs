use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::{Json, Path, Query},
    models::{
        ApiResponse, ContactFilter, ContactListQuery, ContactMessage, ContactReceipt,
        ContactRequest, ContactStatus, UpdateContactStatusRequest, UserRole,
    },
};

/// submit_contact
///
/// [Public Route] Stores a support message. A valid token tags the message with the
/// sender's role; a missing or broken token never blocks the submission.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Received", body = ContactReceipt),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn submit_contact(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContactReceipt>>)> {
    let input = payload.into_new(auth.map(|a| a.role))?;
    let message = state.repo.create_contact(input).await?;

    tracing::info!(contact_id = %message.id, "contact message received");
    let receipt = ContactReceipt {
        id: message.id,
        submitted_at: message.created_at,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            receipt,
            "Thank you for your message. We will get back to you soon.",
        )),
    ))
}

/// list_contacts
///
/// [Admin Route] Support messages, newest first, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/contact",
    params(ContactListQuery),
    responses(
        (status = 200, description = "Page of messages", body = [ContactMessage]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_contacts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ApiResponse<Vec<ContactMessage>>>> {
    auth.require_role(UserRole::Admin)?;
    let filter = ContactFilter::try_from(query)?;
    let (messages, total) = state.repo.list_contacts(&filter).await?;
    Ok(Json(ApiResponse::paged(messages, filter.page.meta(total))))
}

/// update_contact_status
#[utoipa::path(
    put,
    path = "/api/contact/{id}/status",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Updated", body = ContactMessage),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn update_contact_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactStatusRequest>,
) -> Result<Json<ApiResponse<ContactMessage>>> {
    auth.require_role(UserRole::Admin)?;
    let status: ContactStatus = payload.status.parse()?;
    let message = state
        .repo
        .set_contact_status(id, status)
        .await?
        .ok_or(AppError::NotFound("Contact message"))?;
    Ok(Json(ApiResponse::with_message(
        message,
        "Contact message status updated",
    )))
}
