// src/handlers/portal.rs
// Portal público: o token na URL é a única credencial.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::AppError,
        extract::{JsonBody, PathParam},
    },
    config::AppState,
    models::{
        lead::{Document, DocumentUpload},
        portal::PortalLead,
    },
};

// GET /api/leads/portal/{token}
#[utoipa::path(
    get,
    path = "/api/leads/portal/{token}",
    tag = "Portal",
    params(("token" = String, Path, description = "Token opaco do portal")),
    responses(
        (status = 200, description = "Status, documentos e histórico (mais antigo primeiro)", body = PortalLead),
        (status = 404, description = "Token inválido (Access Denied)")
    )
)]
pub async fn get_portal_lead(
    State(app_state): State<AppState>,
    PathParam(token): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.portal_view(&token).await?;
    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/portal/{token}/documents
#[utoipa::path(
    post,
    path = "/api/leads/portal/{token}/documents",
    tag = "Portal",
    request_body = DocumentUpload,
    params(("token" = String, Path, description = "Token opaco do portal")),
    responses(
        (status = 201, description = "Documento registrado", body = Document),
        (status = 404, description = "Token inválido (Access Denied)")
    )
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    PathParam(token): PathParam<String>,
    JsonBody(payload): JsonBody<DocumentUpload>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state.lead_service.portal_upload(&token, payload).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}
