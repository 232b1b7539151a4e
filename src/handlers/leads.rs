// src/handlers/leads.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::{headers::UserAgent, TypedHeader};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{JsonBody, PathParam, QueryParams},
    },
    config::AppState,
    db::LeadFilter,
    models::{
        lead::{Document, DocumentUpload, Lead, LeadDetail, LeadStatus, StatusEvent},
        quote::{QuoteSaveRequest, QuoteSaveResponse},
    },
};

// =============================================================================
//  ÁREA 1: WIZARD (PÚBLICO)
// =============================================================================

// POST /api/leads/quote
#[utoipa::path(
    post,
    path = "/api/leads/quote",
    tag = "Quote Wizard",
    request_body = QuoteSaveRequest,
    responses(
        (status = 201, description = "Lead criado", body = QuoteSaveResponse),
        (status = 200, description = "Lead atualizado", body = QuoteSaveResponse),
        (status = 400, description = "Passo inválido ou nome/e-mail ausentes"),
        (status = 404, description = "leadId desconhecido")
    )
)]
pub async fn save_quote(
    State(app_state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    JsonBody(payload): JsonBody<QuoteSaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = payload.lead_id.is_none();
    let header_user_agent = user_agent.map(|TypedHeader(ua)| ua.as_str().to_string());

    let saved = app_state
        .lead_service
        .save_quote(payload, header_user_agent)
        .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(saved)))
}

// =============================================================================
//  ÁREA 2: DASHBOARD INTERNO
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadListQuery {
    /// Filtra por status (New, Contacted, Qualified, AwaitingDocs, Converted, Lost)
    #[param(value_type = Option<String>)]
    pub status: Option<LeadStatus>,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadListQuery),
    responses(
        (status = 200, description = "Leads, mais recentes primeiro", body = Vec<Lead>)
    )
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    QueryParams(query): QueryParams<LeadListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state
        .lead_service
        .list_leads(LeadFilter { status: query.status })
        .await?;

    Ok((StatusCode::OK, Json(leads)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com documentos e histórico (mais recente primeiro)", body = LeadDetail),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.lead_service.get_lead(id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(value_type = String, example = "Contacted")]
    pub status: LeadStatus,
    #[schema(example = "Spoke to client, sending engagement letter")]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub success: bool,
    pub lead: Lead,
    /// `null` quando o status já era o pedido.
    pub event: Option<StatusEvent>,
}

// PATCH /api/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    request_body = ChangeStatusPayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Status alterado e evento gravado", body = StatusChangeResponse),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<ChangeStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (lead, event) = app_state
        .lead_service
        .change_status(id, payload.status, payload.comment.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(StatusChangeResponse { success: true, lead, event })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTriagePayload {
    #[validate(range(min = 0, max = 100, message = "invalid_score"))]
    #[schema(example = 72)]
    pub lead_score: Option<i32>,
    #[validate(length(max = 50, message = "too_long"))]
    #[schema(example = "hot")]
    pub priority_tag: Option<String>,
}

// PATCH /api/leads/{id}
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = UpdateTriagePayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Triagem atualizada", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn update_triage(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateTriagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .update_triage(id, payload.lead_score, payload.priority_tag)
        .await?;

    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/{id}/documents
#[utoipa::path(
    post,
    path = "/api/leads/{id}/documents",
    tag = "Leads",
    request_body = DocumentUpload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 201, description = "Documento registrado pelo escritório", body = Document),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn add_document(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<DocumentUpload>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state
        .lead_service
        .add_dashboard_document(id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(doc)))
}
