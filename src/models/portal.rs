// src/models/portal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    lead::{Document, LeadStatus, StatusEvent},
    progress::StatusProgress,
};

/// O que o cliente vê no portal público (GET /api/leads/portal/{token}).
///
/// Não expõe e-mail, telefone, score nem tags internas.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalLead {
    pub reference_id: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(value_type = String, example = "Qualified")]
    pub status: LeadStatus,
    pub service_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub documents: Vec<Document>,
    /// Do mais antigo para o mais recente.
    pub status_events: Vec<StatusEvent>,
    pub progress: StatusProgress,
}
