// src/models/quote.rs
// Contrato do POST /api/leads/quote (usado pelo servidor e pelo cliente do wizard)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lead::{DeviceMetadata, LeadData};

/// Último passo do wizard; salvar com ele marca o lead como enviado.
pub const FINAL_STEP: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSaveRequest {
    /// Ausente = criar; presente = atualizar.
    pub lead_id: Option<Uuid>,
    #[schema(example = 1)]
    pub step: i32,
    pub data: LeadData,
    pub device_metadata: Option<DeviceMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSaveResponse {
    pub success: bool,
    pub lead_id: Uuid,
    pub portal_token: String,
    #[schema(example = "QT-20261019-7KQ2ZD")]
    pub reference_id: String,
    pub last_step_completed: i32,
    pub submitted: bool,
}
