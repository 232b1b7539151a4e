// src/models/lead.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    FromRow, Postgres,
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
//  STATUS DO LEAD
// =============================================================================

/// Etapas ordenadas do funil. A ordem de declaração é a ordem do stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Stage {
    New,
    Contacted,
    Qualified,
    AwaitingDocs,
    Converted,
}

impl Stage {
    pub const ORDERED: [Stage; 5] = [
        Stage::New,
        Stage::Contacted,
        Stage::Qualified,
        Stage::AwaitingDocs,
        Stage::Converted,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::New => "Received",
            Stage::Contacted => "Contacted",
            Stage::Qualified => "Qualified",
            Stage::AwaitingDocs => "Awaiting Documents",
            Stage::Converted => "Client Onboarded",
        }
    }
}

/// Status do ciclo de vida de um lead.
///
/// `Lost` fica fora da progressão ordenada: não tem índice no funil e
/// precisa ser tratado como um ramo próprio por quem renderiza o progresso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    Active(Stage),
    Lost,
}

impl LeadStatus {
    pub const NEW: LeadStatus = LeadStatus::Active(Stage::New);

    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::Active(Stage::New),
        LeadStatus::Active(Stage::Contacted),
        LeadStatus::Active(Stage::Qualified),
        LeadStatus::Active(Stage::AwaitingDocs),
        LeadStatus::Active(Stage::Converted),
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Active(Stage::New) => "New",
            LeadStatus::Active(Stage::Contacted) => "Contacted",
            LeadStatus::Active(Stage::Qualified) => "Qualified",
            LeadStatus::Active(Stage::AwaitingDocs) => "AwaitingDocs",
            LeadStatus::Active(Stage::Converted) => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }

    pub fn stage(self) -> Option<Stage> {
        match self {
            LeadStatus::Active(stage) => Some(stage),
            LeadStatus::Lost => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Active(Stage::Converted) | LeadStatus::Lost)
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::NEW
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status de lead desconhecido: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

impl Serialize for LeadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// No banco o status é TEXT com CHECK; aqui garantimos que só valores válidos entram e saem.
impl sqlx::Type<Postgres> for LeadStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for LeadStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as sqlx::Encode<'q, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for LeadStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, Postgres>>::decode(value)?;
        Ok(raw.parse::<LeadStatus>()?)
    }
}

// =============================================================================
//  LEAD (O Agregado)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    #[schema(example = "QT-20261019-7KQ2ZD")]
    pub reference_id: String,
    pub portal_token: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[schema(example = "jane@example.co.za")]
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,

    #[schema(example = "Tax")]
    pub service_type: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
    pub budget_range: Option<String>,
    pub source: Option<String>,
    pub lead_score: Option<i32>,
    pub priority_tag: Option<String>,
    pub message: Option<String>,

    #[schema(value_type = String, example = "New")]
    pub status: LeadStatus,
    #[schema(example = 4)]
    pub last_step_completed: i32,

    pub device_metadata: Option<Value>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro imutável de transição de status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[schema(value_type = Option<String>, example = "New")]
    pub old_status: Option<LeadStatus>,
    #[schema(value_type = String, example = "Contacted")]
    pub new_status: LeadStatus,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_source")]
pub enum DocumentSource {
    Wizard,
    Portal,
    Dashboard,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[schema(example = "IRP5_2026.pdf")]
    pub name: String,
    #[schema(example = "application/pdf")]
    pub file_type: Option<String>,
    pub size: Option<i64>,
    pub source: DocumentSource,
    pub created_at: DateTime<Utc>,
}

/// Lead + documentos + histórico (GET /api/leads/{id}).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub documents: Vec<Document>,
    /// Mais recente primeiro.
    pub status_events: Vec<StatusEvent>,
}

// =============================================================================
//  DADOS DO WIZARD
// =============================================================================

/// Metadados de um arquivo escolhido no passo de documentos.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "bank_statement_march.pdf")]
    pub name: String,
    pub file_type: Option<String>,
    #[validate(range(min = 0, message = "invalid_size"))]
    pub size: Option<i64>,
}

/// O estado do formulário acumulado pelo wizard (enviado inteiro a cada autosave).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadData {
    // Passo 1: Pessoal
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "jane@example.co.za")]
    pub email: String,
    pub phone: String,

    // Passo 2: Empresa
    pub company_name: String,
    pub industry: String,
    #[schema(example = "Tax")]
    pub service_type: String,
    pub urgency: String,
    pub budget_range: String,
    pub message: String,
    pub source: String,

    // Passo 3: Documentos
    pub documents: Vec<DocumentUpload>,
}

impl LeadData {
    /// Os dois campos sem os quais nenhum lead é criado.
    pub fn has_identity(&self) -> bool {
        !self.full_name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Sinais grosseiros do dispositivo (qualidade / fraude).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    pub user_agent: Option<String>,
    pub viewport: Option<Viewport>,
}

/// Divide "Jane van der Merwe" em ("Jane", Some("van der Merwe")).
pub fn split_full_name(full_name: &str) -> (String, Option<String>) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => {
            let rest = rest.trim();
            let last = (!rest.is_empty()).then(|| rest.to_string());
            (first.to_string(), last)
        }
        None => (trimmed.to_string(), None),
    }
}
