// src/db.rs

pub mod lead_repo;
pub use lead_repo::PgLeadRepository;
pub mod task_repo;
pub use task_repo::PgTaskRepository;
pub mod memory;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        lead::{Document, DocumentSource, Lead, LeadStatus, StatusEvent},
        task::{Task, TaskStatus, TaskSummary, TaskType},
    },
};

// =============================================================================
//  ENTRADAS DOS REPOSITÓRIOS
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewLead {
    pub reference_id: String,
    pub portal_token: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub service_type: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
    pub budget_range: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    pub last_step_completed: i32,
    pub device_metadata: Option<Value>,
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub full: String,
    pub first: String,
    pub last: Option<String>,
}

/// Atualização parcial: `None` mantém o valor gravado.
#[derive(Debug, Clone, Default)]
pub struct LeadPatch {
    pub name: Option<NameParts>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub service_type: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
    pub budget_range: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    /// Só avança: o maior valor entre o gravado e este.
    pub last_step_completed: Option<i32>,
    pub device_metadata: Option<Value>,
    /// Marca `submitted_at` na primeira vez; nunca limpa.
    pub submitted: bool,
    pub lead_score: Option<i32>,
    pub priority_tag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub lead_id: Uuid,
    pub name: String,
    pub file_type: Option<String>,
    pub size: Option<i64>,
    pub source: DocumentSource,
}

/// Documento gravado junto com o lead (ainda sem id).
#[derive(Debug, Clone)]
pub struct InitialDocument {
    pub name: String,
    pub file_type: Option<String>,
    pub size: Option<i64>,
    pub source: DocumentSource,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub assigned_to_user_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

// =============================================================================
//  CONTRATOS
// =============================================================================

/// O agregado Lead (+ documentos + eventos de status).
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Cria o lead, o evento `None -> New` e os documentos iniciais numa única operação.
    /// Se qualquer parte falhar, nada fica gravado.
    async fn create_lead(
        &self,
        lead: NewLead,
        creation_comment: Option<&str>,
        documents: Vec<InitialDocument>,
    ) -> Result<Lead, AppError>;

    async fn update_lead(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>, AppError>;

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn find_lead_by_token(&self, token: &str) -> Result<Option<Lead>, AppError>;

    /// Mais recentes primeiro.
    async fn list_leads(&self, filter: LeadFilter) -> Result<Vec<Lead>, AppError>;

    /// Troca o status e grava o evento na mesma operação.
    /// Se o status já for `new_status`, nada é gravado e o evento volta `None`.
    async fn set_status(
        &self,
        id: Uuid,
        new_status: LeadStatus,
        comment: Option<&str>,
    ) -> Result<Option<(Lead, Option<StatusEvent>)>, AppError>;

    /// Mais antigos primeiro.
    async fn list_status_events(&self, lead_id: Uuid) -> Result<Vec<StatusEvent>, AppError>;

    async fn add_document(&self, document: NewDocument) -> Result<Document, AppError>;

    /// Mais antigos primeiro.
    async fn list_documents(&self, lead_id: Uuid) -> Result<Vec<Document>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Abertas primeiro, depois por vencimento.
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskSummary>, AppError>;

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError>;

    async fn set_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, AppError>;

    /// `true` se a tarefa existia.
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}
