// src/models/task.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE task_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Open => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_type")]
pub enum TaskType {
    #[default]
    FollowUp,
    DocumentRequest,
    Deadline,
    InternalReview,
}

// --- TAREFA ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(example = "Request 2025 IRP5 from client")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub task_type: TaskType,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-31")]
    pub due_date: Option<NaiveDate>,
    pub assigned_to_user_id: Option<Uuid>,
    // Referência fraca: só a FK
    pub service_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    #[schema(example = "Karoo Logistics (Pty) Ltd")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestSummary {
    pub id: Uuid,
    #[schema(example = "Annual financial statements")]
    pub title: String,
    pub company: Option<CompanySummary>,
}

/// Tarefa com o resumo do pedido de serviço embutido (GET /api/tasks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    #[serde(flatten)]
    pub task: Task,
    pub service_request: Option<ServiceRequestSummary>,
}

// --- CONTRATOS DAS AÇÕES DO DASHBOARD ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Follow up on VAT registration")]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: TaskType,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-31")]
    pub due_date: Option<NaiveDate>,
    pub assigned_to_user_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
}

/// toggleTaskStatus(taskId, currentStatus)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTaskPayload {
    pub current_status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskMutationResponse {
    pub success: bool,
    pub task: Task,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_open_and_done() {
        assert_eq!(TaskStatus::Open.toggled(), TaskStatus::Done);
        assert_eq!(TaskStatus::Done.toggled(), TaskStatus::Open);
    }

    #[test]
    fn task_enums_use_variant_names_on_the_wire() {
        assert_eq!(serde_json::to_string(&TaskType::DocumentRequest).unwrap(), "\"DocumentRequest\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Open).unwrap(), "\"Open\"");
    }
}
