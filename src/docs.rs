// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Quote Wizard ---
        handlers::leads::save_quote,

        // --- Leads (Dashboard) ---
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::change_status,
        handlers::leads::update_triage,
        handlers::leads::add_document,

        // --- Portal ---
        handlers::portal::get_portal_lead,
        handlers::portal::upload_document,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::toggle_task_status,
        handlers::tasks::delete_task,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::Stage,
            models::lead::Lead,
            models::lead::LeadDetail,
            models::lead::StatusEvent,
            models::lead::Document,
            models::lead::DocumentSource,
            models::lead::DocumentUpload,
            models::lead::LeadData,
            models::lead::DeviceMetadata,
            models::lead::Viewport,

            // --- Quote ---
            models::quote::QuoteSaveRequest,
            models::quote::QuoteSaveResponse,

            // --- Portal ---
            models::portal::PortalLead,
            models::progress::StatusProgress,
            models::progress::StepView,
            models::progress::StepState,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::TaskType,
            models::task::Task,
            models::task::TaskSummary,
            models::task::ServiceRequestSummary,
            models::task::CompanySummary,
            models::task::CreateTaskPayload,
            models::task::ToggleTaskPayload,
            models::task::TaskMutationResponse,
            models::task::SuccessResponse,

            // --- Payloads ---
            handlers::leads::ChangeStatusPayload,
            handlers::leads::StatusChangeResponse,
            handlers::leads::UpdateTriagePayload,
        )
    ),
    tags(
        (name = "Quote Wizard", description = "Autosave do formulário de cotação"),
        (name = "Leads", description = "Gestão de Leads (Dashboard interno)"),
        (name = "Portal", description = "Acompanhamento público por token"),
        (name = "Tasks", description = "Tarefas internas de acompanhamento")
    )
)]
pub struct ApiDoc;
