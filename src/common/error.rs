use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Criação de lead sem nome completo + e-mail
    #[error("Nome completo e e-mail são obrigatórios")]
    MissingIdentity,

    #[error("Passo do wizard inválido: {0}")]
    InvalidStep(i32),

    #[error("Lead não encontrado: {0}")]
    LeadNotFound(Uuid),

    #[error("Tarefa não encontrada: {0}")]
    TaskNotFound(Uuid),

    // Token do portal inexistente (ou o sentinela "new")
    #[error("Acesso negado ao portal")]
    PortalAccessDenied,

    // Rejeições dos extratores do axum (corpo, rota, query string)
    #[error("Corpo JSON inválido: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error("Parâmetro de rota inválido: {0}")]
    InvalidPath(#[from] PathRejection),

    #[error("Query string inválida: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MissingIdentity => (
                StatusCode::BAD_REQUEST,
                "Full name and email are required before a quote can be saved.".to_string(),
            ),
            AppError::InvalidStep(step) => (
                StatusCode::BAD_REQUEST,
                format!("Step {step} is not a valid quote wizard step."),
            ),
            AppError::InvalidJson(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::InvalidPath(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::InvalidQuery(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::LeadNotFound(_) => (StatusCode::NOT_FOUND, "Lead not found.".to_string()),
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "Task not found.".to_string()),
            AppError::PortalAccessDenied => (
                StatusCode::NOT_FOUND,
                "Access Denied: this link is invalid or has expired.".to_string(),
            ),
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),

            // O resto vira 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
