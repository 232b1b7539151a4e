// src/client/api.rs
// Cliente HTTP do wizard, do dashboard e do portal.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    lead::{Document, DocumentUpload},
    portal::PortalLead,
    quote::{QuoteSaveRequest, QuoteSaveResponse},
    task::{SuccessResponse, Task, TaskMutationResponse, TaskStatus, TaskSummary, ToggleTaskPayload},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("falha de rede: {0}")]
    Http(#[from] reqwest::Error),

    #[error("servidor respondeu {status}: {message}")]
    Server { status: u16, message: String },

    #[error("tarefa {0} não está na lista local")]
    UnknownTask(Uuid),
}

impl ClientError {
    /// Token do portal recusado (404/401/403).
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            ClientError::Server { status, .. }
                if [StatusCode::NOT_FOUND, StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN]
                    .contains(&StatusCode::from_u16(*status).unwrap_or(StatusCode::OK))
        )
    }
}

/// Upsert do lead pelo wizard.
#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn save_quote(&self, request: &QuoteSaveRequest) -> Result<QuoteSaveResponse, ClientError>;
}

/// Ações do dashboard de tarefas.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<TaskSummary>, ClientError>;

    async fn toggle_task_status(
        &self,
        task_id: Uuid,
        current_status: TaskStatus,
    ) -> Result<Task, ClientError>;

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError>;
}

#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn get_portal_lead(&self, token: &str) -> Result<PortalLead, ClientError>;

    async fn upload_document(
        &self,
        token: &str,
        upload: &DocumentUpload,
    ) -> Result<Document, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    // Corpo de erro padrão do servidor: { success: false, error }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ClientError::Server { status: status.as_u16(), message })
}

/// Implementação reqwest contra o backend.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Sem timeout configurado, como o resto das chamadas do front.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl QuoteApi for HttpApi {
    async fn save_quote(&self, request: &QuoteSaveRequest) -> Result<QuoteSaveResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/api/leads/quote"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl TaskApi for HttpApi {
    async fn list_tasks(&self) -> Result<Vec<TaskSummary>, ClientError> {
        let response = self.client.get(self.url("/api/tasks")).send().await?;
        read_json(response).await
    }

    async fn toggle_task_status(
        &self,
        task_id: Uuid,
        current_status: TaskStatus,
    ) -> Result<Task, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tasks/{task_id}/toggle")))
            .json(&ToggleTaskPayload { current_status })
            .send()
            .await?;
        let body: TaskMutationResponse = read_json(response).await?;
        Ok(body.task)
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{task_id}")))
            .send()
            .await?;
        let _: SuccessResponse = read_json(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PortalApi for HttpApi {
    async fn get_portal_lead(&self, token: &str) -> Result<PortalLead, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/leads/portal/{token}")))
            .send()
            .await?;
        read_json(response).await
    }

    async fn upload_document(
        &self,
        token: &str,
        upload: &DocumentUpload,
    ) -> Result<Document, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/api/leads/portal/{token}/documents")))
            .json(upload)
            .send()
            .await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_covers_not_found_and_auth_statuses() {
        let denied = |status| ClientError::Server { status, message: String::new() };
        assert!(denied(404).is_access_denied());
        assert!(denied(403).is_access_denied());
        assert!(!denied(500).is_access_denied());
        assert!(!ClientError::UnknownTask(Uuid::nil()).is_access_denied());
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let api = HttpApi::new("http://localhost:3000/");
        assert_eq!(api.url("/api/tasks"), "http://localhost:3000/api/tasks");
    }
}
