// src/client/portal.rs
// Página pública de acompanhamento por token.

use crate::{
    client::api::{ClientError, PortalApi},
    models::{
        lead::{Document, DocumentUpload},
        portal::PortalLead,
        progress::StatusProgress,
    },
};

#[derive(Debug, Clone)]
pub enum PortalState {
    Loading,
    Ready(PortalLead),
    AccessDenied,
    Unavailable(String),
}

pub struct PortalView<A> {
    api: A,
    token: String,
    state: PortalState,
}

impl<A: PortalApi> PortalView<A> {
    pub fn new(api: A, token: impl Into<String>) -> Self {
        Self { api, token: token.into(), state: PortalState::Loading }
    }

    pub fn state(&self) -> &PortalState {
        &self.state
    }

    pub fn progress(&self) -> Option<&StatusProgress> {
        match &self.state {
            PortalState::Ready(lead) => Some(&lead.progress),
            _ => None,
        }
    }

    pub async fn load(&mut self) -> &PortalState {
        self.state = match self.api.get_portal_lead(&self.token).await {
            Ok(lead) => PortalState::Ready(lead),
            Err(e) if e.is_access_denied() => PortalState::AccessDenied,
            Err(e) => {
                tracing::warn!(error = %e, "portal indisponível");
                PortalState::Unavailable(e.to_string())
            }
        };
        &self.state
    }

    /// Envia o documento e recarrega o portal para refletir a lista nova.
    pub async fn upload(&mut self, upload: &DocumentUpload) -> Result<Document, ClientError> {
        let document = self.api.upload_document(&self.token, upload).await?;
        self.load().await;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::lead::{DocumentSource, LeadStatus, Stage};

    #[derive(Default)]
    struct FakePortal {
        documents: Mutex<Vec<Document>>,
    }

    const TOKEN: &str = "valid-token-1234567890";

    #[async_trait]
    impl PortalApi for FakePortal {
        async fn get_portal_lead(&self, token: &str) -> Result<PortalLead, ClientError> {
            if token != TOKEN {
                return Err(ClientError::Server {
                    status: 404,
                    message: "Access Denied: this link is invalid or has expired.".into(),
                });
            }
            let status = LeadStatus::Active(Stage::AwaitingDocs);
            Ok(PortalLead {
                reference_id: "QT-20261019-ABCDEF".into(),
                full_name: "Jane Doe".into(),
                status,
                service_type: Some("Tax".into()),
                created_at: Utc::now(),
                documents: self.documents.lock().unwrap().clone(),
                status_events: Vec::new(),
                progress: StatusProgress::build(status, &[]),
            })
        }

        async fn upload_document(
            &self,
            _token: &str,
            upload: &DocumentUpload,
        ) -> Result<Document, ClientError> {
            let doc = Document {
                id: Uuid::new_v4(),
                lead_id: Uuid::nil(),
                name: upload.name.clone(),
                file_type: upload.file_type.clone(),
                size: upload.size,
                source: DocumentSource::Portal,
                created_at: Utc::now(),
            };
            self.documents.lock().unwrap().push(doc.clone());
            Ok(doc)
        }
    }

    #[tokio::test]
    async fn invalid_token_shows_access_denied() {
        let mut view = PortalView::new(FakePortal::default(), "garbage");
        assert!(matches!(view.load().await, PortalState::AccessDenied));
        assert!(view.progress().is_none());
    }

    #[tokio::test]
    async fn valid_token_exposes_progress() {
        let mut view = PortalView::new(FakePortal::default(), TOKEN);
        view.load().await;
        assert_eq!(view.progress().map(|p| p.current_index), Some(3));
    }

    #[tokio::test]
    async fn upload_refreshes_document_list() {
        let mut view = PortalView::new(FakePortal::default(), TOKEN);
        view.load().await;

        let upload = DocumentUpload { name: "payslip.pdf".into(), ..Default::default() };
        view.upload(&upload).await.unwrap();

        match view.state() {
            PortalState::Ready(lead) => assert_eq!(lead.documents.len(), 1),
            other => panic!("estado inesperado: {other:?}"),
        }
    }
}
