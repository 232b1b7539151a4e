// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::{
    common::{
        error::AppError,
        tokens::{generate_portal_token, generate_reference_id, PENDING_PORTAL_TOKEN},
    },
    db::{
        InitialDocument, LeadFilter, LeadPatch, LeadStore, NameParts, NewDocument, NewLead,
    },
    models::{
        lead::{
            split_full_name, DeviceMetadata, Document, DocumentSource, DocumentUpload, Lead,
            LeadData, LeadDetail, LeadStatus, StatusEvent,
        },
        portal::PortalLead,
        progress::StatusProgress,
        quote::{QuoteSaveRequest, QuoteSaveResponse, FINAL_STEP},
    },
};

const DEFAULT_SOURCE: &str = "quote_wizard";
const CREATION_COMMENT: &str = "Lead captured via quote wizard";

#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    portal_token_length: usize,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadStore>, portal_token_length: usize) -> Self {
        Self { leads, portal_token_length }
    }

    // =========================================================================
    //  1. WIZARD (UPSERT COM AUTOSAVE)
    // =========================================================================

    /// Cria ou atualiza o lead a partir de um passo do wizard.
    ///
    /// `header_user_agent` é o User-Agent da requisição, usado quando o
    /// cliente não mandou o próprio.
    pub async fn save_quote(
        &self,
        request: QuoteSaveRequest,
        header_user_agent: Option<String>,
    ) -> Result<QuoteSaveResponse, AppError> {
        if !(1..=FINAL_STEP).contains(&request.step) {
            return Err(AppError::InvalidStep(request.step));
        }
        for doc in &request.data.documents {
            doc.validate()?;
        }

        let mut device = request.device_metadata.unwrap_or_default();
        if device.user_agent.is_none() {
            device.user_agent = header_user_agent;
        }
        let device_json = (device != DeviceMetadata::default())
            .then(|| serde_json::to_value(&device))
            .transpose()
            .map_err(anyhow::Error::from)?;

        let submitted = request.step == FINAL_STEP;

        let lead = match request.lead_id {
            // Na criação os documentos já entram junto com o lead
            None => {
                self.create_from_wizard(&request.data, request.step, device_json, submitted)
                    .await?
            }
            Some(id) => {
                let email = non_empty(&request.data.email);
                if let Some(email) = &email {
                    ensure_valid_email(email)?;
                }

                let patch = LeadPatch {
                    name: non_empty(&request.data.full_name).map(|full| {
                        let (first, last) = split_full_name(&full);
                        NameParts { full, first, last }
                    }),
                    email,
                    phone: non_empty(&request.data.phone),
                    company_name: non_empty(&request.data.company_name),
                    service_type: non_empty(&request.data.service_type),
                    industry: non_empty(&request.data.industry),
                    urgency: non_empty(&request.data.urgency),
                    budget_range: non_empty(&request.data.budget_range),
                    source: non_empty(&request.data.source),
                    message: non_empty(&request.data.message),
                    last_step_completed: Some(request.step),
                    device_metadata: device_json,
                    submitted,
                    ..Default::default()
                };

                let lead = self
                    .leads
                    .update_lead(id, patch)
                    .await?
                    .ok_or(AppError::LeadNotFound(id))?;

                self.sync_wizard_documents(lead.id, &request.data.documents).await?;
                lead
            }
        };

        if submitted {
            tracing::info!(lead_id = %lead.id, reference = %lead.reference_id, "✅ Pedido de cotação enviado");
        }

        Ok(QuoteSaveResponse {
            success: true,
            lead_id: lead.id,
            portal_token: lead.portal_token,
            reference_id: lead.reference_id,
            last_step_completed: lead.last_step_completed,
            submitted: lead.submitted_at.is_some(),
        })
    }

    async fn create_from_wizard(
        &self,
        data: &LeadData,
        step: i32,
        device_metadata: Option<serde_json::Value>,
        submitted: bool,
    ) -> Result<Lead, AppError> {
        // Sem nome + e-mail não criamos nada (evita linhas lixo de quem abandona o passo 1)
        if !data.has_identity() {
            return Err(AppError::MissingIdentity);
        }
        let email = data.email.trim().to_string();
        ensure_valid_email(&email)?;

        let full_name = data.full_name.trim().to_string();
        let (first_name, last_name) = split_full_name(&full_name);

        // Um arquivo por nome, como no passo de documentos
        let mut documents: Vec<InitialDocument> = Vec::new();
        for upload in &data.documents {
            if documents.iter().any(|d| d.name == upload.name) {
                continue;
            }
            documents.push(InitialDocument {
                name: upload.name.clone(),
                file_type: upload.file_type.clone(),
                size: upload.size,
                source: DocumentSource::Wizard,
            });
        }

        let lead = self
            .leads
            .create_lead(
                NewLead {
                    reference_id: generate_reference_id(Utc::now()),
                    portal_token: generate_portal_token(self.portal_token_length),
                    full_name,
                    first_name,
                    last_name,
                    email,
                    phone: non_empty(&data.phone),
                    company_name: non_empty(&data.company_name),
                    service_type: non_empty(&data.service_type),
                    industry: non_empty(&data.industry),
                    urgency: non_empty(&data.urgency),
                    budget_range: non_empty(&data.budget_range),
                    source: non_empty(&data.source).or_else(|| Some(DEFAULT_SOURCE.to_string())),
                    message: non_empty(&data.message),
                    last_step_completed: step,
                    device_metadata,
                    submitted,
                },
                Some(CREATION_COMMENT),
                documents,
            )
            .await?;

        tracing::info!(lead_id = %lead.id, reference = %lead.reference_id, "📝 Novo lead criado pelo wizard");

        Ok(lead)
    }

    // Documentos escolhidos no passo 3 antes do lead existir chegam no payload
    async fn sync_wizard_documents(
        &self,
        lead_id: Uuid,
        uploads: &[DocumentUpload],
    ) -> Result<(), AppError> {
        if uploads.is_empty() {
            return Ok(());
        }

        let mut known: Vec<String> = self
            .leads
            .list_documents(lead_id)
            .await?
            .into_iter()
            .map(|d| d.name)
            .collect();

        for upload in uploads {
            if known.contains(&upload.name) {
                continue;
            }
            self.leads
                .add_document(NewDocument {
                    lead_id,
                    name: upload.name.clone(),
                    file_type: upload.file_type.clone(),
                    size: upload.size,
                    source: DocumentSource::Wizard,
                })
                .await?;
            known.push(upload.name.clone());
        }

        Ok(())
    }

    // =========================================================================
    //  2. DASHBOARD
    // =========================================================================

    pub async fn list_leads(&self, filter: LeadFilter) -> Result<Vec<Lead>, AppError> {
        self.leads.list_leads(filter).await
    }

    /// getLead: lead + documentos + histórico (mais recente primeiro).
    pub async fn get_lead(&self, id: Uuid) -> Result<LeadDetail, AppError> {
        let lead = self
            .leads
            .find_lead(id)
            .await?
            .ok_or(AppError::LeadNotFound(id))?;

        let documents = self.leads.list_documents(id).await?;
        let mut status_events = self.leads.list_status_events(id).await?;
        status_events.reverse();

        Ok(LeadDetail { lead, documents, status_events })
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        new_status: LeadStatus,
        comment: Option<&str>,
    ) -> Result<(Lead, Option<StatusEvent>), AppError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let (lead, event) = self
            .leads
            .set_status(id, new_status, comment)
            .await?
            .ok_or(AppError::LeadNotFound(id))?;

        match &event {
            Some(e) => tracing::info!(
                lead_id = %id,
                from = ?e.old_status.map(LeadStatus::as_str),
                to = %e.new_status,
                "🔁 Status do lead alterado"
            ),
            None => tracing::debug!(lead_id = %id, status = %new_status, "Status inalterado, nenhum evento gravado"),
        }

        Ok((lead, event))
    }

    pub async fn update_triage(
        &self,
        id: Uuid,
        lead_score: Option<i32>,
        priority_tag: Option<String>,
    ) -> Result<Lead, AppError> {
        let patch = LeadPatch {
            lead_score,
            priority_tag: priority_tag.as_deref().and_then(non_empty),
            ..Default::default()
        };
        self.leads
            .update_lead(id, patch)
            .await?
            .ok_or(AppError::LeadNotFound(id))
    }

    pub async fn add_dashboard_document(
        &self,
        id: Uuid,
        upload: DocumentUpload,
    ) -> Result<Document, AppError> {
        upload.validate()?;
        if self.leads.find_lead(id).await?.is_none() {
            return Err(AppError::LeadNotFound(id));
        }
        self.leads
            .add_document(NewDocument {
                lead_id: id,
                name: upload.name,
                file_type: upload.file_type,
                size: upload.size,
                source: DocumentSource::Dashboard,
            })
            .await
    }

    // =========================================================================
    //  3. PORTAL PÚBLICO (ACESSO POR TOKEN)
    // =========================================================================

    async fn lead_for_token(&self, token: &str) -> Result<Lead, AppError> {
        if token == PENDING_PORTAL_TOKEN {
            return Err(AppError::PortalAccessDenied);
        }
        match self.leads.find_lead_by_token(token).await? {
            Some(lead) => Ok(lead),
            None => {
                tracing::warn!("🔒 Acesso ao portal com token inválido");
                Err(AppError::PortalAccessDenied)
            }
        }
    }

    pub async fn portal_view(&self, token: &str) -> Result<PortalLead, AppError> {
        let lead = self.lead_for_token(token).await?;
        let documents = self.leads.list_documents(lead.id).await?;
        // Portal: linha do tempo do mais antigo para o mais recente
        let status_events = self.leads.list_status_events(lead.id).await?;
        let progress = StatusProgress::build(lead.status, &status_events);

        Ok(PortalLead {
            reference_id: lead.reference_id,
            full_name: lead.full_name,
            status: lead.status,
            service_type: lead.service_type,
            created_at: lead.created_at,
            documents,
            status_events,
            progress,
        })
    }

    pub async fn portal_upload(
        &self,
        token: &str,
        upload: DocumentUpload,
    ) -> Result<Document, AppError> {
        upload.validate()?;
        let lead = self.lead_for_token(token).await?;
        let doc = self
            .leads
            .add_document(NewDocument {
                lead_id: lead.id,
                name: upload.name,
                file_type: upload.file_type,
                size: upload.size,
                source: DocumentSource::Portal,
            })
            .await?;

        tracing::info!(lead_id = %lead.id, document = %doc.name, "📎 Documento enviado pelo portal");
        Ok(doc)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn ensure_valid_email(email: &str) -> Result<(), AppError> {
    if email.validate_email() {
        return Ok(());
    }
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("email");
    error.message = Some("invalid_email".into());
    errors.add("email", error);
    Err(AppError::ValidationError(errors))
}
