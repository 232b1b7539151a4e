// src/client/autosave.rs
// Autosave do wizard: decide se salva, cria ou atualiza o lead.

use uuid::Uuid;

use crate::{
    client::api::QuoteApi,
    common::tokens::PENDING_PORTAL_TOKEN,
    models::{
        lead::{DeviceMetadata, LeadData},
        quote::{QuoteSaveRequest, QuoteSaveResponse},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nome ou e-mail ainda vazios.
    MissingIdentity,
    /// Mesmos dados e nenhum passo novo desde o último save.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Skip(SkipReason),
    Create,
    Update(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(QuoteSaveResponse),
    Skipped(SkipReason),
    /// O wizard continua; a falha só é logada.
    Failed(String),
}

/// O que o wizard lembra do último save bem-sucedido.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutosaveState {
    pub lead_id: Option<Uuid>,
    pub portal_token: Option<String>,
    pub reference_id: Option<String>,
    last_saved: Option<LeadData>,
    last_saved_step: i32,
}

impl AutosaveState {
    pub fn decide(&self, data: &LeadData, step: i32) -> SaveDecision {
        // Identidade só é exigida para criar; um lead existente aceita edições parciais
        if self.lead_id.is_none() && !data.has_identity() {
            return SaveDecision::Skip(SkipReason::MissingIdentity);
        }

        let unchanged = self.last_saved.as_ref() == Some(data);
        if unchanged && step <= self.last_saved_step {
            return SaveDecision::Skip(SkipReason::Unchanged);
        }

        match self.lead_id {
            Some(id) => SaveDecision::Update(id),
            None => SaveDecision::Create,
        }
    }

    /// A resposta que chega por último vence.
    pub fn record_success(&mut self, data: &LeadData, step: i32, response: &QuoteSaveResponse) {
        self.lead_id = Some(response.lead_id);
        self.portal_token = Some(response.portal_token.clone());
        self.reference_id = Some(response.reference_id.clone());
        self.last_saved = Some(data.clone());
        self.last_saved_step = self.last_saved_step.max(step);
    }

    /// Token para uploads; antes do lead existir é o sentinela "new".
    pub fn upload_token(&self) -> &str {
        self.portal_token.as_deref().unwrap_or(PENDING_PORTAL_TOKEN)
    }
}

/// Liga o `AutosaveState` a uma `QuoteApi`.
pub struct Autosaver<A> {
    api: A,
    device: Option<DeviceMetadata>,
    state: AutosaveState,
}

impl<A: QuoteApi> Autosaver<A> {
    pub fn new(api: A, device: Option<DeviceMetadata>) -> Self {
        Self { api, device, state: AutosaveState::default() }
    }

    pub fn state(&self) -> &AutosaveState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn save(&mut self, data: &LeadData, step: i32) -> SaveOutcome {
        let lead_id = match self.state.decide(data, step) {
            SaveDecision::Skip(reason) => {
                tracing::debug!(step, ?reason, "autosave ignorado");
                return SaveOutcome::Skipped(reason);
            }
            SaveDecision::Create => None,
            SaveDecision::Update(id) => Some(id),
        };

        let request = QuoteSaveRequest {
            lead_id,
            step,
            data: data.clone(),
            device_metadata: self.device.clone(),
        };

        match self.api.save_quote(&request).await {
            Ok(response) => {
                self.state.record_success(data, step, &response);
                tracing::debug!(lead_id = %response.lead_id, step, "autosave concluído");
                SaveOutcome::Saved(response)
            }
            Err(e) => {
                tracing::warn!(step, error = %e, "autosave falhou");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::api::ClientError;

    #[derive(Default)]
    struct RecordingQuoteApi {
        requests: Mutex<Vec<QuoteSaveRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl QuoteApi for RecordingQuoteApi {
        async fn save_quote(
            &self,
            request: &QuoteSaveRequest,
        ) -> Result<QuoteSaveResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ClientError::Server { status: 500, message: "boom".into() });
            }
            Ok(QuoteSaveResponse {
                success: true,
                lead_id: request.lead_id.unwrap_or_else(Uuid::new_v4),
                portal_token: "tok123".into(),
                reference_id: "QT-20261019-ABCDEF".into(),
                last_step_completed: request.step,
                submitted: request.step == 4,
            })
        }
    }

    fn jane() -> LeadData {
        LeadData {
            full_name: "Jane Doe".into(),
            email: "jane@example.co.za".into(),
            ..Default::default()
        }
    }

    #[test]
    fn no_identity_means_no_save() {
        let state = AutosaveState::default();
        let data = LeadData { full_name: "Jane".into(), ..Default::default() };
        assert_eq!(state.decide(&data, 1), SaveDecision::Skip(SkipReason::MissingIdentity));
    }

    #[test]
    fn first_save_creates_then_updates() {
        let mut state = AutosaveState::default();
        assert_eq!(state.decide(&jane(), 1), SaveDecision::Create);

        let id = Uuid::new_v4();
        let response = QuoteSaveResponse {
            success: true,
            lead_id: id,
            portal_token: "tok".into(),
            reference_id: "QT-1".into(),
            last_step_completed: 1,
            submitted: false,
        };
        state.record_success(&jane(), 1, &response);

        assert_eq!(state.decide(&jane(), 1), SaveDecision::Skip(SkipReason::Unchanged));
        assert_eq!(state.decide(&jane(), 2), SaveDecision::Update(id));

        let mut changed = jane();
        changed.phone = "082 555 0101".into();
        assert_eq!(state.decide(&changed, 1), SaveDecision::Update(id));
    }

    #[test]
    fn existing_lead_saves_edits_even_without_identity() {
        let mut state = AutosaveState::default();
        let id = Uuid::new_v4();
        let response = QuoteSaveResponse {
            success: true,
            lead_id: id,
            portal_token: "tok".into(),
            reference_id: "QT-1".into(),
            last_step_completed: 1,
            submitted: false,
        };
        state.record_success(&jane(), 1, &response);

        let mut edited = jane();
        edited.email.clear();
        edited.phone = "082 555 0101".into();
        assert!(!edited.has_identity());
        assert_eq!(state.decide(&edited, 2), SaveDecision::Update(id));
    }

    #[tokio::test]
    async fn autosaver_sends_partial_edit_for_existing_lead() {
        let mut saver = Autosaver::new(RecordingQuoteApi::default(), None);
        assert!(matches!(saver.save(&jane(), 1).await, SaveOutcome::Saved(_)));

        let edited = LeadData { phone: "082 555 0101".into(), ..Default::default() };
        assert!(matches!(saver.save(&edited, 2).await, SaveOutcome::Saved(_)));

        let requests = saver.api().requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].lead_id, saver.state().lead_id);
        assert_eq!(requests[1].data.phone, "082 555 0101");
    }

    #[test]
    fn upload_token_is_pending_until_first_save() {
        let state = AutosaveState::default();
        assert_eq!(state.upload_token(), PENDING_PORTAL_TOKEN);
    }

    #[tokio::test]
    async fn autosaver_sends_lead_id_after_creation() {
        let mut saver = Autosaver::new(RecordingQuoteApi::default(), None);

        assert!(matches!(saver.save(&jane(), 1).await, SaveOutcome::Saved(_)));
        assert!(matches!(saver.save(&jane(), 1).await, SaveOutcome::Skipped(SkipReason::Unchanged)));
        assert!(matches!(saver.save(&jane(), 2).await, SaveOutcome::Saved(_)));

        let requests = saver.api().requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].lead_id.is_none());
        assert_eq!(requests[1].lead_id, saver.state().lead_id);
        assert_eq!(saver.state().upload_token(), "tok123");
    }

    #[tokio::test]
    async fn failed_save_is_reported_but_keeps_state() {
        let api = RecordingQuoteApi { fail: true, ..Default::default() };
        let mut saver = Autosaver::new(api, None);

        let outcome = saver.save(&jane(), 1).await;
        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert!(saver.state().lead_id.is_none());
        // Sem registro de sucesso, a próxima transição tenta de novo.
        assert_eq!(saver.state().decide(&jane(), 1), SaveDecision::Create);
    }
}
