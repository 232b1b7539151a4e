// src/client/wizard.rs
// Máquina de passos do wizard de cotação.

use crate::{
    client::{
        api::QuoteApi,
        autosave::{AutosaveState, Autosaver, SaveOutcome},
    },
    models::{
        lead::{DeviceMetadata, DocumentUpload, LeadData},
        quote::FINAL_STEP,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Personal,
    Business,
    Documents,
    Review,
    Submitted,
}

impl WizardStep {
    /// Número enviado ao servidor (1..=4). `Submitted` não é um passo.
    pub fn number(self) -> Option<i32> {
        match self {
            WizardStep::Personal => Some(1),
            WizardStep::Business => Some(2),
            WizardStep::Documents => Some(3),
            WizardStep::Review => Some(FINAL_STEP),
            WizardStep::Submitted => None,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            WizardStep::Personal => Some(WizardStep::Business),
            WizardStep::Business => Some(WizardStep::Documents),
            WizardStep::Documents => Some(WizardStep::Review),
            WizardStep::Review | WizardStep::Submitted => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Business => Some(WizardStep::Personal),
            WizardStep::Documents => Some(WizardStep::Business),
            WizardStep::Review => Some(WizardStep::Documents),
            WizardStep::Personal | WizardStep::Submitted => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("nome completo e e-mail são obrigatórios para continuar")]
    MissingIdentity,

    #[error("a cotação já foi enviada")]
    AlreadySubmitted,

    #[error("o envio só é possível no passo de revisão")]
    NotAtReview,

    #[error("não há próximo passo; use o envio")]
    NoNextStep,
}

pub struct QuoteWizard<A> {
    step: WizardStep,
    data: LeadData,
    autosaver: Autosaver<A>,
}

impl<A: QuoteApi> QuoteWizard<A> {
    pub fn new(api: A, device: Option<DeviceMetadata>) -> Self {
        Self {
            step: WizardStep::Personal,
            data: LeadData::default(),
            autosaver: Autosaver::new(api, device),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> &LeadData {
        &self.data
    }

    pub fn autosave(&self) -> &AutosaveState {
        self.autosaver.state()
    }

    /// Edição dos campos; bloqueada depois do envio.
    pub fn data_mut(&mut self) -> Result<&mut LeadData, WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        Ok(&mut self.data)
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::Personal => self.data.has_identity(),
            WizardStep::Business | WizardStep::Documents => true,
            WizardStep::Review | WizardStep::Submitted => false,
        }
    }

    /// "Continuar": salva o passo atual e avança. A falha do autosave não bloqueia.
    pub async fn advance(&mut self) -> Result<SaveOutcome, WizardError> {
        let next = match self.step {
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            step => step.next().ok_or(WizardError::NoNextStep)?,
        };
        if !self.can_advance() {
            return Err(WizardError::MissingIdentity);
        }

        let outcome = self.save_current().await;
        self.step = next;
        Ok(outcome)
    }

    /// "Voltar": também é uma transição, então passa pelo autosave.
    pub async fn back(&mut self) -> Result<SaveOutcome, WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let outcome = self.save_current().await;
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        Ok(outcome)
    }

    /// Envio final (passo 4). Só a partir da revisão.
    pub async fn submit(&mut self) -> Result<SaveOutcome, WizardError> {
        match self.step {
            WizardStep::Review => {}
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            _ => return Err(WizardError::NotAtReview),
        }
        if !self.data.has_identity() {
            return Err(WizardError::MissingIdentity);
        }

        // Envio tentado: o wizard fecha mesmo se o save falhar.
        let outcome = self.autosaver.save(&self.data, FINAL_STEP).await;
        self.step = WizardStep::Submitted;
        Ok(outcome)
    }

    /// Guarda o arquivo no estado do wizard (um por nome). Vai ao servidor no próximo save.
    pub fn stage_document(&mut self, upload: DocumentUpload) -> Result<(), WizardError> {
        let data = self.data_mut()?;
        match data.documents.iter_mut().find(|d| d.name == upload.name) {
            Some(existing) => *existing = upload,
            None => data.documents.push(upload),
        }
        Ok(())
    }

    /// Token que acompanha uploads feitos dentro do wizard.
    pub fn upload_token(&self) -> &str {
        self.autosaver.state().upload_token()
    }

    async fn save_current(&mut self) -> SaveOutcome {
        let step = self.step.number().unwrap_or(FINAL_STEP);
        self.autosaver.save(&self.data, step).await
    }
}
