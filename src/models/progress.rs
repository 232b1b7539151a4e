// src/models/progress.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::lead::{LeadStatus, Stage, StatusEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StepState {
    Complete,
    Active,
    Pending,
    /// A etapa onde o lead estava quando foi perdido.
    Halted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub stage: Stage,
    pub label: String,
    pub state: StepState,
}

/// O stepper do portal, calculado no servidor a partir do status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusProgress {
    pub current_index: usize,
    pub lost: bool,
    pub stages: Vec<StepView>,
}

impl StatusProgress {
    /// `events` deve vir do mais antigo para o mais recente.
    ///
    /// Para `Lost` o índice de fallback é a etapa mais avançada que o lead
    /// alcançou segundo o histórico (0 se não houver histórico).
    pub fn build(status: LeadStatus, events: &[StatusEvent]) -> Self {
        let (current_index, lost) = match status {
            LeadStatus::Active(stage) => (stage.index(), false),
            LeadStatus::Lost => (furthest_stage_reached(events), true),
        };

        let stages = Stage::ORDERED
            .iter()
            .map(|&stage| {
                let i = stage.index();
                let state = if i < current_index {
                    StepState::Complete
                } else if i > current_index {
                    StepState::Pending
                } else if lost {
                    StepState::Halted
                } else {
                    StepState::Active
                };
                StepView { stage, label: stage.label().to_string(), state }
            })
            .collect();

        Self { current_index, lost, stages }
    }
}

fn furthest_stage_reached(events: &[StatusEvent]) -> usize {
    events
        .iter()
        .flat_map(|e| [e.old_status, Some(e.new_status)])
        .flatten()
        .filter_map(LeadStatus::stage)
        .map(Stage::index)
        .max()
        .unwrap_or(0)
}
