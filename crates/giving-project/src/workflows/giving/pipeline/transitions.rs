use std::fmt;

use serde::Serialize;

use crate::workflows::giving::domain::DonorStatus;

/// Operations that move a donor forward in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineAction {
    RecordAsk,
    RecordPledge,
    RecordCompletion,
}

/// `(from, action, to)`. Every legal transition is listed here and nowhere else.
const TRANSITIONS: [(DonorStatus, PipelineAction, DonorStatus); 3] = [
    (DonorStatus::Todo, PipelineAction::RecordAsk, DonorStatus::Asking),
    (DonorStatus::Asking, PipelineAction::RecordPledge, DonorStatus::Pledged),
    (
        DonorStatus::Pledged,
        PipelineAction::RecordCompletion,
        DonorStatus::Completed,
    ),
];

impl PipelineAction {
    pub const fn ordered() -> [Self; 3] {
        [Self::RecordAsk, Self::RecordPledge, Self::RecordCompletion]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RecordAsk => "record an ask for",
            Self::RecordPledge => "record a pledge for",
            Self::RecordCompletion => "record a completed donation for",
        }
    }

    /// Participants cannot certify receipt of their own donations.
    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::RecordCompletion)
    }

    /// Status a donor must be in before this action applies.
    pub fn source(self) -> DonorStatus {
        TRANSITIONS
            .iter()
            .find(|(_, action, _)| *action == self)
            .map_or(DonorStatus::Todo, |(from, _, _)| *from)
    }

    /// Resolve the next status, rejecting anything outside the table.
    pub fn apply(self, from: DonorStatus) -> Result<DonorStatus, TransitionError> {
        TRANSITIONS
            .iter()
            .find(|(source, action, _)| *source == from && *action == self)
            .map(|(_, _, to)| *to)
            .ok_or(TransitionError::InvalidState {
                action: self,
                from,
                required: self.source(),
            })
    }

    /// Actions offered to a donor currently in `status`.
    pub fn available_from(status: DonorStatus) -> Vec<Self> {
        TRANSITIONS
            .iter()
            .filter(|(from, _, _)| *from == status)
            .map(|(_, action, _)| *action)
            .collect()
    }
}

impl fmt::Display for PipelineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} a donor in {from}; the donor must be in {required}")]
    InvalidState {
        action: PipelineAction,
        from: DonorStatus,
        required: DonorStatus,
    },
}
