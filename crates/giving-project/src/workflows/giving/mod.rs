//! Giving Project donor pipeline, cohort statistics and cohort administration.
//!
//! Every operation takes the acting [`Actor`] explicitly. The HTTP layer resolves it from the
//! `x-user-id` header against the user repository, so the role always comes from the store.

pub mod cohort;
pub mod domain;
pub mod error;
pub mod export;
pub mod forms;
pub mod memory;
pub mod notifications;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod stats;
pub mod validation;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::warn;

use crate::config::NotificationConfig;

pub use cohort::CohortService;
pub use domain::{
    Actor, AskDetails, Candidate, CandidateId, CandidateStatus, Demographic, DemographicCategory,
    DemographicChoice, DemographicChoices, Donor, DonorId, DonorProfile, DonorStatus, Gender, PledgeDetails, Race, ReceiptDetails, Role,
    SexualOrientation, SocialClass, Term, TermId, User, UserId,
};
pub use error::GivingError;
pub use export::{candidates_csv, donors_csv, ExportError, CANDIDATE_HEADER, DONOR_HEADER};
pub use forms::{
    AskForm, CandidateForm, ChangeEmailForm, ChangeRoleForm, CompletionForm, DonorForm,
    IntakeForm, PledgeForm, TermForm, UserForm,
};
pub use memory::InMemoryGivingStore;
pub use notifications::{
    spawn_notification_worker, ChannelNotificationQueue, NotificationError, NotificationJob,
    NotificationQueue, INVITE_TEMPLATE, NEW_CANDIDATE_TEMPLATE,
};
pub use pipeline::{DonorPipelineService, PipelineAction, PipelineReceipt, TransitionError};
pub use repository::{
    CandidateRepository, DonorRepository, GivingStore, RepositoryError, TermRepository,
    UserRepository,
};
pub use router::giving_router;
pub use stats::{CategoryCounts, CohortStats, ParticipantStats, StatsAggregator, TermReport};
pub use validation::{FieldError, ValidationErrors};

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The three services wired to one store, as mounted by [`giving_router`].
pub struct GivingProject<S, N> {
    pub pipeline: DonorPipelineService<S>,
    pub stats: StatsAggregator<S>,
    pub cohort: CohortService<S, N>,
    store: Arc<S>,
}

impl<S, N> GivingProject<S, N>
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, settings: NotificationConfig) -> Self {
        Self {
            pipeline: DonorPipelineService::new(store.clone()),
            stats: StatsAggregator::new(store.clone()),
            cohort: CohortService::new(store.clone(), notifications, settings),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Look up the acting user named by [`ACTOR_HEADER`].
    pub fn resolve_actor(&self, headers: &HeaderMap) -> Result<Actor, GivingError> {
        let raw = headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| GivingError::Unauthenticated(format!("missing {ACTOR_HEADER} header")))?;
        let id = raw.trim().parse::<u64>().map_err(|_| {
            GivingError::Unauthenticated(format!("{ACTOR_HEADER} must be a numeric user id"))
        })?;

        match self.store.fetch_user(UserId(id))? {
            Some(user) => Ok(user.actor()),
            None => {
                warn!(user_id = id, "request from unknown user");
                Err(GivingError::Unauthenticated(format!("unknown user {id}")))
            }
        }
    }
}
