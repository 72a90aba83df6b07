//! Administrator-side management of terms, candidates and accounts, plus the public intake.

mod candidates;
mod terms;
mod users;

use std::sync::Arc;

use crate::config::NotificationConfig;

use super::domain::Actor;
use super::error::GivingError;
use super::notifications::NotificationQueue;
use super::repository::GivingStore;

pub struct CohortService<S, N> {
    store: Arc<S>,
    notifications: Arc<N>,
    settings: NotificationConfig,
}

impl<S, N> CohortService<S, N>
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, settings: NotificationConfig) -> Self {
        Self {
            store,
            notifications,
            settings,
        }
    }
}

fn require_admin(actor: &Actor, what: &str) -> Result<(), GivingError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(GivingError::denied(format!(
            "only administrators may {what}"
        )))
    }
}
