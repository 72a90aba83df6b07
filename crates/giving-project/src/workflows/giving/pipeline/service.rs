use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::transitions::PipelineAction;
use crate::workflows::giving::domain::{Actor, Donor, DonorId, DonorStatus};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::forms::{AskForm, CompletionForm, DonorForm, PledgeForm};
use crate::workflows::giving::repository::DonorRepository;
use crate::workflows::giving::validation::ValidationErrors;

/// Successful mutation plus the confirmation shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReceipt {
    pub donor: Donor,
    pub message: String,
    /// Steps the same actor may take next. Empty once the donor is completed.
    pub next_actions: Vec<PipelineAction>,
}

impl PipelineReceipt {
    fn new(actor: &Actor, donor: Donor, message: String) -> Self {
        let next_actions = PipelineAction::available_from(donor.status)
            .into_iter()
            .filter(|action| actor.is_admin() || !action.requires_admin())
            .collect();
        Self {
            donor,
            message,
            next_actions,
        }
    }
}

/// Service owning the donor state machine and its authorization rules.
pub struct DonorPipelineService<R> {
    repository: Arc<R>,
}

impl<R> DonorPipelineService<R>
where
    R: DonorRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a TODO donor owned by the acting participant.
    pub fn create(&self, actor: &Actor, form: DonorForm) -> Result<PipelineReceipt, GivingError> {
        let (profile, demographic) = form.validate()?;
        let donor = Donor {
            id: DonorId(0),
            user_id: actor.user_id,
            status: DonorStatus::Todo,
            profile,
            demographic,
            ask: None,
            pledge: None,
            receipt: None,
            version: 0,
        };

        let stored = self.repository.insert_donor(donor)?;
        info!(donor_id = %stored.id, owner = %stored.user_id, "donor created");
        let message = format!("Donor {} successfully created", stored.full_name());
        Ok(PipelineReceipt::new(actor, stored, message))
    }

    /// Update contact details. Status and stage fields are left untouched.
    pub fn edit(
        &self,
        actor: &Actor,
        donor_id: DonorId,
        form: DonorForm,
    ) -> Result<PipelineReceipt, GivingError> {
        let mut donor = self.load_authorized(actor, donor_id)?;
        check_version(&donor, form.version)?;
        let (profile, demographic) = form.validate()?;
        donor.profile = profile;
        donor.demographic = demographic;

        let stored = self.repository.update_donor(donor)?;
        let message = format!("Donor {} successfully saved", stored.full_name());
        Ok(PipelineReceipt::new(actor, stored, message))
    }

    pub fn get(&self, actor: &Actor, donor_id: DonorId) -> Result<Donor, GivingError> {
        self.load_authorized(actor, donor_id)
    }

    /// Donors solicited by the acting participant.
    pub fn list_own(&self, actor: &Actor) -> Result<Vec<Donor>, GivingError> {
        Ok(self.repository.donors_for_owner(actor.user_id)?)
    }

    /// Every donor in the program, optionally narrowed to one pipeline stage.
    pub fn list_all(
        &self,
        actor: &Actor,
        status: Option<DonorStatus>,
    ) -> Result<Vec<Donor>, GivingError> {
        if !actor.is_admin() {
            return Err(GivingError::denied("only administrators may list every donor"));
        }
        let donors = match status {
            Some(status) => self.repository.donors_with_status(status)?,
            None => self.repository.donors()?,
        };
        Ok(donors)
    }

    /// TODO -> ASKING.
    pub fn record_ask(
        &self,
        actor: &Actor,
        donor_id: DonorId,
        form: AskForm,
    ) -> Result<PipelineReceipt, GivingError> {
        self.advance(
            actor,
            donor_id,
            PipelineAction::RecordAsk,
            form.version,
            |donor| {
                donor.ask = Some(form.validate()?);
                Ok(())
            },
        )
    }

    /// ASKING -> PLEDGED.
    pub fn record_pledge(
        &self,
        actor: &Actor,
        donor_id: DonorId,
        form: PledgeForm,
    ) -> Result<PipelineReceipt, GivingError> {
        self.advance(
            actor,
            donor_id,
            PipelineAction::RecordPledge,
            form.version,
            |donor| {
                donor.pledge = Some(form.validate()?);
                Ok(())
            },
        )
    }

    /// PLEDGED -> COMPLETED. Administrators only.
    pub fn record_completion(
        &self,
        actor: &Actor,
        donor_id: DonorId,
        form: CompletionForm,
    ) -> Result<PipelineReceipt, GivingError> {
        self.advance(
            actor,
            donor_id,
            PipelineAction::RecordCompletion,
            form.version,
            |donor| {
                donor.receipt = Some(form.validate()?);
                Ok(())
            },
        )
    }

    /// Remove a donor in any state. Returns the confirmation message.
    pub fn delete(&self, actor: &Actor, donor_id: DonorId) -> Result<String, GivingError> {
        let donor = self.load_authorized(actor, donor_id)?;
        self.repository.delete_donor(donor.id)?;
        info!(donor_id = %donor.id, actor = %actor.user_id, "donor deleted");
        Ok(format!("Successfully deleted donor {}.", donor.full_name()))
    }

    fn advance<F>(
        &self,
        actor: &Actor,
        donor_id: DonorId,
        action: PipelineAction,
        expected_version: Option<u64>,
        record: F,
    ) -> Result<PipelineReceipt, GivingError>
    where
        F: FnOnce(&mut Donor) -> Result<(), ValidationErrors>,
    {
        let mut donor = self.load_authorized(actor, donor_id)?;
        if action.requires_admin() && !actor.is_admin() {
            warn!(donor_id = %donor_id, actor = %actor.user_id, ?action, "admin-only transition refused");
            return Err(GivingError::denied(format!(
                "only administrators may {action} a donor"
            )));
        }
        check_version(&donor, expected_version)?;

        let next = action.apply(donor.status)?;
        record(&mut donor)?;
        donor.status = next;

        let stored = self.repository.update_donor(donor)?;
        info!(donor_id = %stored.id, status = %stored.status, "donor advanced");
        let message = format!("Donor {} moved to {}", stored.full_name(), stored.status);
        Ok(PipelineReceipt::new(actor, stored, message))
    }

    fn load_authorized(&self, actor: &Actor, donor_id: DonorId) -> Result<Donor, GivingError> {
        let donor = self
            .repository
            .fetch_donor(donor_id)?
            .ok_or(GivingError::not_found(DonorId::ENTITY, donor_id.0))?;

        if !actor.may_act_for(donor.user_id) {
            warn!(donor_id = %donor_id, actor = %actor.user_id, "donor access denied");
            return Err(GivingError::denied(format!(
                "donor {donor_id} belongs to another participant"
            )));
        }
        Ok(donor)
    }
}

fn check_version(donor: &Donor, expected: Option<u64>) -> Result<(), GivingError> {
    match expected {
        Some(version) if version != donor.version => Err(GivingError::Conflict(format!(
            "donor {} changed since version {version} (now {})",
            donor.id, donor.version
        ))),
        _ => Ok(()),
    }
}
