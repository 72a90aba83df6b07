use std::collections::BTreeMap;

use chrono::Local;
use tracing::info;

use super::{require_admin, CohortService};
use crate::workflows::giving::domain::{
    Actor, Candidate, CandidateId, CandidateStatus, TermId,
};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::export;
use crate::workflows::giving::forms::{CandidateForm, IntakeForm};
use crate::workflows::giving::notifications::{
    dispatch, NotificationJob, NotificationQueue, NEW_CANDIDATE_TEMPLATE,
};
use crate::workflows::giving::repository::GivingStore;
use crate::workflows::giving::validation::ValidationErrors;

impl<S, N> CohortService<S, N>
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    pub fn candidates(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<Vec<Candidate>, GivingError> {
        require_admin(actor, "list candidates")?;
        Ok(self.store.candidates(term)?)
    }

    /// Administrators, or the user whose own intake record this is.
    pub fn candidate(
        &self,
        actor: &Actor,
        candidate_id: CandidateId,
    ) -> Result<Candidate, GivingError> {
        if !actor.is_admin() {
            let owns = self
                .store
                .fetch_user(actor.user_id)?
                .is_some_and(|user| user.candidate_id == Some(candidate_id));
            if !owns {
                return Err(GivingError::denied("candidate records are private"));
            }
        }
        self.store
            .fetch_candidate(candidate_id)?
            .ok_or(GivingError::not_found(CandidateId::ENTITY, candidate_id.0))
    }

    pub fn create_candidate(
        &self,
        actor: &Actor,
        form: CandidateForm,
    ) -> Result<Candidate, GivingError> {
        require_admin(actor, "create candidates")?;
        let valid = form.validate()?;
        let term_id = form.term_id.flatten();
        self.ensure_term(term_id)?;

        let candidate = self.store.insert_candidate(Candidate {
            id: CandidateId(0),
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            phone_number: valid.phone_number,
            source: valid.source,
            staff_contact: valid.staff_contact,
            notes: valid.notes,
            status: form.status.unwrap_or_default(),
            term_id,
            amount_donated: form.amount_donated.unwrap_or(0),
            applied: form.applied.unwrap_or(false),
            demographic: form.demographic,
        })?;
        info!(candidate_id = %candidate.id, "candidate created");
        Ok(candidate)
    }

    /// Status, term, donation total and demographic are all freely editable here. Omitted
    /// status, term, amount and applied values keep what is stored.
    pub fn update_candidate(
        &self,
        actor: &Actor,
        candidate_id: CandidateId,
        form: CandidateForm,
    ) -> Result<Candidate, GivingError> {
        require_admin(actor, "edit candidates")?;
        let mut candidate = self
            .store
            .fetch_candidate(candidate_id)?
            .ok_or(GivingError::not_found(CandidateId::ENTITY, candidate_id.0))?;
        let valid = form.validate()?;
        let term_id = form.term_id.unwrap_or(candidate.term_id);
        self.ensure_term(term_id)?;

        candidate.first_name = valid.first_name;
        candidate.last_name = valid.last_name;
        candidate.email = valid.email;
        candidate.phone_number = valid.phone_number;
        candidate.source = valid.source;
        candidate.staff_contact = valid.staff_contact;
        candidate.notes = valid.notes;
        candidate.status = form.status.unwrap_or(candidate.status);
        candidate.term_id = term_id;
        candidate.amount_donated = form.amount_donated.unwrap_or(candidate.amount_donated);
        candidate.applied = form.applied.unwrap_or(candidate.applied);
        candidate.demographic = form.demographic;

        self.store.update_candidate(candidate.clone())?;
        info!(candidate_id = %candidate.id, status = candidate.status.label(), "candidate saved");
        Ok(candidate)
    }

    pub fn delete_candidate(
        &self,
        actor: &Actor,
        candidate_id: CandidateId,
    ) -> Result<(), GivingError> {
        require_admin(actor, "delete candidates")?;
        if self.store.fetch_candidate(candidate_id)?.is_none() {
            return Err(GivingError::not_found(CandidateId::ENTITY, candidate_id.0));
        }
        self.store.delete_candidate(candidate_id)?;
        info!(candidate_id = %candidate_id, "candidate deleted");
        Ok(())
    }

    /// Public interest form. The candidate joins the latest term as PENDING and staff are
    /// alerted through the notification queue.
    pub fn submit_intake(&self, form: IntakeForm) -> Result<Candidate, GivingError> {
        let valid = form.validate()?;
        let term_id = self.intake_term()?;

        let candidate = self.store.insert_candidate(Candidate {
            id: CandidateId(0),
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            phone_number: valid.phone_number,
            source: format!("Intake Form at {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            staff_contact: String::new(),
            notes: valid.notes,
            status: CandidateStatus::Pending,
            term_id,
            amount_donated: 0,
            applied: false,
            demographic: form.demographic,
        })?;
        info!(candidate_id = %candidate.id, term_id = ?term_id, "intake received");

        if let Some(recipient) = &self.settings.alert_recipient {
            let mut context = BTreeMap::new();
            context.insert("candidate_name".to_string(), candidate.full_name());
            context.insert("candidate_email".to_string(), candidate.email.clone());
            context.insert(
                "candidate_link".to_string(),
                format!(
                    "{}/api/v1/candidates/{}",
                    self.settings.public_url.trim_end_matches('/'),
                    candidate.id
                ),
            );
            dispatch(
                self.notifications.as_ref(),
                NotificationJob {
                    recipient: recipient.clone(),
                    subject: "New Giving Project Candidate".to_string(),
                    template: NEW_CANDIDATE_TEMPLATE.to_string(),
                    context,
                },
            );
        }

        Ok(candidate)
    }

    pub fn export_candidates(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<String, GivingError> {
        require_admin(actor, "export candidates")?;
        let candidates = self.store.candidates(term)?;
        let terms = self.store.terms()?;
        Ok(export::candidates_csv(&candidates, &terms)?)
    }

    pub fn export_donors(&self, actor: &Actor) -> Result<String, GivingError> {
        require_admin(actor, "export donors")?;
        let donors = self.store.donors()?;
        let users = self.store.users()?;
        Ok(export::donors_csv(&donors, &users)?)
    }

    fn ensure_term(&self, term_id: Option<TermId>) -> Result<(), GivingError> {
        match term_id {
            Some(id) if self.store.fetch_term(id)?.is_none() => Err(GivingError::Validation(
                ValidationErrors::single("term_id", format!("Term {id} does not exist.")),
            )),
            _ => Ok(()),
        }
    }
}
