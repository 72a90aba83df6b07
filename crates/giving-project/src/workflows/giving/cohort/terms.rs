use tracing::info;

use super::{require_admin, CohortService};
use crate::workflows::giving::domain::{Actor, Term, TermId};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::forms::TermForm;
use crate::workflows::giving::notifications::NotificationQueue;
use crate::workflows::giving::repository::GivingStore;

impl<S, N> CohortService<S, N>
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    /// Terms ordered by start date, most recent first.
    pub fn terms(&self) -> Result<Vec<Term>, GivingError> {
        let mut terms = self.store.terms()?;
        terms.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.name.cmp(&b.name)));
        Ok(terms)
    }

    pub fn create_term(&self, actor: &Actor, form: TermForm) -> Result<Term, GivingError> {
        require_admin(actor, "create terms")?;
        let valid = form.validate()?;
        let term = self.store.insert_term(Term {
            id: TermId(0),
            name: valid.name,
            in_progress: valid.in_progress,
            start_date: valid.start_date,
            end_date: valid.end_date,
        })?;
        info!(term_id = %term.id, name = %term.name, "term created");
        Ok(term)
    }

    pub fn update_term(
        &self,
        actor: &Actor,
        term_id: TermId,
        form: TermForm,
    ) -> Result<Term, GivingError> {
        require_admin(actor, "edit terms")?;
        if self.store.fetch_term(term_id)?.is_none() {
            return Err(GivingError::not_found(TermId::ENTITY, term_id.0));
        }
        let valid = form.validate()?;
        let term = Term {
            id: term_id,
            name: valid.name,
            in_progress: valid.in_progress,
            start_date: valid.start_date,
            end_date: valid.end_date,
        };
        self.store.update_term(term.clone())?;
        Ok(term)
    }

    /// Only empty terms can be removed; candidates must be reassigned first.
    pub fn delete_term(&self, actor: &Actor, term_id: TermId) -> Result<(), GivingError> {
        require_admin(actor, "delete terms")?;
        if self.store.fetch_term(term_id)?.is_none() {
            return Err(GivingError::not_found(TermId::ENTITY, term_id.0));
        }
        let enrolled = self.store.candidates(Some(term_id))?.len();
        if enrolled > 0 {
            return Err(GivingError::Conflict(format!(
                "term {term_id} still has {enrolled} candidate(s)"
            )));
        }
        self.store.delete_term(term_id)?;
        info!(term_id = %term_id, "term deleted");
        Ok(())
    }

    /// New intake submissions join the term with the latest end date.
    pub(crate) fn intake_term(&self) -> Result<Option<TermId>, GivingError> {
        Ok(self
            .store
            .terms()?
            .into_iter()
            .max_by_key(|term| term.end_date)
            .map(|term| term.id))
    }
}
