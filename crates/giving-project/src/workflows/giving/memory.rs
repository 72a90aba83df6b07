use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Candidate, CandidateId, Donor, DonorId, DonorStatus, Term, TermId, User, UserId,
};
use super::repository::{
    CandidateRepository, DonorRepository, RepositoryError, TermRepository, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    terms: BTreeMap<TermId, Term>,
    candidates: BTreeMap<CandidateId, Candidate>,
    donors: BTreeMap<DonorId, Donor>,
    users: BTreeMap<UserId, User>,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mutex-guarded store used by the service binary, the demo and tests.
///
/// Each call takes the lock once, so every single-record write is atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryGivingStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryGivingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl TermRepository for InMemoryGivingStore {
    fn insert_term(&self, mut term: Term) -> Result<Term, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.terms.values().any(|existing| existing.name == term.name) {
            return Err(RepositoryError::Conflict);
        }
        term.id = TermId(tables.allocate());
        tables.terms.insert(term.id, term.clone());
        Ok(term)
    }

    fn update_term(&self, term: Term) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.terms.contains_key(&term.id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .terms
            .values()
            .any(|existing| existing.id != term.id && existing.name == term.name)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.terms.insert(term.id, term);
        Ok(())
    }

    fn delete_term(&self, id: TermId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables
            .terms
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_term(&self, id: TermId) -> Result<Option<Term>, RepositoryError> {
        Ok(self.lock()?.terms.get(&id).cloned())
    }

    fn terms(&self) -> Result<Vec<Term>, RepositoryError> {
        Ok(self.lock()?.terms.values().cloned().collect())
    }
}

impl CandidateRepository for InMemoryGivingStore {
    fn insert_candidate(&self, mut candidate: Candidate) -> Result<Candidate, RepositoryError> {
        let mut tables = self.lock()?;
        candidate.id = CandidateId(tables.allocate());
        tables.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.candidates.get_mut(&candidate.id) {
            Some(slot) => {
                *slot = candidate;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_candidate(&self, id: CandidateId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables
            .candidates
            .remove(&id)
            .ok_or(RepositoryError::NotFound)?;
        for user in tables.users.values_mut() {
            if user.candidate_id == Some(id) {
                user.candidate_id = None;
            }
        }
        Ok(())
    }

    fn fetch_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.lock()?.candidates.get(&id).cloned())
    }

    fn candidates(&self, term: Option<TermId>) -> Result<Vec<Candidate>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .candidates
            .values()
            .filter(|candidate| term.is_none() || candidate.term_id == term)
            .cloned()
            .collect())
    }
}

impl DonorRepository for InMemoryGivingStore {
    fn insert_donor(&self, mut donor: Donor) -> Result<Donor, RepositoryError> {
        let mut tables = self.lock()?;
        donor.id = DonorId(tables.allocate());
        donor.version = 1;
        tables.donors.insert(donor.id, donor.clone());
        Ok(donor)
    }

    fn update_donor(&self, mut donor: Donor) -> Result<Donor, RepositoryError> {
        let mut tables = self.lock()?;
        let stored = tables
            .donors
            .get_mut(&donor.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != donor.version {
            return Err(RepositoryError::Stale {
                expected: donor.version,
                found: stored.version,
            });
        }
        donor.version += 1;
        *stored = donor.clone();
        Ok(donor)
    }

    fn delete_donor(&self, id: DonorId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables
            .donors
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_donor(&self, id: DonorId) -> Result<Option<Donor>, RepositoryError> {
        Ok(self.lock()?.donors.get(&id).cloned())
    }

    fn donors(&self) -> Result<Vec<Donor>, RepositoryError> {
        Ok(self.lock()?.donors.values().cloned().collect())
    }

    fn donors_for_owner(&self, owner: UserId) -> Result<Vec<Donor>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .donors
            .values()
            .filter(|donor| donor.user_id == owner)
            .cloned()
            .collect())
    }

    fn donors_with_status(&self, status: DonorStatus) -> Result<Vec<Donor>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .donors
            .values()
            .filter(|donor| donor.status == status)
            .cloned()
            .collect())
    }
}

impl UserRepository for InMemoryGivingStore {
    fn insert_user(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict);
        }
        user.id = UserId(tables.allocate());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict);
        }
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        tables.donors.retain(|_, donor| donor.user_id != id);
        Ok(())
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }
}
