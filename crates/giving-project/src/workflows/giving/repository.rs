use super::domain::{
    Candidate, CandidateId, Donor, DonorId, DonorStatus, Term, TermId, User, UserId,
};

/// Storage for cohort windows.
pub trait TermRepository: Send + Sync {
    /// Assigns the id; the `id` on the incoming record is ignored.
    fn insert_term(&self, term: Term) -> Result<Term, RepositoryError>;
    fn update_term(&self, term: Term) -> Result<(), RepositoryError>;
    fn delete_term(&self, id: TermId) -> Result<(), RepositoryError>;
    fn fetch_term(&self, id: TermId) -> Result<Option<Term>, RepositoryError>;
    fn terms(&self) -> Result<Vec<Term>, RepositoryError>;
}

/// Storage for candidates. The demographic travels inside the record.
pub trait CandidateRepository: Send + Sync {
    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, RepositoryError>;
    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError>;
    fn delete_candidate(&self, id: CandidateId) -> Result<(), RepositoryError>;
    fn fetch_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    /// `None` returns every candidate regardless of term.
    fn candidates(&self, term: Option<TermId>) -> Result<Vec<Candidate>, RepositoryError>;
}

/// Storage for donors with optimistic versioning.
pub trait DonorRepository: Send + Sync {
    fn insert_donor(&self, donor: Donor) -> Result<Donor, RepositoryError>;
    /// Fails with [`RepositoryError::Stale`] unless `donor.version` matches the stored version.
    /// Returns the record with its version bumped.
    fn update_donor(&self, donor: Donor) -> Result<Donor, RepositoryError>;
    fn delete_donor(&self, id: DonorId) -> Result<(), RepositoryError>;
    fn fetch_donor(&self, id: DonorId) -> Result<Option<Donor>, RepositoryError>;
    fn donors(&self) -> Result<Vec<Donor>, RepositoryError>;
    fn donors_for_owner(&self, owner: UserId) -> Result<Vec<Donor>, RepositoryError>;
    fn donors_with_status(&self, status: DonorStatus) -> Result<Vec<Donor>, RepositoryError>;
}

/// Storage for accounts.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<(), RepositoryError>;
    fn delete_user(&self, id: UserId) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn users(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Everything the services need from a single backing store.
pub trait GivingStore: TermRepository + CandidateRepository + DonorRepository + UserRepository {}

impl<T> GivingStore for T where
    T: TermRepository + CandidateRepository + DonorRepository + UserRepository
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently (expected version {expected}, found {found})")]
    Stale { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
