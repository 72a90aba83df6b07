use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::NotificationConfig;
use crate::workflows::giving::domain::{
    Actor, Candidate, CandidateId, CandidateStatus, Demographic, Donor, DonorId, DonorStatus,
    Role, Term, TermId, User, UserId,
};
use crate::workflows::giving::forms::{AskForm, CompletionForm, DonorForm, PledgeForm};
use crate::workflows::giving::memory::InMemoryGivingStore;
use crate::workflows::giving::notifications::{
    NotificationError, NotificationJob, NotificationQueue,
};
use crate::workflows::giving::repository::{
    CandidateRepository, DonorRepository, RepositoryError, TermRepository, UserRepository,
};
use crate::workflows::giving::GivingProject;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn settings() -> NotificationConfig {
    NotificationConfig {
        alert_recipient: Some("staff@givingproject.org".to_string()),
        public_url: "https://gp.example.org".to_string(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    jobs: Arc<Mutex<Vec<NotificationJob>>>,
}

impl MemoryNotifications {
    pub(super) fn jobs(&self) -> Vec<NotificationJob> {
        self.jobs.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationQueue for MemoryNotifications {
    fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationError> {
        self.jobs
            .lock()
            .expect("notification mutex poisoned")
            .push(job);
        Ok(())
    }
}

pub(super) struct ClosedQueue;

impl NotificationQueue for ClosedQueue {
    fn enqueue(&self, _job: NotificationJob) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("mailer offline".to_string()))
    }
}

pub(super) struct Fixture {
    pub(super) project: Arc<GivingProject<InMemoryGivingStore, MemoryNotifications>>,
    pub(super) store: Arc<InMemoryGivingStore>,
    pub(super) notifications: Arc<MemoryNotifications>,
    pub(super) admin: Actor,
    pub(super) participant: Actor,
    pub(super) other: Actor,
}

/// One administrator and two participants, no terms or donors.
pub(super) fn fixture() -> Fixture {
    fixture_with(settings())
}

pub(super) fn fixture_with(settings: NotificationConfig) -> Fixture {
    let store = Arc::new(InMemoryGivingStore::new());
    let notifications = Arc::new(MemoryNotifications::default());
    let project = Arc::new(GivingProject::new(
        store.clone(),
        notifications.clone(),
        settings,
    ));

    let admin = add_user(&store, "Morgan", "Reyes", Role::Administrator, None).actor();
    let participant = add_user(&store, "Ana", "Lee", Role::Participant, None).actor();
    let other = add_user(&store, "Bo", "Kim", Role::Participant, None).actor();

    Fixture {
        project,
        store,
        notifications,
        admin,
        participant,
        other,
    }
}

pub(super) fn add_user(
    store: &InMemoryGivingStore,
    first_name: &str,
    last_name: &str,
    role: Role,
    candidate_id: Option<CandidateId>,
) -> User {
    store
        .insert_user(User {
            id: UserId(0),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@example.org", first_name.to_ascii_lowercase()),
            role,
            candidate_id,
        })
        .expect("user inserted")
}

pub(super) fn add_term(store: &InMemoryGivingStore, name: &str, start: NaiveDate, end: NaiveDate) -> Term {
    store
        .insert_term(Term {
            id: TermId(0),
            name: name.to_string(),
            in_progress: true,
            start_date: start,
            end_date: end,
        })
        .expect("term inserted")
}

pub(super) fn add_candidate(
    store: &InMemoryGivingStore,
    first_name: &str,
    term_id: Option<TermId>,
    amount_donated: u64,
    demographic: Demographic,
) -> Candidate {
    store
        .insert_candidate(Candidate {
            id: CandidateId(0),
            first_name: first_name.to_string(),
            last_name: "Candidate".to_string(),
            email: format!("{}@candidates.org", first_name.to_ascii_lowercase()),
            phone_number: "215-555-0100".to_string(),
            source: "Referral".to_string(),
            staff_contact: "Morgan".to_string(),
            notes: String::new(),
            status: CandidateStatus::Assigned,
            term_id,
            amount_donated,
            applied: true,
            demographic,
        })
        .expect("candidate inserted")
}

pub(super) fn donor_form(first_name: &str) -> DonorForm {
    DonorForm {
        first_name: Some(first_name.to_string()),
        last_name: Some("Donor".to_string()),
        email: Some(format!("{}@donors.org", first_name.to_ascii_lowercase())),
        phone_number: Some("215-555-0199".to_string()),
        contact_date: Some(date(2025, 2, 1)),
        street_address: Some("100 Market St".to_string()),
        city: Some("Philadelphia".to_string()),
        state: Some("PA".to_string()),
        zipcode: Some("19106".to_string()),
        interested_in_future_gp: true,
        ..DonorForm::default()
    }
}

pub(super) fn ask_form(amount: u64) -> AskForm {
    AskForm {
        date_asking: Some(date(2025, 3, 1)),
        amount_asking_for: Some(amount),
        how_asking: Some("Coffee at Reading Terminal".to_string()),
        version: None,
    }
}

pub(super) fn pledge_form(amount: Option<u64>) -> PledgeForm {
    PledgeForm {
        pledged: amount.is_some(),
        amount_pledged: amount,
        version: None,
    }
}

pub(super) fn completion_form(amount: u64) -> CompletionForm {
    CompletionForm {
        amount_received: Some(amount),
        date_received: Some(date(2025, 4, 15)),
        version: None,
    }
}

/// Runs a new donor for `owner` through every stage, ending COMPLETED with `received`.
pub(super) fn completed_donor(fixture: &Fixture, owner: &Actor, name: &str, received: u64) -> Donor {
    let pipeline = &fixture.project.pipeline;
    let donor = pipeline
        .create(owner, donor_form(name))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(owner, donor.id, ask_form(received))
        .expect("ask recorded");
    pipeline
        .record_pledge(owner, donor.id, pledge_form(Some(received)))
        .expect("pledge recorded");
    pipeline
        .record_completion(&fixture.admin, donor.id, completion_form(received))
        .expect("completion recorded")
        .donor
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Store whose every call fails, for exercising the 500 path.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl TermRepository for UnavailableStore {
    fn insert_term(&self, _term: Term) -> Result<Term, RepositoryError> {
        offline()
    }

    fn update_term(&self, _term: Term) -> Result<(), RepositoryError> {
        offline()
    }

    fn delete_term(&self, _id: TermId) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_term(&self, _id: TermId) -> Result<Option<Term>, RepositoryError> {
        offline()
    }

    fn terms(&self) -> Result<Vec<Term>, RepositoryError> {
        offline()
    }
}

impl CandidateRepository for UnavailableStore {
    fn insert_candidate(&self, _candidate: Candidate) -> Result<Candidate, RepositoryError> {
        offline()
    }

    fn update_candidate(&self, _candidate: Candidate) -> Result<(), RepositoryError> {
        offline()
    }

    fn delete_candidate(&self, _id: CandidateId) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_candidate(&self, _id: CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        offline()
    }

    fn candidates(&self, _term: Option<TermId>) -> Result<Vec<Candidate>, RepositoryError> {
        offline()
    }
}

impl DonorRepository for UnavailableStore {
    fn insert_donor(&self, _donor: Donor) -> Result<Donor, RepositoryError> {
        offline()
    }

    fn update_donor(&self, _donor: Donor) -> Result<Donor, RepositoryError> {
        offline()
    }

    fn delete_donor(&self, _id: DonorId) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_donor(&self, _id: DonorId) -> Result<Option<Donor>, RepositoryError> {
        offline()
    }

    fn donors(&self) -> Result<Vec<Donor>, RepositoryError> {
        offline()
    }

    fn donors_for_owner(&self, _owner: UserId) -> Result<Vec<Donor>, RepositoryError> {
        offline()
    }

    fn donors_with_status(&self, _status: DonorStatus) -> Result<Vec<Donor>, RepositoryError> {
        offline()
    }
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }

    fn update_user(&self, _user: User) -> Result<(), RepositoryError> {
        offline()
    }

    fn delete_user(&self, _id: UserId) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        offline()
    }
}
