use chrono::NaiveDate;
use giving_project::error::AppError;
use giving_project::workflows::giving::{
    GivingError, InMemoryGivingStore, Role, User, UserId, UserRepository, ValidationErrors,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Creates the first administrator so a fresh store has someone to act as.
pub(crate) fn seed_administrator(
    store: &InMemoryGivingStore,
    email: &str,
) -> Result<User, AppError> {
    let email = email.trim();
    if !email.contains('@') {
        let errors = ValidationErrors::single("email", "Administrator e-mail must be a valid address.");
        return Err(GivingError::Validation(errors).into());
    }
    if let Some(existing) = store.find_user_by_email(email).map_err(GivingError::from)? {
        return Ok(existing);
    }

    let user = store
        .insert_user(User {
            id: UserId(0),
            first_name: "Giving Project".to_string(),
            last_name: "Staff".to_string(),
            email: email.to_string(),
            role: Role::Administrator,
            candidate_id: None,
        })
        .map_err(GivingError::from)?;
    Ok(user)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
