//! JSON routes under `/api/v1`.

mod cohort;
mod donors;
mod stats;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::GivingError;
use super::notifications::NotificationQueue;
use super::repository::GivingStore;
use super::GivingProject;

pub(crate) use cohort::*;
pub(crate) use donors::*;
pub(crate) use stats::*;

/// Router builder exposing the donor pipeline, statistics and cohort administration.
pub fn giving_router<S, N>(project: Arc<GivingProject<S, N>>) -> Router
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    Router::new()
        .route("/api/v1/demographics", get(demographics_handler))
        .route("/api/v1/intake", post(intake_handler::<S, N>))
        .route(
            "/api/v1/terms",
            get(list_terms_handler::<S, N>).post(create_term_handler::<S, N>),
        )
        .route(
            "/api/v1/terms/:term_id",
            put(update_term_handler::<S, N>).delete(delete_term_handler::<S, N>),
        )
        .route(
            "/api/v1/candidates",
            get(list_candidates_handler::<S, N>).post(create_candidate_handler::<S, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id",
            get(get_candidate_handler::<S, N>)
                .put(update_candidate_handler::<S, N>)
                .delete(delete_candidate_handler::<S, N>),
        )
        .route(
            "/api/v1/exports/candidates.csv",
            get(export_candidates_handler::<S, N>),
        )
        .route(
            "/api/v1/exports/donors.csv",
            get(export_donors_handler::<S, N>),
        )
        .route(
            "/api/v1/donors",
            get(list_donors_handler::<S, N>).post(create_donor_handler::<S, N>),
        )
        .route("/api/v1/donors/all", get(all_donors_handler::<S, N>))
        .route(
            "/api/v1/donors/:donor_id",
            get(get_donor_handler::<S, N>)
                .put(edit_donor_handler::<S, N>)
                .delete(delete_donor_handler::<S, N>),
        )
        .route("/api/v1/donors/:donor_id/ask", post(ask_handler::<S, N>))
        .route(
            "/api/v1/donors/:donor_id/pledge",
            post(pledge_handler::<S, N>),
        )
        .route(
            "/api/v1/donors/:donor_id/complete",
            post(complete_handler::<S, N>),
        )
        .route("/api/v1/stats", get(term_stats_handler::<S, N>))
        .route(
            "/api/v1/participants/:user_id/stats",
            get(participant_stats_handler::<S, N>),
        )
        .route(
            "/api/v1/users",
            get(list_users_handler::<S, N>).post(create_user_handler::<S, N>),
        )
        .route("/api/v1/users/invite", post(invite_user_handler::<S, N>))
        .route(
            "/api/v1/users/:user_id",
            axum::routing::delete(delete_user_handler::<S, N>),
        )
        .route(
            "/api/v1/users/:user_id/role",
            put(change_role_handler::<S, N>),
        )
        .route(
            "/api/v1/users/:user_id/email",
            put(change_email_handler::<S, N>),
        )
        .route(
            "/api/v1/users/:user_id/candidate",
            put(link_candidate_handler::<S, N>),
        )
        .with_state(project)
}

/// `?term_id=` filter shared by the candidate, export and stats routes.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TermQuery {
    pub(crate) term_id: Option<u64>,
}

impl TermQuery {
    pub(crate) fn term(&self) -> Option<super::domain::TermId> {
        self.term_id.map(super::domain::TermId)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageView {
    pub(crate) message: String,
}

pub(crate) fn respond<T: Serialize>(status: StatusCode, result: Result<T, GivingError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) fn failure(err: GivingError) -> Response {
    if err.status_code().is_server_error() {
        error!(error = %err, "giving request failed");
    }
    err.into_response()
}
