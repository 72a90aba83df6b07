use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{failure, respond, MessageView, TermQuery};
use crate::workflows::giving::domain::{CandidateId, TermId, UserId};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::forms::{
    CandidateForm, ChangeEmailForm, ChangeRoleForm, IntakeForm, TermForm, UserForm,
};
use crate::workflows::giving::notifications::NotificationQueue;
use crate::workflows::giving::repository::GivingStore;
use crate::workflows::giving::GivingProject;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LinkCandidateRequest {
    pub(crate) candidate_id: Option<u64>,
}

pub(crate) async fn intake_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    Json(form): Json<IntakeForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    respond(StatusCode::CREATED, project.cohort.submit_intake(form))
}

pub(crate) async fn list_terms_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|_| project.cohort.terms());
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_term_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Json(form): Json<TermForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.create_term(&actor, form));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn update_term_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(term_id): Path<u64>,
    Json(form): Json<TermForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.update_term(&actor, TermId(term_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_term_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(term_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    match project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.delete_term(&actor, TermId(term_id)))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn list_candidates_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Query(query): Query<TermQuery>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.candidates(&actor, query.term()));
    respond(StatusCode::OK, result)
}

pub(crate) async fn get_candidate_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(candidate_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.candidate(&actor, CandidateId(candidate_id)));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_candidate_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Json(form): Json<CandidateForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.create_candidate(&actor, form));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn update_candidate_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(candidate_id): Path<u64>,
    Json(form): Json<CandidateForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project.resolve_actor(&headers).and_then(|actor| {
        project
            .cohort
            .update_candidate(&actor, CandidateId(candidate_id), form)
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_candidate_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(candidate_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    match project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.delete_candidate(&actor, CandidateId(candidate_id)))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn export_candidates_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Query(query): Query<TermQuery>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.export_candidates(&actor, query.term()));
    csv_attachment("candidates.csv", result)
}

pub(crate) async fn export_donors_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.export_donors(&actor));
    csv_attachment("donors.csv", result)
}

pub(crate) async fn list_users_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.users(&actor));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_user_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Json(form): Json<UserForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.create_user(&actor, form));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn invite_user_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Json(form): Json<UserForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.invite_user(&actor, form));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn change_role_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
    Json(form): Json<ChangeRoleForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.change_role(&actor, UserId(user_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn change_email_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
    Json(form): Json<ChangeEmailForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.change_email(&actor, UserId(user_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn link_candidate_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
    Json(request): Json<LinkCandidateRequest>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project.resolve_actor(&headers).and_then(|actor| {
        project.cohort.link_candidate(
            &actor,
            UserId(user_id),
            request.candidate_id.map(CandidateId),
        )
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_user_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.cohort.delete_user(&actor, UserId(user_id)))
        .map(|()| MessageView {
            message: format!("Successfully deleted user {user_id}."),
        });
    respond(StatusCode::OK, result)
}

fn csv_attachment(filename: &str, result: Result<String, GivingError>) -> Response {
    match result {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => failure(err),
    }
}
