use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;

use super::{respond, MessageView};
use crate::workflows::giving::domain::{DonorId, DonorStatus};
use crate::workflows::giving::forms::{AskForm, CompletionForm, DonorForm, PledgeForm};
use crate::workflows::giving::notifications::NotificationQueue;
use crate::workflows::giving::repository::GivingStore;
use crate::workflows::giving::GivingProject;

pub(crate) async fn list_donors_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.list_own(&actor));
    respond(StatusCode::OK, result)
}

/// `?status=PLEDGED` narrows the admin listing to one stage.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    status: Option<DonorStatus>,
}

pub(crate) async fn all_donors_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.list_all(&actor, query.status));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_donor_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Json(form): Json<DonorForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.create(&actor, form));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn get_donor_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.get(&actor, DonorId(donor_id)));
    respond(StatusCode::OK, result)
}

pub(crate) async fn edit_donor_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
    Json(form): Json<DonorForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.edit(&actor, DonorId(donor_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_donor_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.delete(&actor, DonorId(donor_id)))
        .map(|message| MessageView { message });
    respond(StatusCode::OK, result)
}

pub(crate) async fn ask_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
    Json(form): Json<AskForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.record_ask(&actor, DonorId(donor_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn pledge_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
    Json(form): Json<PledgeForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project
        .resolve_actor(&headers)
        .and_then(|actor| project.pipeline.record_pledge(&actor, DonorId(donor_id), form));
    respond(StatusCode::OK, result)
}

pub(crate) async fn complete_handler<S, N>(
    State(project): State<Arc<GivingProject<S, N>>>,
    headers: HeaderMap,
    Path(donor_id): Path<u64>,
    Json(form): Json<CompletionForm>,
) -> Response
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    let result = project.resolve_actor(&headers).and_then(|actor| {
        project
            .pipeline
            .record_completion(&actor, DonorId(donor_id), form)
    });
    respond(StatusCode::OK, result)
}
