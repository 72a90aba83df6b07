use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};

use super::{respond, TermQuery};
use crate::workflows::giving::domain::{Demographic, DemographicChoices, UserId};
use crate::workflows::giving::notifications::NotificationQueue;
use crate::workflows::giving::repository::GivingStore;
use crate::workflows::giving::GivingProject;

/// Choice lists for the demographic form fields. `NOT_SPECIFIED` is left out.
pub(crate) async fn demographics_handler() -> Json<DemographicChoices> {
    Json(Demographic::demographics_dict())
}

pub(crate) async fn term_stats_handler<S, N>(
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
        .and_then(|actor| project.stats.term_report(&actor, query.term()));
    respond(StatusCode::OK, result)
}

pub(crate) async fn participant_stats_handler<S, N>(
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
        .and_then(|actor| project.stats.participant_stats(&actor, UserId(user_id)));
    respond(StatusCode::OK, result)
}
