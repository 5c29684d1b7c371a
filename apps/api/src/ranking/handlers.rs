//! Axum route handlers for the ranking API.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::project::ProjectRecord;
use crate::ranking::query::{RankingQuery, RankingRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeightedProjectsQuery {
    pub page: Option<i64>,
    #[serde(alias = "perPage")]
    pub per_page: Option<i64>,
    pub status: Option<i64>,
}

/// GET /projects/weighted
///
/// Returns one page of projects in weighted order. Scores stay server-side.
/// Unparseable query strings come back as the JSON validation error.
pub async fn handle_weighted_projects(
    State(state): State<AppState>,
    query: Result<Query<WeightedProjectsQuery>, QueryRejection>,
) -> Result<Json<Vec<ProjectRecord>>, AppError> {
    let Query(params) = query?;
    let request = RankingRequest::new(params.page, params.per_page, params.status)?;

    let query = RankingQuery::new(state.source.as_ref(), &state.score_model, state.jitter);
    let projects = query.execute(&request, Utc::now()).await?;

    Ok(Json(projects))
}
