// Handlers for project endpoints

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};

use crate::error::SonarResult;
use crate::handlers::AppState;
use crate::models::{
    PaginatedResponse, PaginationParams, ProjectResponse, SubmitProjectRequest, UpvoteResponse,
};
use crate::services::{auth_service, project_service};

/// GET /projects?sort=newest|top&page=...&limit=...
/// Public paginated listing
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> SonarResult<Json<PaginatedResponse<Vec<ProjectResponse>>>> {
    let response = project_service::list_projects(&state, &params).await?;
    Ok(Json(response))
}

/// POST /projects
/// Submits a project (bearer auth, rate limited)
pub async fn submit_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitProjectRequest>,
) -> SonarResult<Json<ProjectResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = project_service::submit_project(&state, &agent.handle, req).await?;
    Ok(Json(response))
}

/// POST /projects/{id}/upvote
/// Upvotes once per agent (bearer auth, rate limited)
pub async fn upvote_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> SonarResult<Json<UpvoteResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = project_service::upvote_project(&state, &agent.handle, &project_id).await?;
    Ok(Json(response))
}
