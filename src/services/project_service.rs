// Project submission, listing, and upvotes

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::db::repositories::ProjectSort;
use crate::entity::projects;
use crate::error::{SonarError, SonarResult};
use crate::handlers::AppState;
use crate::models::{
    PaginatedResponse, PaginationMeta, PaginationParams, ProjectResponse, SubmitProjectRequest,
    UpvoteResponse,
};
use crate::services::rate_limit_service::{self, LimitedAction};

const MAX_NAME_CHARS: usize = 80;
const MAX_TAGLINE_CHARS: usize = 140;

/// Submits a project. Rate limited per tier; duplicate urls are a 409
/// decided by the unique index, not a prior read.
pub async fn submit_project(
    state: &AppState,
    agent_handle: &str,
    req: SubmitProjectRequest,
) -> SonarResult<ProjectResponse> {
    validate_submission(&req)?;
    rate_limit_service::enforce(state, agent_handle, LimitedAction::SubmitProject).await?;

    let model = projects::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(req.name.trim().to_string()),
        tagline: Set(req.tagline.trim().to_string()),
        url: Set(req.url.clone()),
        description: Set(req.description.clone()),
        submitted_by: Set(agent_handle.to_string()),
        upvote_count: Set(0),
        created_at: Set(Utc::now()),
    };

    let project = state
        .repositories
        .projects
        .try_insert(model)
        .await?
        .ok_or_else(|| {
            SonarError::Conflict(format!("a project with url {} already exists", req.url))
        })?;

    tracing::info!(project_id = %project.id, agent = agent_handle, "project submitted");

    Ok(project_to_response(&project))
}

/// Paginated listing, newest-first by default or by upvotes with
/// `sort=top`
pub async fn list_projects(
    state: &AppState,
    params: &PaginationParams,
) -> SonarResult<PaginatedResponse<Vec<ProjectResponse>>> {
    let sort = match params.sort.as_str() {
        "top" => ProjectSort::Top,
        _ => ProjectSort::Newest,
    };

    let (rows, total) = state.repositories.projects.list(sort, params).await?;

    let limit = params.limit.max(1);
    Ok(PaginatedResponse {
        data: rows.iter().map(project_to_response).collect(),
        pagination: PaginationMeta {
            total,
            page: params.page,
            limit: params.limit,
            total_pages: total.div_ceil(limit),
        },
    })
}

/// Upvotes a project once per agent and bumps the denormalized counter
pub async fn upvote_project(
    state: &AppState,
    agent_handle: &str,
    project_id: &str,
) -> SonarResult<UpvoteResponse> {
    rate_limit_service::enforce(state, agent_handle, LimitedAction::Upvote).await?;

    let project = state
        .repositories
        .projects
        .get_by_id(project_id)
        .await?
        .ok_or_else(|| SonarError::NotFound(format!("project {} not found", project_id)))?;

    let fresh = state
        .repositories
        .projects
        .try_add_upvote(project_id, agent_handle)
        .await?;
    if !fresh {
        return Err(SonarError::Conflict(
            "agent already upvoted this project".to_string(),
        ));
    }

    let upvote_count = state
        .repositories
        .projects
        .get_by_id(project_id)
        .await?
        .map(|p| p.upvote_count)
        .unwrap_or(project.upvote_count + 1);

    Ok(UpvoteResponse {
        success: true,
        message: "upvote recorded".to_string(),
        upvote_count,
    })
}

fn validate_submission(req: &SubmitProjectRequest) -> SonarResult<()> {
    if req.name.trim().is_empty() || req.name.chars().count() > MAX_NAME_CHARS {
        return Err(SonarError::Validation(format!(
            "name must be 1-{} characters",
            MAX_NAME_CHARS
        )));
    }
    if req.tagline.trim().is_empty() || req.tagline.chars().count() > MAX_TAGLINE_CHARS {
        return Err(SonarError::Validation(format!(
            "tagline must be 1-{} characters",
            MAX_TAGLINE_CHARS
        )));
    }
    if !req.url.starts_with("https://") {
        return Err(SonarError::Validation(
            "url must start with https://".to_string(),
        ));
    }
    Ok(())
}

fn project_to_response(m: &projects::Model) -> ProjectResponse {
    ProjectResponse {
        id: m.id.clone(),
        name: m.name.clone(),
        tagline: m.tagline.clone(),
        url: m.url.clone(),
        description: m.description.clone(),
        submitted_by: m.submitted_by.clone(),
        upvote_count: m.upvote_count,
        created_at: m.created_at.to_rfc3339(),
    }
}
