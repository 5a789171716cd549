// Project and upvote database operations
// All queries use SeaORM, no raw SQL.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::db::error::DbError;
use crate::entity::{projects, upvotes};
use crate::models::PaginationParams;

/// Sort orders for the project listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSort {
    Newest,
    Top,
}

/// Repository for project and upvote operations
pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        ProjectRepository { conn }
    }

    /// Inserts a project unless its url is already taken. The unique index
    /// on url decides; a conflicting insert returns None without racing a
    /// prior read.
    pub async fn try_insert(
        &self,
        model: projects::ActiveModel,
    ) -> Result<Option<projects::Model>, DbError> {
        match projects::Entity::insert(model)
            .on_conflict(
                OnConflict::column(projects::Column::Url)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_with_returning(&self.conn)
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(DbErr::RecordNotInserted) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<projects::Model>, DbError> {
        projects::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Retrieves projects paginated, newest-first or by upvote count
    pub async fn list(
        &self,
        sort: ProjectSort,
        pagination: &PaginationParams,
    ) -> Result<(Vec<projects::Model>, u64), DbError> {
        let total = projects::Entity::find().count(&self.conn).await?;

        let offset = pagination.page.saturating_sub(1) * pagination.limit;
        let query = match sort {
            ProjectSort::Newest => {
                projects::Entity::find().order_by_desc(projects::Column::CreatedAt)
            }
            ProjectSort::Top => projects::Entity::find()
                .order_by_desc(projects::Column::UpvoteCount)
                .order_by_desc(projects::Column::CreatedAt),
        };
        let rows = query
            .limit(pagination.limit)
            .offset(offset)
            .all(&self.conn)
            .await?;

        Ok((rows, total))
    }

    /// Records an upvote and bumps the project's counter. Returns false when
    /// this agent already upvoted the project (composite key conflict); the
    /// counter is only bumped for a fresh vote.
    pub async fn try_add_upvote(
        &self,
        project_id: &str,
        agent_handle: &str,
    ) -> Result<bool, DbError> {
        let vote = upvotes::ActiveModel {
            project_id: Set(project_id.to_string()),
            agent_handle: Set(agent_handle.to_string()),
            created_at: Set(Utc::now()),
        };

        match upvotes::Entity::insert(vote)
            .on_conflict(
                OnConflict::columns([upvotes::Column::ProjectId, upvotes::Column::AgentHandle])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
        {
            Ok(_) => {}
            Err(DbErr::RecordNotInserted) => return Ok(false),
            Err(err) => return Err(err.into()),
        }

        projects::Entity::update_many()
            .col_expr(
                projects::Column::UpvoteCount,
                Expr::col(projects::Column::UpvoteCount).add(1),
            )
            .filter(projects::Column::Id.eq(project_id))
            .exec(&self.conn)
            .await?;

        Ok(true)
    }

    /// Counts all projects; doubles as the status probe's liveness query
    pub async fn count_all(&self) -> Result<u64, DbError> {
        projects::Entity::find()
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Counts projects an agent submitted at or after `since`
    pub async fn count_submitted_since(
        &self,
        agent_handle: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        projects::Entity::find()
            .filter(projects::Column::SubmittedBy.eq(agent_handle))
            .filter(projects::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Counts upvotes an agent cast at or after `since`
    pub async fn count_upvotes_since(
        &self,
        agent_handle: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        upvotes::Entity::find()
            .filter(upvotes::Column::AgentHandle.eq(agent_handle))
            .filter(upvotes::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }
}
