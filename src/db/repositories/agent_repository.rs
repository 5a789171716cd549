// Agent and API key database operations

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::db::error::DbError;
use crate::entity::{agents, api_keys};

/// Repository for agent identity lookups
pub struct AgentRepository {
    conn: DatabaseConnection,
}

impl AgentRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        AgentRepository { conn }
    }

    /// Resolves an API key to its owning agent. Revoked keys and keys with
    /// no matching agent resolve to None.
    pub async fn find_agent_by_key(&self, key: &str) -> Result<Option<agents::Model>, DbError> {
        let api_key = api_keys::Entity::find_by_id(key)
            .filter(api_keys::Column::Revoked.eq(false))
            .one(&self.conn)
            .await?;

        let Some(api_key) = api_key else {
            return Ok(None);
        };

        agents::Entity::find_by_id(&api_key.agent_handle)
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Stamps a key's last_used_at. Single UPDATE so callers can fire and
    /// forget it.
    pub async fn touch_last_used(&self, key: &str) -> Result<(), DbError> {
        api_keys::Entity::update_many()
            .col_expr(api_keys::Column::LastUsedAt, Expr::value(Utc::now()))
            .filter(api_keys::Column::Key.eq(key))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
