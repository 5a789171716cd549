// Subscription database operations

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::db::error::DbError;
use crate::entity::subscriptions;

/// Repository for subscription records
pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        SubscriptionRepository { conn }
    }

    pub async fn insert(
        &self,
        model: subscriptions::ActiveModel,
    ) -> Result<subscriptions::Model, DbError> {
        model.insert(&self.conn).await.map_err(Into::into)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<subscriptions::Model>, DbError> {
        subscriptions::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Promotes a pending subscription to active for `period_days` from now
    pub async fn activate(
        &self,
        sub: subscriptions::Model,
        period_days: i64,
    ) -> Result<subscriptions::Model, DbError> {
        let now = Utc::now();
        let mut active: subscriptions::ActiveModel = sub.into();
        active.status = Set("active".to_string());
        active.period_start = Set(Some(now));
        active.period_end = Set(Some(now + Duration::days(period_days)));
        active.updated_at = Set(now);
        active.update(&self.conn).await.map_err(Into::into)
    }

    /// The agent's currently-valid subscription, if any. Expired rows are
    /// filtered on period_end rather than eagerly downgraded.
    pub async fn find_active_for(
        &self,
        agent_handle: &str,
    ) -> Result<Option<subscriptions::Model>, DbError> {
        subscriptions::Entity::find()
            .filter(subscriptions::Column::AgentHandle.eq(agent_handle))
            .filter(subscriptions::Column::Status.eq("active"))
            .filter(subscriptions::Column::PeriodEnd.gt(Utc::now()))
            .order_by_desc(subscriptions::Column::PeriodEnd)
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }
}
