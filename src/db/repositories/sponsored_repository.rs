// Sponsored spot database operations

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::db::error::DbError;
use crate::entity::sponsored_spots;

/// Repository for sponsored spot bookings
pub struct SponsoredRepository {
    conn: DatabaseConnection,
}

impl SponsoredRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        SponsoredRepository { conn }
    }

    /// Clears held spots for (spot_type, week_start) whose payment window
    /// has lapsed. Runs before each booking attempt so an abandoned hold
    /// never blocks the week.
    pub async fn delete_expired_holds(
        &self,
        spot_type: &str,
        week_start: NaiveDate,
    ) -> Result<u64, DbError> {
        let result = sponsored_spots::Entity::delete_many()
            .filter(sponsored_spots::Column::SpotType.eq(spot_type))
            .filter(sponsored_spots::Column::WeekStart.eq(week_start))
            .filter(sponsored_spots::Column::Status.eq("held"))
            .filter(sponsored_spots::Column::HoldExpiresAt.lte(Utc::now()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Claims (spot_type, week_start) in a single conditional insert. The
    /// unique index is the arbiter, so of two concurrent bookings exactly
    /// one gets the row back and the other gets None.
    pub async fn try_insert_hold(
        &self,
        model: sponsored_spots::ActiveModel,
    ) -> Result<Option<sponsored_spots::Model>, DbError> {
        match sponsored_spots::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    sponsored_spots::Column::SpotType,
                    sponsored_spots::Column::WeekStart,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_with_returning(&self.conn)
            .await
        {
            Ok(spot) => Ok(Some(spot)),
            Err(DbErr::RecordNotInserted) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<sponsored_spots::Model>, DbError> {
        sponsored_spots::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// All spots (held or active) whose week_start falls in `weeks`
    pub async fn find_in_weeks(
        &self,
        weeks: &[NaiveDate],
    ) -> Result<Vec<sponsored_spots::Model>, DbError> {
        if weeks.is_empty() {
            return Ok(vec![]);
        }
        sponsored_spots::Entity::find()
            .filter(sponsored_spots::Column::WeekStart.is_in(weeks.to_vec()))
            .order_by_asc(sponsored_spots::Column::WeekStart)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Promotes a held spot to active once its payment clears
    pub async fn activate(
        &self,
        spot: sponsored_spots::Model,
    ) -> Result<sponsored_spots::Model, DbError> {
        let mut active: sponsored_spots::ActiveModel = spot.into();
        active.status = Set("active".to_string());
        active.hold_expires_at = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&self.conn).await.map_err(Into::into)
    }
}
