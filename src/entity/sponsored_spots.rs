//! SeaORM Entity for sponsored_spots table
//!
//! One row per booked slot-week. A row is created in "held" status with a
//! short expiry while payment is pending and becomes "active" once the
//! payment is verified. Expired holds are deleted lazily by the booking
//! path; the unique index on (spot_type, week_start) makes the hold insert
//! the only availability arbiter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sponsored_spots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// homepage_banner | homepage_inline | project_sidebar
    #[sea_orm(column_type = "Text")]
    pub spot_type: String,

    #[sea_orm(column_type = "Text")]
    pub booked_by: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,

    /// USDC | SNR
    #[sea_orm(column_type = "Text")]
    pub payment_token: String,

    pub payment_amount: Decimal,

    /// Monday anchoring the booked calendar week
    pub week_start: NaiveDate,

    /// week_start + 6 days
    pub week_end: NaiveDate,

    /// "held" until payment is verified, then "active"
    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(nullable)]
    pub hold_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
