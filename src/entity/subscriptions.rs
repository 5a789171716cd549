//! SeaORM Entity for subscriptions table
//! A pending row is created with payment instructions and becomes active
//! once the on-chain payment is verified.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub agent_handle: String,

    #[sea_orm(column_type = "Text")]
    pub payment_token: String,

    pub payment_amount: Decimal,

    /// "pending" until payment is verified, then "active"
    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(nullable)]
    pub period_start: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub period_end: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
