// API request/response models
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::services::payment_service::{PaymentToken, TransferDetails};
use crate::services::sponsored_service::SpotType;

/// Custom deserializer to convert string to u64
fn deserialize_string_to_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    s.parse::<u64>().map_err(serde::de::Error::custom)
}

/// Common pagination parameters for list endpoints
#[derive(Debug, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(default = "default_page", deserialize_with = "deserialize_string_to_u64")]
    pub page: u64,
    #[serde(default = "default_limit", deserialize_with = "deserialize_string_to_u64")]
    pub limit: u64,
    #[serde(default = "default_sort_order")]
    pub sort: String,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

fn default_sort_order() -> String {
    "newest".to_string()
}

/// Pagination metadata for responses
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Response structure with pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: T,
    pub pagination: PaginationMeta,
}

/// Request body for POST /projects
#[derive(Debug, Deserialize)]
pub struct SubmitProjectRequest {
    pub name: String,
    pub tagline: String,
    pub url: String,
    pub description: Option<String>,
}

/// Project data structure for API responses
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub url: String,
    pub description: Option<String>,
    pub submitted_by: String,
    pub upvote_count: i64,
    pub created_at: String,
}

/// Response structure for upvote operations
#[derive(Debug, Serialize)]
pub struct UpvoteResponse {
    pub success: bool,
    pub message: String,
    pub upvote_count: i64,
}

/// Request body for POST /sponsored/book. Enum-ish fields arrive as plain
/// strings so a bad value is a 400 with a message, not a deserialize
/// rejection.
#[derive(Debug, Deserialize)]
pub struct BookSlotRequest {
    pub spot_type: String,
    pub week_start: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub payment_token: String,
}

/// On-chain payment instructions returned with a hold or pending
/// subscription
#[derive(Debug, Serialize)]
pub struct PaymentInstructions {
    pub pay_to: String,
    pub token: PaymentToken,
    pub token_contract: String,
    pub amount: Decimal,
    pub chain_id: u64,
    pub expires_at: Option<String>,
}

/// Public representation of a sponsored spot
#[derive(Debug, Serialize)]
pub struct SpotResponse {
    pub id: String,
    pub spot_type: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: String,
    pub hold_expires_at: Option<String>,
}

/// Response structure for POST /sponsored/book
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub payment: PaymentInstructions,
    pub spot: SpotResponse,
}

/// Request body for POST /sponsored/confirm
#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub booking_id: String,
    pub tx_hash: String,
}

/// Response structure for POST /sponsored/confirm
#[derive(Debug, Serialize)]
pub struct ConfirmBookingResponse {
    pub spot: SpotResponse,
    pub transfer: TransferDetails,
}

/// Publication state of a slot-week as shown in the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Held,
    Booked,
}

/// Per-type availability inside one calendar week
#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    pub spot_type: SpotType,
    pub status: SlotStatus,
}

/// One week of the availability calendar
#[derive(Debug, Serialize)]
pub struct SlotWeek {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub spots: Vec<SlotAvailability>,
}

/// Rate card entry for one spot type
#[derive(Debug, Serialize)]
pub struct RateCardEntry {
    pub spot_type: SpotType,
    pub price_usdc: Decimal,
    pub price_snr: Decimal,
}

/// Response structure for GET /sponsored/slots
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub weeks: Vec<SlotWeek>,
    pub pricing: Vec<RateCardEntry>,
}

/// Request body for POST /subscribe
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub payment_token: String,
}

/// Subscription data structure for API responses
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub status: String,
    pub payment_token: String,
    pub payment_amount: Decimal,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

/// Response structure for POST /subscribe
#[derive(Debug, Serialize)]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
    pub payment: PaymentInstructions,
}

/// Request body for POST /subscribe/confirm
#[derive(Debug, Deserialize)]
pub struct ConfirmSubscriptionRequest {
    pub subscription_id: String,
    pub tx_hash: String,
}

/// Response structure for POST /subscribe/confirm
#[derive(Debug, Serialize)]
pub struct ConfirmSubscriptionResponse {
    pub subscription: SubscriptionResponse,
    pub transfer: TransferDetails,
}
