// Sponsored spot booking - holds, availability calendar, confirmation
//
// A booking is a two-step flow: POST /sponsored/book claims the slot-week
// with a short-lived hold and returns payment instructions, then
// POST /sponsored/confirm verifies the on-chain payment and promotes the
// hold to active. Expired holds are garbage-collected lazily on the write
// path and merely presented as available on the read path.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BASE_CHAIN_ID;
use crate::entity::sponsored_spots;
use crate::error::{SonarError, SonarResult};
use crate::handlers::AppState;
use crate::models::{
    BookSlotRequest, BookingResponse, ConfirmBookingRequest, ConfirmBookingResponse,
    PaymentInstructions, RateCardEntry, SlotAvailability, SlotStatus, SlotWeek, SlotsResponse,
    SpotResponse,
};
use crate::services::payment_service::{self, price_for_token, PaymentToken};

/// How long a hold blocks the slot-week before the payment must land
const HOLD_MINUTES: i64 = 5;

/// Weeks shown by the availability calendar
const CALENDAR_WEEKS: i64 = 5;

const MAX_TITLE_CHARS: usize = 60;
const MAX_DESCRIPTION_CHARS: usize = 120;

/// Advertising placements sold by the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotType {
    HomepageBanner,
    HomepageInline,
    ProjectSidebar,
}

impl SpotType {
    pub fn label(&self) -> &'static str {
        match self {
            SpotType::HomepageBanner => "homepage_banner",
            SpotType::HomepageInline => "homepage_inline",
            SpotType::ProjectSidebar => "project_sidebar",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "homepage_banner" => Some(SpotType::HomepageBanner),
            "homepage_inline" => Some(SpotType::HomepageInline),
            "project_sidebar" => Some(SpotType::ProjectSidebar),
            _ => None,
        }
    }

    /// Weekly base price in USD before any token discount
    pub fn base_price_usd(&self) -> Decimal {
        match self {
            SpotType::HomepageBanner => Decimal::from(299),
            SpotType::HomepageInline => Decimal::from(199),
            SpotType::ProjectSidebar => Decimal::from(149),
        }
    }

    pub fn all() -> [SpotType; 3] {
        [
            SpotType::HomepageBanner,
            SpotType::HomepageInline,
            SpotType::ProjectSidebar,
        ]
    }
}

/// Weekly price of a spot in the chosen token's USD denomination
pub fn quote_price(spot_type: SpotType, token: PaymentToken) -> Decimal {
    price_for_token(spot_type.base_price_usd(), token)
}

/// Reserves a slot-week with a 5-minute hold and returns payment
/// instructions. The insert itself arbitrates availability, so two
/// concurrent requests for the same slot-week cannot both succeed.
pub async fn book_slot(
    state: &AppState,
    agent_handle: &str,
    req: BookSlotRequest,
) -> SonarResult<BookingResponse> {
    let (spot_type, token, week_start) = validate_booking(&req)?;

    let cleared = state
        .repositories
        .sponsored
        .delete_expired_holds(spot_type.label(), week_start)
        .await?;
    if cleared > 0 {
        tracing::debug!(
            spot_type = spot_type.label(),
            %week_start,
            "cleared {cleared} expired holds"
        );
    }

    let pay_to = state.payment_address()?;

    let now = Utc::now();
    let amount = quote_price(spot_type, token);
    let expires = now + Duration::minutes(HOLD_MINUTES);

    let model = sponsored_spots::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        spot_type: Set(spot_type.label().to_string()),
        booked_by: Set(agent_handle.to_string()),
        title: Set(req.title.trim().to_string()),
        description: Set(req.description.clone()),
        url: Set(req.url.clone()),
        image_url: Set(req.image_url.clone()),
        payment_token: Set(token.symbol().to_string()),
        payment_amount: Set(amount),
        week_start: Set(week_start),
        week_end: Set(week_start + Duration::days(6)),
        status: Set("held".to_string()),
        hold_expires_at: Set(Some(expires)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let spot = state
        .repositories
        .sponsored
        .try_insert_hold(model)
        .await?
        .ok_or_else(|| {
            SonarError::Conflict(format!(
                "{} for week of {} is already booked or held",
                spot_type.label(),
                week_start
            ))
        })?;

    tracing::info!(booking_id = %spot.id, spot_type = spot_type.label(), "slot held");

    Ok(BookingResponse {
        booking_id: spot.id.clone(),
        payment: PaymentInstructions {
            pay_to,
            token,
            token_contract: token.contract().to_string(),
            amount,
            chain_id: BASE_CHAIN_ID,
            expires_at: Some(expires.to_rfc3339()),
        },
        spot: spot_to_response(&spot),
    })
}

/// The rolling availability calendar: CALENDAR_WEEKS weeks from the Monday
/// of the current UTC week, with a rate card per spot type. Read-only;
/// expired holds are shown available but left in place.
pub async fn slot_calendar(state: &AppState) -> SonarResult<SlotsResponse> {
    let start = week_monday(Utc::now().date_naive());
    let week_starts: Vec<NaiveDate> = (0..CALENDAR_WEEKS)
        .map(|i| start + Duration::weeks(i))
        .collect();

    let spots = state
        .repositories
        .sponsored
        .find_in_weeks(&week_starts)
        .await?;

    let now = Utc::now();
    let weeks = week_starts
        .into_iter()
        .map(|week_start| {
            let per_type = SpotType::all()
                .iter()
                .map(|&spot_type| {
                    let status = spots
                        .iter()
                        .find(|s| s.week_start == week_start && s.spot_type == spot_type.label())
                        .map(|s| slot_status(s, now))
                        .unwrap_or(SlotStatus::Available);
                    SlotAvailability { spot_type, status }
                })
                .collect();
            SlotWeek {
                week_start,
                week_end: week_start + Duration::days(6),
                spots: per_type,
            }
        })
        .collect();

    let pricing = SpotType::all()
        .iter()
        .map(|&spot_type| RateCardEntry {
            spot_type,
            price_usdc: quote_price(spot_type, PaymentToken::Usdc),
            price_snr: quote_price(spot_type, PaymentToken::Snr),
        })
        .collect();

    Ok(SlotsResponse { weeks, pricing })
}

/// Verifies the hold's payment on-chain and promotes the spot to active
pub async fn confirm_booking(
    state: &AppState,
    agent_handle: &str,
    req: ConfirmBookingRequest,
) -> SonarResult<ConfirmBookingResponse> {
    let pay_to = state.payment_address()?;

    let spot = state
        .repositories
        .sponsored
        .get_by_id(&req.booking_id)
        .await?
        .ok_or_else(|| SonarError::NotFound(format!("booking {} not found", req.booking_id)))?;

    if spot.booked_by != agent_handle {
        return Err(SonarError::Conflict(
            "booking belongs to another agent".to_string(),
        ));
    }
    if spot.status == "active" {
        return Err(SonarError::Conflict("booking is already active".to_string()));
    }
    let now = Utc::now();
    if spot.status != "held" || spot.hold_expires_at.map_or(true, |expires| expires <= now) {
        return Err(SonarError::Conflict(
            "hold has expired; book the slot again".to_string(),
        ));
    }

    let token = PaymentToken::from_symbol(&spot.payment_token).ok_or_else(|| {
        SonarError::Internal(format!("stored payment token {:?} is unknown", spot.payment_token))
    })?;
    let expected = spot.payment_amount.to_f64().unwrap_or(0.0);

    let transfer =
        payment_service::verify_payment(&state.chain, &req.tx_hash, token, expected, &pay_to)
            .await?;

    let spot = state.repositories.sponsored.activate(spot).await?;

    tracing::info!(booking_id = %spot.id, tx_hash = %req.tx_hash, "sponsored spot activated");

    Ok(ConfirmBookingResponse {
        spot: spot_to_response(&spot),
        transfer,
    })
}

/// All request checks, before any write. Returns the parsed fields.
fn validate_booking(req: &BookSlotRequest) -> SonarResult<(SpotType, PaymentToken, NaiveDate)> {
    let spot_type = SpotType::from_label(&req.spot_type).ok_or_else(|| {
        SonarError::Validation(format!("unknown spot_type {:?}", req.spot_type))
    })?;

    let token = PaymentToken::from_symbol(&req.payment_token).ok_or_else(|| {
        SonarError::Validation(format!("unknown payment_token {:?}", req.payment_token))
    })?;

    let week_start = req.week_start.parse::<NaiveDate>().map_err(|_| {
        SonarError::Validation(format!(
            "week_start {:?} is not a valid ISO date",
            req.week_start
        ))
    })?;
    if week_start.weekday() != Weekday::Mon {
        return Err(SonarError::Validation(format!(
            "week_start {} must be a Monday",
            week_start
        )));
    }

    if req.title.trim().is_empty() || req.title.chars().count() > MAX_TITLE_CHARS {
        return Err(SonarError::Validation(format!(
            "title must be 1-{} characters",
            MAX_TITLE_CHARS
        )));
    }
    if let Some(description) = &req.description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(SonarError::Validation(format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }
    }
    if !req.url.starts_with("https://") {
        return Err(SonarError::Validation(
            "url must start with https://".to_string(),
        ));
    }

    Ok((spot_type, token, week_start))
}

/// Monday of the week containing `date`
fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Availability as shown to clients. A held row past its expiry reads as
/// available even though it still exists.
fn slot_status(spot: &sponsored_spots::Model, now: DateTime<Utc>) -> SlotStatus {
    match spot.status.as_str() {
        "active" => SlotStatus::Booked,
        "held" => match spot.hold_expires_at {
            Some(expires) if expires > now => SlotStatus::Held,
            _ => SlotStatus::Available,
        },
        _ => SlotStatus::Available,
    }
}

fn spot_to_response(m: &sponsored_spots::Model) -> SpotResponse {
    SpotResponse {
        id: m.id.clone(),
        spot_type: m.spot_type.clone(),
        title: m.title.clone(),
        description: m.description.clone(),
        url: m.url.clone(),
        image_url: m.image_url.clone(),
        week_start: m.week_start,
        week_end: m.week_end,
        status: m.status.clone(),
        hold_expires_at: m.hold_expires_at.map(|t| t.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_request() -> BookSlotRequest {
        BookSlotRequest {
            spot_type: "project_sidebar".to_string(),
            week_start: "2026-02-16".to_string(),
            title: "Sonar Scanner".to_string(),
            description: Some("Find every new Base project".to_string()),
            url: "https://sonarscanner.xyz".to_string(),
            image_url: None,
            payment_token: "SNR".to_string(),
        }
    }

    #[test]
    fn valid_request_parses() {
        let (spot_type, token, week_start) = validate_booking(&booking_request()).unwrap();
        assert_eq!(spot_type, SpotType::ProjectSidebar);
        assert_eq!(token, PaymentToken::Snr);
        assert_eq!(week_start, NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
    }

    #[test]
    fn non_monday_week_start_is_rejected() {
        let mut req = booking_request();
        req.week_start = "2026-02-17".to_string();
        let err = validate_booking(&req).unwrap_err();
        assert!(matches!(err, SonarError::Validation(_)));
        assert!(err.to_string().contains("Monday"));
    }

    #[test]
    fn unknown_spot_type_is_rejected() {
        let mut req = booking_request();
        req.spot_type = "footer_takeover".to_string();
        assert!(matches!(
            validate_booking(&req),
            Err(SonarError::Validation(_))
        ));
    }

    #[test]
    fn unparseable_week_start_is_rejected() {
        let mut req = booking_request();
        req.week_start = "next monday".to_string();
        assert!(matches!(
            validate_booking(&req),
            Err(SonarError::Validation(_))
        ));
    }

    #[test]
    fn oversized_title_and_plain_http_url_are_rejected() {
        let mut req = booking_request();
        req.title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(validate_booking(&req).is_err());

        let mut req = booking_request();
        req.url = "http://sonarscanner.xyz".to_string();
        assert!(validate_booking(&req).is_err());
    }

    #[test]
    fn snr_discount_prices_the_sidebar_at_119_20() {
        assert_eq!(
            quote_price(SpotType::ProjectSidebar, PaymentToken::Snr).to_string(),
            "119.20"
        );
        assert_eq!(
            quote_price(SpotType::ProjectSidebar, PaymentToken::Usdc).to_string(),
            "149.00"
        );
    }

    #[test]
    fn every_spot_type_discounts_by_twenty_percent() {
        for spot_type in SpotType::all() {
            let base = quote_price(spot_type, PaymentToken::Usdc);
            let discounted = quote_price(spot_type, PaymentToken::Snr);
            assert_eq!(discounted, (base * Decimal::new(8, 1)).round_dp(2));
        }
    }

    #[test]
    fn week_monday_snaps_back_to_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        assert_eq!(week_monday(wednesday), monday);
        assert_eq!(week_monday(monday), monday);

        let sunday = NaiveDate::from_ymd_opt(2026, 2, 22).unwrap();
        assert_eq!(week_monday(sunday), monday);
    }

    fn spot_model(status: &str, hold_expires_at: Option<DateTime<Utc>>) -> sponsored_spots::Model {
        let now = Utc::now();
        sponsored_spots::Model {
            id: "spot-1".to_string(),
            spot_type: "homepage_banner".to_string(),
            booked_by: "sonarbot".to_string(),
            title: "Banner".to_string(),
            description: None,
            url: "https://example.xyz".to_string(),
            image_url: None,
            payment_token: "USDC".to_string(),
            payment_amount: Decimal::from(299),
            week_start: NaiveDate::from_ymd_opt(2026, 2, 16).unwrap(),
            week_end: NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            status: status.to_string(),
            hold_expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn expired_holds_read_as_available_without_deletion() {
        let now = Utc::now();

        let active = spot_model("active", None);
        assert_eq!(slot_status(&active, now), SlotStatus::Booked);

        let held = spot_model("held", Some(now + Duration::minutes(3)));
        assert_eq!(slot_status(&held, now), SlotStatus::Held);

        let lapsed = spot_model("held", Some(now - Duration::minutes(1)));
        assert_eq!(slot_status(&lapsed, now), SlotStatus::Available);
    }
}
