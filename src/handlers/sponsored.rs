// Handlers for sponsored spot endpoints

use axum::{extract::State, http::HeaderMap, Json};

use crate::error::SonarResult;
use crate::handlers::AppState;
use crate::models::{
    BookSlotRequest, BookingResponse, ConfirmBookingRequest, ConfirmBookingResponse, SlotsResponse,
};
use crate::services::{auth_service, sponsored_service};

/// GET /sponsored/slots
/// Public 5-week availability calendar with the rate card
pub async fn get_slots(State(state): State<AppState>) -> SonarResult<Json<SlotsResponse>> {
    let response = sponsored_service::slot_calendar(&state).await?;
    Ok(Json(response))
}

/// POST /sponsored/book
/// Reserves a slot-week with a 5-minute hold (bearer auth)
pub async fn book_slot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BookSlotRequest>,
) -> SonarResult<Json<BookingResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = sponsored_service::book_slot(&state, &agent.handle, req).await?;
    Ok(Json(response))
}

/// POST /sponsored/confirm
/// Verifies the hold's payment on-chain and activates the spot (bearer auth)
pub async fn confirm_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmBookingRequest>,
) -> SonarResult<Json<ConfirmBookingResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = sponsored_service::confirm_booking(&state, &agent.handle, req).await?;
    Ok(Json(response))
}
