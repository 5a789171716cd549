// Handlers for subscription endpoints

use axum::{extract::State, http::HeaderMap, Json};

use crate::error::SonarResult;
use crate::handlers::AppState;
use crate::models::{
    ConfirmSubscriptionRequest, ConfirmSubscriptionResponse, CreateSubscriptionResponse,
    SubscribeRequest,
};
use crate::services::{auth_service, subscription_service};

/// POST /subscribe
/// Creates a pending pro subscription and returns payment instructions
/// (bearer auth)
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubscribeRequest>,
) -> SonarResult<Json<CreateSubscriptionResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = subscription_service::subscribe(&state, &agent.handle, req).await?;
    Ok(Json(response))
}

/// POST /subscribe/confirm
/// Verifies the subscription payment and opens the pro period (bearer auth)
pub async fn confirm_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmSubscriptionRequest>,
) -> SonarResult<Json<ConfirmSubscriptionResponse>> {
    let agent = auth_service::authenticate(&state, &headers).await?;
    let response = subscription_service::confirm_subscription(&state, &agent.handle, req).await?;
    Ok(Json(response))
}
