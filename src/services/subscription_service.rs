// Pro-tier subscriptions - pending creation and payment confirmation

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::config::BASE_CHAIN_ID;
use crate::entity::subscriptions;
use crate::error::{SonarError, SonarResult};
use crate::handlers::AppState;
use crate::models::{
    ConfirmSubscriptionRequest, ConfirmSubscriptionResponse, CreateSubscriptionResponse,
    PaymentInstructions, SubscribeRequest, SubscriptionResponse,
};
use crate::services::payment_service::{self, price_for_token, PaymentToken};

/// Monthly subscription price in USD before any token discount
const SUBSCRIPTION_BASE_USD: i64 = 29;

/// Days of pro access per confirmed payment
const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

fn base_price() -> Decimal {
    Decimal::from(SUBSCRIPTION_BASE_USD)
}

/// Creates a pending subscription and returns payment instructions. An
/// agent with a live subscription gets a 409 instead of a second one.
pub async fn subscribe(
    state: &AppState,
    agent_handle: &str,
    req: SubscribeRequest,
) -> SonarResult<CreateSubscriptionResponse> {
    let token = PaymentToken::from_symbol(&req.payment_token).ok_or_else(|| {
        SonarError::Validation(format!("unknown payment_token {:?}", req.payment_token))
    })?;
    let pay_to = state.payment_address()?;

    if state
        .repositories
        .subscriptions
        .find_active_for(agent_handle)
        .await?
        .is_some()
    {
        return Err(SonarError::Conflict(
            "agent already has an active subscription".to_string(),
        ));
    }

    let amount = price_for_token(base_price(), token);
    let now = Utc::now();
    let model = subscriptions::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        agent_handle: Set(agent_handle.to_string()),
        payment_token: Set(token.symbol().to_string()),
        payment_amount: Set(amount),
        status: Set("pending".to_string()),
        period_start: Set(None),
        period_end: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let sub = state.repositories.subscriptions.insert(model).await?;

    tracing::info!(subscription_id = %sub.id, agent = agent_handle, "subscription pending");

    Ok(CreateSubscriptionResponse {
        subscription_id: sub.id,
        payment: PaymentInstructions {
            pay_to,
            token,
            token_contract: token.contract().to_string(),
            amount,
            chain_id: BASE_CHAIN_ID,
            expires_at: None,
        },
    })
}

/// Verifies the subscription payment and opens a 30-day pro period
pub async fn confirm_subscription(
    state: &AppState,
    agent_handle: &str,
    req: ConfirmSubscriptionRequest,
) -> SonarResult<ConfirmSubscriptionResponse> {
    let pay_to = state.payment_address()?;

    let sub = state
        .repositories
        .subscriptions
        .get_by_id(&req.subscription_id)
        .await?
        .ok_or_else(|| {
            SonarError::NotFound(format!("subscription {} not found", req.subscription_id))
        })?;

    if sub.agent_handle != agent_handle {
        return Err(SonarError::Conflict(
            "subscription belongs to another agent".to_string(),
        ));
    }
    if sub.status != "pending" {
        return Err(SonarError::Conflict(
            "subscription is not awaiting payment".to_string(),
        ));
    }

    let token = PaymentToken::from_symbol(&sub.payment_token).ok_or_else(|| {
        SonarError::Internal(format!("stored payment token {:?} is unknown", sub.payment_token))
    })?;
    let expected = sub.payment_amount.to_f64().unwrap_or(0.0);

    let transfer =
        payment_service::verify_payment(&state.chain, &req.tx_hash, token, expected, &pay_to)
            .await?;

    let sub = state
        .repositories
        .subscriptions
        .activate(sub, SUBSCRIPTION_PERIOD_DAYS)
        .await?;

    tracing::info!(subscription_id = %sub.id, tx_hash = %req.tx_hash, "subscription activated");

    Ok(ConfirmSubscriptionResponse {
        subscription: subscription_to_response(&sub),
        transfer,
    })
}

fn subscription_to_response(m: &subscriptions::Model) -> SubscriptionResponse {
    SubscriptionResponse {
        id: m.id.clone(),
        status: m.status.clone(),
        payment_token: m.payment_token.clone(),
        payment_amount: m.payment_amount,
        period_start: m.period_start.map(|t| t.to_rfc3339()),
        period_end: m.period_end.map(|t| t.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_pricing_discounts_snr() {
        assert_eq!(
            price_for_token(base_price(), PaymentToken::Usdc).to_string(),
            "29.00"
        );
        assert_eq!(
            price_for_token(base_price(), PaymentToken::Snr).to_string(),
            "23.20"
        );
    }
}
