// Daily action limits by subscription tier

use chrono::{DateTime, NaiveTime, Utc};

use crate::error::{SonarError, SonarResult};
use crate::handlers::AppState;

const FREE_SUBMISSIONS_PER_DAY: u64 = 3;
const PRO_SUBMISSIONS_PER_DAY: u64 = 25;
const FREE_UPVOTES_PER_DAY: u64 = 50;
const PRO_UPVOTES_PER_DAY: u64 = 500;

/// Subscription tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
        }
    }
}

/// Actions subject to daily limits. Paid flows (booking, subscribing) are
/// payment-gated instead and not counted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAction {
    SubmitProject,
    Upvote,
}

impl LimitedAction {
    fn noun(&self) -> &'static str {
        match self {
            LimitedAction::SubmitProject => "project submissions",
            LimitedAction::Upvote => "upvotes",
        }
    }
}

/// Allowed actions of this kind per UTC day
pub fn daily_allowance(action: LimitedAction, tier: Tier) -> u64 {
    match (action, tier) {
        (LimitedAction::SubmitProject, Tier::Free) => FREE_SUBMISSIONS_PER_DAY,
        (LimitedAction::SubmitProject, Tier::Pro) => PRO_SUBMISSIONS_PER_DAY,
        (LimitedAction::Upvote, Tier::Free) => FREE_UPVOTES_PER_DAY,
        (LimitedAction::Upvote, Tier::Pro) => PRO_UPVOTES_PER_DAY,
    }
}

/// Start of the current UTC day; the counting window resets here
pub fn day_start() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// An agent is pro iff it holds an unexpired active subscription
pub async fn resolve_tier(state: &AppState, agent_handle: &str) -> SonarResult<Tier> {
    let active = state
        .repositories
        .subscriptions
        .find_active_for(agent_handle)
        .await?;
    Ok(if active.is_some() { Tier::Pro } else { Tier::Free })
}

/// Rejects with 429 when the agent has used up today's allowance for
/// `action`. Counts rows created since UTC midnight.
pub async fn enforce(
    state: &AppState,
    agent_handle: &str,
    action: LimitedAction,
) -> SonarResult<()> {
    let tier = resolve_tier(state, agent_handle).await?;
    let since = day_start();

    let used = match action {
        LimitedAction::SubmitProject => {
            state
                .repositories
                .projects
                .count_submitted_since(agent_handle, since)
                .await?
        }
        LimitedAction::Upvote => {
            state
                .repositories
                .projects
                .count_upvotes_since(agent_handle, since)
                .await?
        }
    };

    let allowance = daily_allowance(action, tier);
    if used >= allowance {
        return Err(SonarError::RateLimited(format!(
            "{} tier daily limit of {} {} reached",
            tier.label(),
            allowance,
            action.noun()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowances_per_tier() {
        assert_eq!(daily_allowance(LimitedAction::SubmitProject, Tier::Free), 3);
        assert_eq!(daily_allowance(LimitedAction::SubmitProject, Tier::Pro), 25);
        assert_eq!(daily_allowance(LimitedAction::Upvote, Tier::Free), 50);
        assert_eq!(daily_allowance(LimitedAction::Upvote, Tier::Pro), 500);
    }

    #[test]
    fn day_start_is_utc_midnight() {
        assert_eq!(day_start().time(), NaiveTime::MIN);
    }
}
