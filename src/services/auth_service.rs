// Bearer API key authentication

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::entity::agents;
use crate::error::{SonarError, SonarResult};
use crate::handlers::AppState;

/// Resolves the request's bearer token to an agent. Missing, unknown, and
/// revoked keys all answer the same 401 so the response does not reveal
/// which keys exist.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> SonarResult<agents::Model> {
    let key = bearer_token(headers)
        .ok_or_else(|| SonarError::Unauthorized("missing bearer API key".to_string()))?;

    let agent = state
        .repositories
        .agents
        .find_agent_by_key(key)
        .await?
        .ok_or_else(|| SonarError::Unauthorized("invalid API key".to_string()))?;

    // Usage stamp is best effort; an error here must not fail the request
    if let Err(err) = state.repositories.agents.touch_last_used(key).await {
        tracing::warn!("failed to stamp api key usage: {err}");
    }

    Ok(agent)
}

/// The token from an `Authorization: Bearer ...` header, if present
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("sk-raw-no-scheme"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sk-agent-1"));
        assert_eq!(bearer_token(&headers), Some("sk-agent-1"));
    }
}
