// Handlers Module
// This module contains the API endpoint handlers

pub mod health;
pub mod projects;
pub mod sponsored;
pub mod status;
pub mod subscriptions;

use std::sync::Arc;

use crate::chain::BaseRpcClient;
use crate::config::ApiConfig;
use crate::db::Repositories;
use crate::error::{SonarError, SonarResult};

/// Shared application context, built once at startup and injected into
/// every handler through axum state
pub struct AppContext {
    pub config: ApiConfig,
    pub repositories: Repositories,
    pub chain: BaseRpcClient,
}

/// Type alias for the application state
pub type AppState = Arc<AppContext>;

impl AppContext {
    /// The configured receiving address for on-chain payments. Paid flows
    /// cannot proceed without it.
    pub fn payment_address(&self) -> SonarResult<String> {
        self.config
            .payment_address
            .clone()
            .ok_or_else(|| SonarError::Internal("PAYMENT_ADDRESS is not configured".to_string()))
    }
}
