//! Shared application state handed to every handler.

use crate::{db::DbPool, payments::PaymentService};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub payments: Arc<PaymentService>,
    /// Client for outbound store webhooks (gateways keep their own clients)
    pub http: reqwest::Client,
    /// Redirect used when a checkout request does not supply one
    pub default_callback_url: Option<String>,
}

/// Lets middleware and handlers that only need the pool extract `State<DbPool>`.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
