//! Inbound payment notifications from Paystack and Flutterwave.
//!
//! These routes carry no API key; the vendor signature is the only
//! authentication. The body is taken as raw bytes because the signature is
//! computed over the exact payload the vendor sent.
//!
//! # Process
//!
//! 1. Check the signature header against the raw body
//! 2. Log the event to `payment_events`
//! 3. For charge events on an order that can still settle, re-verify with the
//!    vendor and settle
//!
//! The event body is never trusted for amounts: settlement always uses the
//! vendor's verify endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::error::AppError;
use crate::models::order::Order;
use crate::payments::{GatewayEvent, PaymentProviderKind};
use crate::services::order_service;
use crate::state::AppState;

pub async fn paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    handle_gateway_webhook(&state, PaymentProviderKind::Paystack, &headers, &body).await
}

pub async fn flutterwave_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    handle_gateway_webhook(&state, PaymentProviderKind::Flutterwave, &headers, &body).await
}

/// What to do with a signed, logged gateway event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WebhookDecision {
    NotCharge,
    NoReference,
    UnknownReference,
    /// Paid, cancelled, or failed for a reason a retry cannot fix
    AlreadySettled,
    /// The order was placed with the other gateway
    OtherProvider,
    Verify,
}

/// `order` is the order found for the event's reference, if it was looked up.
fn decide_webhook(
    kind: PaymentProviderKind,
    event: &GatewayEvent,
    order: Option<&Order>,
) -> WebhookDecision {
    if !event.is_charge() {
        return WebhookDecision::NotCharge;
    }

    if event.reference.is_none() {
        return WebhookDecision::NoReference;
    }

    let Some(order) = order else {
        return WebhookDecision::UnknownReference;
    };

    if !order_service::is_settleable(order) {
        return WebhookDecision::AlreadySettled;
    }

    if order.provider_kind() != Some(kind) {
        return WebhookDecision::OtherProvider;
    }

    WebhookDecision::Verify
}

async fn handle_gateway_webhook(
    state: &AppState,
    kind: PaymentProviderKind,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<StatusCode, AppError> {
    let gateway = state.payments.gateway(kind);

    let signature = headers
        .get(gateway.signature_header())
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    if !gateway.validate_webhook_signature(body, signature) {
        tracing::warn!("Rejected {} webhook with bad signature", kind.display_name());
        return Err(AppError::InvalidSignature);
    }

    let event = gateway.parse_webhook(body)?;
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("Webhook body is not JSON: {}", e)))?;

    order_service::record_payment_event(&state.pool, &event, payload).await?;

    tracing::info!(
        "{} webhook: event={}, reference={:?}",
        kind.display_name(),
        event.event,
        event.reference
    );

    let order = match event.reference.as_deref() {
        Some(reference) if event.is_charge() => {
            order_service::find_order_by_reference(&state.pool, reference).await?
        }
        _ => None,
    };

    match (decide_webhook(kind, &event, order.as_ref()), order) {
        (WebhookDecision::Verify, Some(order)) => {
            let verification = state.payments.verify(kind, &order.reference).await?;
            order_service::settle_order(state, &order.reference, &verification).await?;
        }
        (WebhookDecision::UnknownReference, _) => {
            tracing::warn!(
                "{} webhook for unknown reference {:?}",
                kind.display_name(),
                event.reference
            );
        }
        (WebhookDecision::OtherProvider, Some(order)) => {
            tracing::warn!(
                "Order {} belongs to {:?} but {} sent a webhook for it",
                order.reference,
                order.provider,
                kind.display_name()
            );
        }
        (decision, _) => {
            tracing::debug!("Ignoring {} webhook: {:?}", kind.display_name(), decision);
        }
    }

    Ok(StatusCode::OK)
}
