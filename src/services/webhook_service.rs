//! Webhook service for store endpoints and order notifications.
//!
//! This module handles webhook endpoint registration, `order.paid` delivery,
//! and HMAC signature generation so stores can verify what we send them.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::order::Order;
use crate::models::webhook::{
    NewWebhookEvent, WebhookEndpoint, WebhookEndpointRequest, WebhookEndpointResponse,
    WebhookPayload,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Per-delivery timeout, so a slow store endpoint cannot hold up settlement.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Register a new webhook endpoint for a store.
///
/// # Process
///
/// 1. Validate URL format
/// 2. Generate a random secret (32 bytes)
/// 3. Store endpoint in database
/// 4. Return endpoint with secret (only shown once)
pub async fn create_webhook_endpoint(
    pool: &DbPool,
    store_id: Uuid,
    request: WebhookEndpointRequest,
) -> Result<WebhookEndpointResponse, AppError> {
    validate_webhook_url(&request.url)?;

    let secret = generate_secret();

    let endpoint = sqlx::query_as::<_, WebhookEndpoint>(
        r#"
        INSERT INTO webhook_endpoints (store_id, url, secret)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(&request.url)
    .bind(&secret)
    .fetch_one(pool)
    .await?;

    tracing::info!("Webhook endpoint registered: store={}, url={}", store_id, endpoint.url);

    Ok(WebhookEndpointResponse::from(endpoint).with_secret(secret))
}

/// List a store's active endpoints. Secrets are never included.
pub async fn list_webhook_endpoints(
    pool: &DbPool,
    store_id: Uuid,
) -> Result<Vec<WebhookEndpointResponse>, AppError> {
    let endpoints = sqlx::query_as::<_, WebhookEndpoint>(
        "SELECT * FROM webhook_endpoints WHERE store_id = $1 AND is_active = true ORDER BY created_at DESC",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(endpoints.into_iter().map(|e| e.into()).collect())
}

/// Soft delete, so delivery history stays attached to the endpoint.
pub async fn delete_webhook_endpoint(
    pool: &DbPool,
    store_id: Uuid,
    endpoint_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE webhook_endpoints SET is_active = false WHERE id = $1 AND store_id = $2",
    )
    .bind(endpoint_id)
    .bind(store_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::WebhookNotFound);
    }

    Ok(())
}

/// Send `order.paid` to every active endpoint of the order's store.
///
/// # Error Handling
///
/// - Individual delivery failures are logged and recorded, never retried
/// - The order stays paid whatever the endpoints answer
pub async fn notify_order_webhooks(
    pool: &DbPool,
    http: &reqwest::Client,
    order: &Order,
) -> Result<(), AppError> {
    let endpoints = sqlx::query_as::<_, WebhookEndpoint>(
        "SELECT * FROM webhook_endpoints WHERE store_id = $1 AND is_active = true",
    )
    .bind(order.store_id)
    .fetch_all(pool)
    .await?;

    for endpoint in endpoints {
        if let Err(e) = send_webhook(pool, http, &endpoint, order).await {
            tracing::error!("Failed to send webhook to {}: {:?}", endpoint.url, e);
        }
    }

    Ok(())
}

/// Deliver one signed payload and record the attempt.
///
/// # Headers Sent
///
/// - `Content-Type: application/json`
/// - `X-Webhook-Signature: sha256=<hex>`
/// - `X-Webhook-Event-Id: <uuid>`
async fn send_webhook(
    pool: &DbPool,
    http: &reqwest::Client,
    endpoint: &WebhookEndpoint,
    order: &Order,
) -> Result<(), AppError> {
    let event_id = Uuid::new_v4();

    let payload = WebhookPayload::order_paid(event_id, order);
    let payload_value = serde_json::to_value(&payload)
        .map_err(|e| AppError::InvalidRequest(format!("Failed to serialize payload: {}", e)))?;
    let payload_json = payload_value.to_string();

    let signature = generate_signature(&endpoint.secret, &payload_json)?;

    let response = http
        .post(&endpoint.url)
        .timeout(DELIVERY_TIMEOUT)
        .header("Content-Type", "application/json")
        .header("X-Webhook-Signature", &signature)
        .header("X-Webhook-Event-Id", event_id.to_string())
        .body(payload_json)
        .send()
        .await;

    let (status, body) = match response {
        Ok(resp) => {
            let status = resp.status().as_u16() as i32;
            let body = resp.text().await.ok();
            (Some(status), body)
        }
        Err(e) => {
            let error_msg = format!("Request failed: {}", e);
            tracing::error!("{}", error_msg);
            (None, Some(error_msg))
        }
    };

    let event = NewWebhookEvent {
        id: event_id,
        webhook_endpoint_id: endpoint.id,
        order_id: order.id,
        payload: payload_value,
        response_status: status,
        response_body: body,
    };

    sqlx::query(
        r#"
        INSERT INTO webhook_events (
            id,
            webhook_endpoint_id,
            order_id,
            payload,
            response_status,
            response_body
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(event.id)
    .bind(event.webhook_endpoint_id)
    .bind(event.order_id)
    .bind(event.payload)
    .bind(event.response_status)
    .bind(event.response_body)
    .execute(pool)
    .await?;

    Ok(())
}

/// HMAC-SHA256 of the body, formatted `sha256=<hex_encoded_hmac>`.
fn generate_signature(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid webhook secret: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// 64 hex characters (32 random bytes).
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Validate webhook URL format.
///
/// # Rules
///
/// - Must be valid URL
/// - Must be HTTPS (HTTP localhost allowed for development)
/// - Maximum 2048 characters
pub(crate) fn validate_webhook_url(url: &str) -> Result<(), AppError> {
    if url.len() > 2048 {
        return Err(AppError::InvalidWebhookUrl(
            "URL exceeds 2048 characters".to_string(),
        ));
    }

    let parsed = url::Url::parse(url)
        .map_err(|_| AppError::InvalidWebhookUrl("Invalid URL format".to_string()))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => {
            if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0")) {
                Ok(())
            } else {
                Err(AppError::InvalidWebhookUrl(
                    "HTTP is only allowed for localhost. Use HTTPS for production.".to_string(),
                ))
            }
        }
        _ => Err(AppError::InvalidWebhookUrl(
            "URL must use HTTP or HTTPS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_has_prefix_and_verifies() {
        let signature = generate_signature("store-secret", r#"{"event_type":"order.paid"}"#).unwrap();
        let hex_part = signature.strip_prefix("sha256=").unwrap();
        assert_eq!(hex_part.len(), 64);

        let mut mac = HmacSha256::new_from_slice(b"store-secret").unwrap();
        mac.update(br#"{"event_type":"order.paid"}"#);
        assert!(mac.verify_slice(&hex::decode(hex_part).unwrap()).is_ok());
    }

    #[test]
    fn signature_depends_on_secret() {
        let a = generate_signature("one", "body").unwrap();
        let b = generate_signature("two", "body").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn secrets_are_random_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn url_rules() {
        assert!(validate_webhook_url("https://shop.example.com/hooks").is_ok());
        assert!(validate_webhook_url("http://localhost:4000/hooks").is_ok());
        assert!(validate_webhook_url("http://127.0.0.1/hooks").is_ok());
        assert!(validate_webhook_url("http://shop.example.com/hooks").is_err());
        assert!(validate_webhook_url("ftp://shop.example.com").is_err());
        assert!(validate_webhook_url("not a url").is_err());

        let long = format!("https://example.com/{}", "a".repeat(2048));
        assert!(validate_webhook_url(&long).is_err());
    }
}
