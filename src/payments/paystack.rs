//! Paystack payment provider implementation
//!
//! Integration with Paystack's transaction API. Paystack takes and reports
//! amounts in kobo, signs webhooks with HMAC-SHA512 of the raw body keyed by the
//! secret key, and wraps every response in `{ status, message, data }`.

use crate::error::AppError;
use crate::payments::traits::PaymentGateway;
use crate::payments::types::{
    Currency, GatewayEvent, InitializePayment, PaymentProviderKind, PaymentResult,
    PaymentStatus, VerificationResult,
};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::Sha512;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

type HmacSha512 = Hmac<Sha512>;

const PROVIDER: &str = "Paystack";

/// Paystack payment provider configuration
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Paystack API secret key
    pub secret_key: String,
    /// Paystack API base URL (defaults to https://api.paystack.co)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: "https://api.paystack.co".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Paystack HTTP client.
pub struct PaystackService {
    config: PaystackConfig,
    client: Client,
}

impl PaystackService {
    pub fn new(config: PaystackConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::gateway(PROVIDER, format!("HTTP client error: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Send an authenticated request and unwrap the `{ status, message, data }` envelope.
    ///
    /// There is no retry: a failed call surfaces immediately as `AppError::Gateway`.
    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| AppError::gateway(PROVIDER, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::gateway(PROVIDER, format!("Failed to read response: {}", e)))?;

        let envelope: PaystackResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                error!("Failed to parse Paystack response: {}", e);
                return Err(AppError::gateway(
                    PROVIDER,
                    format!("Invalid response format: {}", e),
                ));
            }
            Err(_) => {
                return Err(AppError::gateway(
                    PROVIDER,
                    format!("HTTP {}: {}", status, body),
                ));
            }
        };

        if !status.is_success() || !envelope.status {
            error!("Paystack API error ({}): {}", status, envelope.message);
            return Err(AppError::gateway(PROVIDER, envelope.message));
        }

        envelope
            .data
            .ok_or_else(|| AppError::gateway(PROVIDER, "Response did not include data"))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Verify endpoint for `reference`, percent-encoded as a single path segment.
    fn verify_url(&self, reference: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AppError::gateway(PROVIDER, format!("Invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AppError::gateway(PROVIDER, "Base URL cannot take a path"))?
            .pop_if_empty()
            .extend(["transaction", "verify", reference]);

        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for PaystackService {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::Paystack
    }

    fn supports(&self, currency: Currency) -> bool {
        matches!(
            currency,
            Currency::Ngn | Currency::Usd | Currency::Ghs | Currency::Zar | Currency::Kes
        )
    }

    async fn initialize(&self, request: &InitializePayment) -> Result<PaymentResult, AppError> {
        info!(
            "Initializing Paystack payment: reference={}, amount={} {}",
            request.reference, request.amount_minor, request.currency
        );

        let mut payload = serde_json::json!({
            "email": request.email,
            "amount": request.amount_minor,
            "currency": request.currency.as_str(),
            "reference": request.reference,
        });

        if let Some(callback_url) = &request.callback_url {
            payload["callback_url"] = serde_json::Value::String(callback_url.clone());
        }

        let mut metadata = request
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));
        if let (Some(name), Some(map)) = (&request.customer_name, metadata.as_object_mut()) {
            map.insert(
                "customer_name".to_string(),
                serde_json::Value::String(name.clone()),
            );
        }
        payload["metadata"] = metadata;

        let data: PaystackInitializeData = self
            .send(
                self.client
                    .post(self.url("/transaction/initialize"))
                    .json(&payload),
            )
            .await?;

        info!("Paystack payment initialized: reference={}", data.reference);

        Ok(PaymentResult {
            success: true,
            provider: PaymentProviderKind::Paystack,
            reference: data.reference,
            authorization_url: Some(data.authorization_url),
            access_code: Some(data.access_code),
            message: "Authorization URL created".to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerificationResult, AppError> {
        info!("Verifying Paystack payment: reference={}", reference);

        let data: PaystackVerifyData = self
            .send(self.client.get(self.verify_url(reference)?))
            .await?;

        info!(
            "Paystack payment verified: reference={}, status={}",
            reference, data.status
        );

        let status = map_status(&data.status);

        Ok(VerificationResult {
            success: status == PaymentStatus::Success,
            provider: PaymentProviderKind::Paystack,
            status,
            reference: data.reference,
            amount_minor: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
            channel: data.channel,
            customer_email: data.customer.and_then(|c| c.email),
            gateway_response: data.gateway_response,
        })
    }

    fn validate_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature.trim()) else {
            return false;
        };

        let Ok(mut mac) = HmacSha512::new_from_slice(self.config.secret_key.as_bytes()) else {
            return false;
        };
        mac.update(payload);

        // verify_slice compares in constant time
        mac.verify_slice(&provided).is_ok()
    }

    fn signature_header(&self) -> &'static str {
        "x-paystack-signature"
    }

    fn parse_webhook(&self, payload: &[u8]) -> Result<GatewayEvent, AppError> {
        let body: PaystackWebhook = serde_json::from_slice(payload)
            .map_err(|e| AppError::InvalidRequest(format!("Malformed Paystack webhook: {}", e)))?;

        Ok(GatewayEvent {
            provider: PaymentProviderKind::Paystack,
            event: body.event,
            reference: body.data.reference,
            status: body.data.status,
        })
    }
}

fn map_status(status: &str) -> PaymentStatus {
    match status {
        "success" => PaymentStatus::Success,
        "failed" => PaymentStatus::Failed,
        "abandoned" => PaymentStatus::Abandoned,
        "reversed" => PaymentStatus::Reversed,
        "pending" | "ongoing" | "processing" | "queued" => PaymentStatus::Pending,
        _ => PaymentStatus::Unknown,
    }
}

// Paystack API response wrapper
#[derive(Debug, Deserialize)]
struct PaystackResponse<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PaystackInitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct PaystackVerifyData {
    amount: i64,
    currency: String,
    status: String,
    reference: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    paid_at: Option<String>,
    #[serde(default)]
    gateway_response: Option<String>,
    #[serde(default)]
    customer: Option<PaystackCustomer>,
}

#[derive(Debug, Deserialize)]
struct PaystackCustomer {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaystackWebhook {
    event: String,
    #[serde(default)]
    data: PaystackWebhookData,
}

#[derive(Debug, Default, Deserialize)]
struct PaystackWebhookData {
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::testing::spawn_fake_gateway;
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::{Value, json};

    const SECRET: &str = "sk_test_paystack_secret";

    fn provider(base_url: &str) -> PaystackService {
        PaystackService::new(PaystackConfig {
            secret_key: SECRET.to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn sign(payload: &[u8]) -> String {
        let mut mac = HmacSha512::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn request() -> InitializePayment {
        InitializePayment {
            email: "reader@example.com".into(),
            amount_minor: 250_000,
            currency: Currency::Ngn,
            reference: "ORD_1700000000000_ABCDEFGHIJ".into(),
            callback_url: Some("https://shop.example.com/thanks".into()),
            customer_name: Some("Ada Reader".into()),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn initialize_sends_kobo_and_bearer_key() {
        let app = Router::new().route(
            "/transaction/initialize",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers["authorization"].to_str().unwrap(),
                    format!("Bearer {}", SECRET)
                );
                assert_eq!(body["amount"], 250_000);
                assert_eq!(body["currency"], "NGN");
                assert_eq!(body["metadata"]["customer_name"], "Ada Reader");
                Json(json!({
                    "status": true,
                    "message": "Authorization URL created",
                    "data": {
                        "authorization_url": "https://checkout.paystack.com/abc",
                        "access_code": "abc",
                        "reference": body["reference"],
                    }
                }))
            }),
        );
        let base_url = spawn_fake_gateway(app).await;

        let result = provider(&base_url).initialize(&request()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.provider, PaymentProviderKind::Paystack);
        assert_eq!(result.reference, "ORD_1700000000000_ABCDEFGHIJ");
        assert_eq!(
            result.authorization_url.as_deref(),
            Some("https://checkout.paystack.com/abc")
        );
        assert_eq!(result.access_code.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn verify_normalizes_success() {
        let app = Router::new().route(
            "/transaction/verify/{reference}",
            get(|Path(reference): Path<String>| async move {
                Json(json!({
                    "status": true,
                    "message": "Verification successful",
                    "data": {
                        "amount": 250_000,
                        "currency": "NGN",
                        "status": "success",
                        "reference": reference,
                        "channel": "card",
                        "paid_at": "2025-01-15T10:30:00.000Z",
                        "gateway_response": "Approved",
                        "customer": { "email": "reader@example.com" }
                    }
                }))
            }),
        );
        let base_url = spawn_fake_gateway(app).await;

        let result = provider(&base_url).verify("ORD_1").await.unwrap();

        assert!(result.success);
        assert_eq!(result.status, PaymentStatus::Success);
        assert_eq!(result.amount_minor, 250_000);
        assert_eq!(result.reference, "ORD_1");
        assert_eq!(result.channel.as_deref(), Some("card"));
        assert_eq!(result.customer_email.as_deref(), Some("reader@example.com"));
    }

    #[test]
    fn verify_url_encodes_reference_as_one_segment() {
        let url = provider("https://api.paystack.co/").verify_url("ORD 1/../refund?x=1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.paystack.co/transaction/verify/ORD%201%2F..%2Frefund%3Fx=1"
        );

        let plain = provider("http://127.0.0.1:4000").verify_url("ORD_1").unwrap();
        assert_eq!(plain.as_str(), "http://127.0.0.1:4000/transaction/verify/ORD_1");
    }

    #[tokio::test]
    async fn verify_sends_unusual_reference_intact() {
        let app = Router::new().route(
            "/transaction/verify/{reference}",
            get(|Path(reference): Path<String>| async move {
                assert_eq!(reference, "ORD 7/B");
                Json(json!({
                    "status": true,
                    "message": "Verification successful",
                    "data": {
                        "amount": 250_000,
                        "currency": "NGN",
                        "status": "success",
                        "reference": reference,
                    }
                }))
            }),
        );
        let base_url = spawn_fake_gateway(app).await;

        let result = provider(&base_url).verify("ORD 7/B").await.unwrap();

        assert_eq!(result.reference, "ORD 7/B");
    }

    #[tokio::test]
    async fn verify_reports_abandoned_as_unsuccessful() {
        let app = Router::new().route(
            "/transaction/verify/{reference}",
            get(|Path(reference): Path<String>| async move {
                Json(json!({
                    "status": true,
                    "message": "Verification successful",
                    "data": {
                        "amount": 100,
                        "currency": "NGN",
                        "status": "abandoned",
                        "reference": reference
                    }
                }))
            }),
        );
        let base_url = spawn_fake_gateway(app).await;

        let result = provider(&base_url).verify("ORD_2").await.unwrap();

        assert!(!result.success);
        assert_eq!(result.status, PaymentStatus::Abandoned);
    }

    #[tokio::test]
    async fn vendor_error_envelope_becomes_gateway_error() {
        let app = Router::new().route(
            "/transaction/verify/{reference}",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "status": false, "message": "Transaction reference not found" })),
                )
            }),
        );
        let base_url = spawn_fake_gateway(app).await;

        let err = provider(&base_url).verify("missing").await.unwrap_err();

        match err {
            AppError::Gateway { provider, message } => {
                assert_eq!(provider, "Paystack");
                assert_eq!(message, "Transaction reference not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_gateway_error() {
        let err = provider("http://127.0.0.1:1").verify("ORD_3").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway { .. }));
    }

    #[test]
    fn webhook_signature_accepts_hmac_of_body() {
        let provider = provider("http://unused");
        let payload = br#"{"event":"charge.success","data":{"reference":"ORD_1"}}"#;

        assert!(provider.validate_webhook_signature(payload, &sign(payload)));
    }

    #[test]
    fn webhook_signature_rejects_tampered_body_and_garbage() {
        let provider = provider("http://unused");
        let payload = br#"{"event":"charge.success","data":{"reference":"ORD_1"}}"#;
        let signature = sign(payload);

        let tampered = br#"{"event":"charge.success","data":{"reference":"ORD_2"}}"#;
        assert!(!provider.validate_webhook_signature(tampered, &signature));
        assert!(!provider.validate_webhook_signature(payload, "invalid_signature"));
        assert!(!provider.validate_webhook_signature(payload, ""));
    }

    #[test]
    fn parses_charge_success_webhook() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ORD_9","status":"success","amount":5000}}"#;
        let event = provider("http://unused").parse_webhook(payload).unwrap();

        assert_eq!(event.event, "charge.success");
        assert_eq!(event.reference.as_deref(), Some("ORD_9"));
        assert!(event.is_charge());
    }

    #[test]
    fn supports_african_currencies_but_not_gbp() {
        let provider = provider("http://unused");
        assert!(provider.supports(Currency::Ngn));
        assert!(provider.supports(Currency::Ghs));
        assert!(!provider.supports(Currency::Gbp));
    }

    #[test]
    fn paystack_config_default() {
        let config = PaystackConfig::default();
        assert_eq!(config.base_url, "https://api.paystack.co");
        assert_eq!(config.timeout_secs, 30);
    }
}
