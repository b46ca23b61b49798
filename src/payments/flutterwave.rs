//! Flutterwave payment provider implementation
//!
//! Flutterwave Standard checkout (`POST /payments`) and verification by our
//! `tx_ref`. Unlike Paystack, Flutterwave works in major units, so amounts are
//! converted on the way out and back. Webhooks carry a `verif-hash` header that
//! must equal the secret hash configured on the Flutterwave dashboard.

use crate::error::AppError;
use crate::payments::amount::{to_major_units, to_minor_units};
use crate::payments::traits::{PaymentGateway, constant_time_eq};
use crate::payments::types::{
    Currency, GatewayEvent, InitializePayment, PaymentProviderKind, PaymentResult,
    PaymentStatus, VerificationResult,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, info};

const PROVIDER: &str = "Flutterwave";

#[derive(Debug, Clone)]
pub struct FlutterwaveConfig {
    pub secret_key: String,
    /// Shared secret Flutterwave echoes in the `verif-hash` webhook header
    pub secret_hash: String,
    /// Defaults to https://api.flutterwave.com/v3
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FlutterwaveConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            secret_hash: String::new(),
            base_url: "https://api.flutterwave.com/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct FlutterwaveService {
    config: FlutterwaveConfig,
    client: Client,
}

impl FlutterwaveService {
    pub fn new(config: FlutterwaveConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::gateway(PROVIDER, format!("HTTP client error: {}", e)))?;

        Ok(Self { config, client })
    }

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

        let envelope: FlutterwaveResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                error!("Failed to parse Flutterwave response: {}", e);
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

        if !status.is_success() || envelope.status != "success" {
            error!("Flutterwave API error ({}): {}", status, envelope.message);
            return Err(AppError::gateway(PROVIDER, envelope.message));
        }

        envelope
            .data
            .ok_or_else(|| AppError::gateway(PROVIDER, "Response did not include data"))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveService {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::Flutterwave
    }

    fn supports(&self, _currency: Currency) -> bool {
        true
    }

    async fn initialize(&self, request: &InitializePayment) -> Result<PaymentResult, AppError> {
        info!(
            "Initializing Flutterwave payment: reference={}, amount={} {}",
            request.reference, request.amount_minor, request.currency
        );

        let mut payload = serde_json::json!({
            "tx_ref": request.reference,
            "amount": to_major_units(request.amount_minor),
            "currency": request.currency.as_str(),
            "customer": {
                "email": request.email,
            },
        });

        if let Some(name) = &request.customer_name {
            payload["customer"]["name"] = serde_json::Value::String(name.clone());
        }
        if let Some(callback_url) = &request.callback_url {
            payload["redirect_url"] = serde_json::Value::String(callback_url.clone());
        }
        if let Some(metadata) = &request.metadata {
            payload["meta"] = metadata.clone();
        }

        let data: FlutterwaveInitializeData = self
            .send(self.client.post(self.url("/payments")).json(&payload))
            .await?;

        info!(
            "Flutterwave payment initialized: reference={}",
            request.reference
        );

        Ok(PaymentResult {
            success: true,
            provider: PaymentProviderKind::Flutterwave,
            reference: request.reference.clone(),
            authorization_url: Some(data.link),
            access_code: None,
            message: "Hosted link created".to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerificationResult, AppError> {
        info!("Verifying Flutterwave payment: reference={}", reference);

        let data: FlutterwaveVerifyData = self
            .send(
                self.client
                    .get(self.url("/transactions/verify_by_reference"))
                    .query(&[("tx_ref", reference)]),
            )
            .await?;

        info!(
            "Flutterwave payment verified: reference={}, status={}",
            reference, data.status
        );

        let status = map_status(&data.status);

        Ok(VerificationResult {
            success: status == PaymentStatus::Success,
            provider: PaymentProviderKind::Flutterwave,
            status,
            reference: data.tx_ref,
            amount_minor: to_minor_units(data.amount),
            currency: data.currency,
            paid_at: data.created_at,
            channel: data.payment_type,
            customer_email: data.customer.and_then(|c| c.email),
            gateway_response: data.processor_response,
        })
    }

    fn validate_webhook_signature(&self, _payload: &[u8], signature: &str) -> bool {
        if self.config.secret_hash.is_empty() {
            return false;
        }

        constant_time_eq(
            signature.trim().as_bytes(),
            self.config.secret_hash.as_bytes(),
        )
    }

    fn signature_header(&self) -> &'static str {
        "verif-hash"
    }

    fn parse_webhook(&self, payload: &[u8]) -> Result<GatewayEvent, AppError> {
        let body: FlutterwaveWebhook = serde_json::from_slice(payload).map_err(|e| {
            AppError::InvalidRequest(format!("Malformed Flutterwave webhook: {}", e))
        })?;

        // Older webhooks put the event name under "event.type" instead of "event"
        let event = match body.event.or(body.event_type).as_deref() {
            Some("CARD_TRANSACTION") => "charge.completed".to_string(),
            Some(name) => name.to_string(),
            None => "unknown".to_string(),
        };

        Ok(GatewayEvent {
            provider: PaymentProviderKind::Flutterwave,
            event,
            reference: body.data.tx_ref,
            status: body.data.status,
        })
    }
}

fn map_status(status: &str) -> PaymentStatus {
    match status {
        "successful" => PaymentStatus::Success,
        "failed" => PaymentStatus::Failed,
        "cancelled" => PaymentStatus::Abandoned,
        "pending" => PaymentStatus::Pending,
        _ => PaymentStatus::Unknown,
    }
}

#[derive(Debug, Deserialize)]
struct FlutterwaveResponse<T> {
    status: String,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveInitializeData {
    link: String,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveVerifyData {
    tx_ref: String,
    status: String,
    amount: f64,
    currency: String,
    #[serde(default)]
    payment_type: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    processor_response: Option<String>,
    #[serde(default)]
    customer: Option<FlutterwaveCustomer>,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveCustomer {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlutterwaveWebhook {
    #[serde(default)]
    event: Option<String>,
    #[serde(default, rename = "event.type")]
    event_type: Option<String>,
    #[serde(default)]
    data: FlutterwaveWebhookData,
}

#[derive(Debug, Default, Deserialize)]
struct FlutterwaveWebhookData {
    #[serde(default, alias = "txRef")]
    tx_ref: Option<String>,
    #[serde(default)]
    status: Option<String>,
}
