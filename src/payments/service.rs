//! Provider selection and result normalization.
//!
//! `PaymentService` is the only payment entry point the storefront uses. It
//! routes naira to Paystack and everything else to Flutterwave unless the
//! caller asks for a specific provider.

use crate::config::Config;
use crate::error::AppError;
use crate::payments::flutterwave::{FlutterwaveConfig, FlutterwaveService};
use crate::payments::paystack::{PaystackConfig, PaystackService};
use crate::payments::traits::PaymentGateway;
use crate::payments::types::{
    Currency, InitializePayment, PaymentProviderKind, PaymentResult, VerificationResult,
};
use std::sync::Arc;

pub struct PaymentService {
    paystack: Arc<dyn PaymentGateway>,
    flutterwave: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(paystack: Arc<dyn PaymentGateway>, flutterwave: Arc<dyn PaymentGateway>) -> Self {
        Self {
            paystack,
            flutterwave,
        }
    }

    /// Build both vendor clients from application config.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let paystack = PaystackService::new(PaystackConfig {
            secret_key: config.paystack_secret_key.clone(),
            base_url: config.paystack_base_url.clone(),
            timeout_secs: config.gateway_timeout_secs,
        })?;

        let flutterwave = FlutterwaveService::new(FlutterwaveConfig {
            secret_key: config.flutterwave_secret_key.clone(),
            secret_hash: config.flutterwave_secret_hash.clone(),
            base_url: config.flutterwave_base_url.clone(),
            timeout_secs: config.gateway_timeout_secs,
        })?;

        Ok(Self::new(Arc::new(paystack), Arc::new(flutterwave)))
    }

    /// Default provider for a currency: Paystack for naira, Flutterwave otherwise.
    pub fn provider_for_currency(currency: Currency) -> PaymentProviderKind {
        match currency {
            Currency::Ngn => PaymentProviderKind::Paystack,
            _ => PaymentProviderKind::Flutterwave,
        }
    }

    pub fn gateway(&self, kind: PaymentProviderKind) -> &dyn PaymentGateway {
        match kind {
            PaymentProviderKind::Paystack => self.paystack.as_ref(),
            PaymentProviderKind::Flutterwave => self.flutterwave.as_ref(),
        }
    }

    /// Resolve which provider will handle a checkout.
    ///
    /// An explicit preference wins, but only if that provider can charge in the currency.
    pub fn select_provider(
        &self,
        currency: Currency,
        preferred: Option<PaymentProviderKind>,
    ) -> Result<PaymentProviderKind, AppError> {
        let kind = preferred.unwrap_or_else(|| Self::provider_for_currency(currency));

        if !self.gateway(kind).supports(currency) {
            return Err(AppError::InvalidRequest(format!(
                "{} does not accept {} payments",
                kind.display_name(),
                currency
            )));
        }

        Ok(kind)
    }

    /// Start a payment with the selected provider.
    pub async fn initialize(
        &self,
        kind: PaymentProviderKind,
        request: &InitializePayment,
    ) -> Result<PaymentResult, AppError> {
        if request.amount_minor <= 0 {
            return Err(AppError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }

        self.gateway(kind).initialize(request).await
    }

    pub async fn verify(
        &self,
        kind: PaymentProviderKind,
        reference: &str,
    ) -> Result<VerificationResult, AppError> {
        self.gateway(kind).verify(reference).await
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeGateway, verification};
    use super::*;

    fn service() -> (PaymentService, Arc<FakeGateway>, Arc<FakeGateway>) {
        let paystack = Arc::new(
            FakeGateway::new(PaymentProviderKind::Paystack)
                .with_verification(verification(5_000, "NGN")),
        );
        let flutterwave = Arc::new(FakeGateway::new(PaymentProviderKind::Flutterwave));
        let service = PaymentService::new(paystack.clone(), flutterwave.clone());
        (service, paystack, flutterwave)
    }

    fn request(amount_minor: i64) -> InitializePayment {
        InitializePayment {
            email: "reader@example.com".into(),
            amount_minor,
            currency: Currency::Ngn,
            reference: "ORD_1".into(),
            callback_url: None,
            customer_name: None,
            metadata: None,
        }
    }

    #[test]
    fn naira_goes_to_paystack_everything_else_to_flutterwave() {
        assert_eq!(
            PaymentService::provider_for_currency(Currency::Ngn),
            PaymentProviderKind::Paystack
        );
        for currency in [Currency::Usd, Currency::Ghs, Currency::Gbp] {
            assert_eq!(
                PaymentService::provider_for_currency(currency),
                PaymentProviderKind::Flutterwave
            );
        }
    }

    #[test]
    fn explicit_provider_overrides_currency_default() {
        let (service, _, _) = service();
        let kind = service
            .select_provider(Currency::Ngn, Some(PaymentProviderKind::Flutterwave))
            .unwrap();
        assert_eq!(kind, PaymentProviderKind::Flutterwave);
    }

    #[test]
    fn unsupported_currency_is_rejected() {
        let (service, _, _) = service();
        let err = service
            .select_provider(Currency::Eur, Some(PaymentProviderKind::Paystack))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn initialize_routes_to_selected_gateway() {
        let (service, paystack, flutterwave) = service();

        let result = service
            .initialize(PaymentProviderKind::Paystack, &request(5_000))
            .await
            .unwrap();

        assert_eq!(result.provider, PaymentProviderKind::Paystack);
        assert_eq!(paystack.initialized.lock().unwrap().as_slice(), ["ORD_1"]);
        assert!(flutterwave.initialized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn initialize_rejects_non_positive_amount() {
        let (service, paystack, _) = service();

        let err = service
            .initialize(PaymentProviderKind::Paystack, &request(0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(paystack.initialized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn verify_uses_named_provider() {
        let (service, _, _) = service();

        let result = service
            .verify(PaymentProviderKind::Paystack, "ORD_1")
            .await
            .unwrap();
        assert_eq!(result.amount_minor, 5_000);

        assert!(
            service
                .verify(PaymentProviderKind::Flutterwave, "ORD_1")
                .await
                .is_err()
        );
    }
}
