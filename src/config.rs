//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `PAYSTACK_SECRET_KEY` (required): Paystack secret key, also used to sign webhooks
/// - `PAYSTACK_BASE_URL` (optional): defaults to `https://api.paystack.co`
/// - `FLUTTERWAVE_SECRET_KEY` (required): Flutterwave secret key
/// - `FLUTTERWAVE_SECRET_HASH` (required): value Flutterwave sends in the `verif-hash` header
/// - `FLUTTERWAVE_BASE_URL` (optional): defaults to `https://api.flutterwave.com/v3`
/// - `PAYMENT_CALLBACK_URL` (optional): where customers land after paying
/// - `GATEWAY_TIMEOUT_SECS` (optional): per-request timeout for gateway calls, defaults to 30
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    pub paystack_secret_key: String,

    #[serde(default = "default_paystack_base_url")]
    pub paystack_base_url: String,

    pub flutterwave_secret_key: String,

    pub flutterwave_secret_hash: String,

    #[serde(default = "default_flutterwave_base_url")]
    pub flutterwave_base_url: String,

    #[serde(default)]
    pub payment_callback_url: Option<String>,

    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_flutterwave_base_url() -> String {
    "https://api.flutterwave.com/v3".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, PAYSTACK_SECRET_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_vars() -> Vec<(String, String)> {
        vec![
            ("DATABASE_URL".into(), "postgres://localhost/folio".into()),
            ("PAYSTACK_SECRET_KEY".into(), "sk_test_paystack".into()),
            ("FLUTTERWAVE_SECRET_KEY".into(), "FLWSECK_TEST-abc".into()),
            ("FLUTTERWAVE_SECRET_HASH".into(), "hash-123".into()),
        ]
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config: Config = envy::from_iter(required_vars()).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.paystack_base_url, "https://api.paystack.co");
        assert_eq!(config.flutterwave_base_url, "https://api.flutterwave.com/v3");
        assert_eq!(config.gateway_timeout_secs, 30);
        assert!(config.payment_callback_url.is_none());
    }

    #[test]
    fn optional_vars_override_defaults() {
        let mut vars = required_vars();
        vars.push(("SERVER_PORT".into(), "8080".into()));
        vars.push((
            "PAYMENT_CALLBACK_URL".into(),
            "https://shop.example.com/thanks".into(),
        ));

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(
            config.payment_callback_url.as_deref(),
            Some("https://shop.example.com/thanks")
        );
    }

    #[test]
    fn missing_gateway_secret_is_an_error() {
        let vars = vec![("DATABASE_URL".to_string(), "postgres://x".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
