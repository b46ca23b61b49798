//! Payment reference generation.

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};

/// Length of the random suffix appended to every reference.
const SUFFIX_LEN: usize = 10;

/// Generate a unique transaction reference of the form `PREFIX_<unix millis>_<SUFFIX>`.
///
/// The reference is created by us and handed to the gateway, which echoes it
/// back on verification and in webhooks. Orders use the `ORD` prefix.
pub fn generate_reference(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();

    format!(
        "{}_{}_{}",
        prefix.to_ascii_uppercase(),
        Utc::now().timestamp_millis(),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn reference_has_prefix_timestamp_and_suffix() {
        let reference = generate_reference("ord");
        let parts: Vec<&str> = reference.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn references_do_not_repeat() {
        let references: HashSet<String> = (0..1_000).map(|_| generate_reference("ORD")).collect();
        assert_eq!(references.len(), 1_000);
    }
}
