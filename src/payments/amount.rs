//! Conversion between major units (naira) and minor units (kobo).
//!
//! Storage and Paystack work in minor units. Flutterwave accepts and reports
//! major units, so amounts cross this boundary on every Flutterwave call.

/// Naira to kobo. Rounds half away from zero so `19.995` becomes `2000`.
pub fn to_minor_units(major: f64) -> i64 {
    (major * 100.0).round() as i64
}

/// Kobo to naira.
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Kobo rendered as a fixed two-decimal naira string, e.g. `150050` → `"1500.50"`.
pub fn format_major(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_naira_to_kobo() {
        assert_eq!(to_minor_units(1500.0), 150_000);
        assert_eq!(to_minor_units(0.5), 50);
        // 19.99 * 100 is 1998.999... in binary floating point
        assert_eq!(to_minor_units(19.99), 1999);
    }

    #[test]
    fn converts_kobo_to_naira() {
        assert_eq!(to_major_units(150_050), 1500.5);
        assert_eq!(to_major_units(0), 0.0);
    }

    #[test]
    fn conversion_survives_a_trip_through_major_units() {
        for minor in [1, 99, 100, 12_345, 9_999_999] {
            assert_eq!(to_minor_units(to_major_units(minor)), minor);
        }
    }

    #[test]
    fn formats_with_two_decimals() {
        assert_eq!(format_major(150_050), "1500.50");
        assert_eq!(format_major(7), "0.07");
        assert_eq!(format_major(-250), "-2.50");
    }
}
