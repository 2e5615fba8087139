//! Conversion of listing notations (rupiah amounts, m² areas) into plain integers.
//!
//! Nothing here fails: an unrecognised notation yields `0` and the caller
//! decides whether that is fatal for the listing.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

const BILLION: u64 = 1_000_000_000;
const MILLION: u64 = 1_000_000;

fn currency_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            // The trailing class keeps "120 m²" / "120 m2" from reading as 120 billion.
            Regex::new(r"(?i)(\d+)(?:[.,](\d+))?\s*(miliar|milyar|juta|jt|m)(?:[^a-z0-9²]|$)").ok()
        })
        .as_ref()
}

/// Parse a price such as `"Rp 7,5 Miliar"` or `"Rp 500 Juta"` into whole rupiah.
///
/// Comma and dot are both accepted as the decimal separator. Fractions below
/// one rupiah are truncated. Returns `0` when no value+scale pair is present.
pub fn normalize_currency(text: &str) -> u64 {
    let Some(caps) = currency_pattern().and_then(|re| re.captures(text)) else {
        return 0;
    };

    let scale = match caps[3].to_lowercase().as_str() {
        "miliar" | "milyar" | "m" => BILLION,
        _ => MILLION,
    };

    let Ok(whole) = caps[1].parse::<u128>() else {
        return 0;
    };
    let Some(mut value) = whole.checked_mul(u128::from(scale)) else {
        return 0;
    };

    if let Some(frac) = caps.get(2) {
        let digits = frac.as_str();
        // Digits past the scale's magnitude can only contribute sub-rupiah amounts.
        let digits = &digits[..digits.len().min(9)];
        if let Ok(numerator) = digits.parse::<u128>() {
            let denominator = 10u128.pow(digits.len() as u32);
            let Some(total) = value.checked_add(numerator * u128::from(scale) / denominator) else {
                return 0;
            };
            value = total;
        }
    }

    u64::try_from(value).unwrap_or(0)
}

/// Integer written plainly or with dots as thousands separators ("1.200")
const AREA_NUMBER: &str = r"(\d{1,3}(?:\.\d{3})+|\d+)";

fn parse_area_number(digits: &str) -> u32 {
    digits.replace('.', "").parse().unwrap_or(0)
}

fn area_pattern(label: &str) -> Option<Regex> {
    static PATTERNS: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();
    let mut patterns = match PATTERNS.get_or_init(Default::default).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(re) = patterns.get(label) {
        return Some(re.clone());
    }
    let pattern = format!(r"(?i)\b{}\s*[:.=]?\s*{}", regex::escape(label), AREA_NUMBER);
    let re = Regex::new(&pattern).ok()?;
    patterns.insert(label.to_string(), re.clone());
    Some(re)
}

/// Find `label` immediately followed by an integer, e.g. `"LT: 120 m2"` for `"LT"`.
/// Returns `0` when the label is absent.
pub fn normalize_area(text: &str, label: &str) -> u32 {
    area_pattern(label)
        .and_then(|re| re.captures(text).map(|caps| parse_area_number(&caps[1])))
        .unwrap_or(0)
}

/// Leading integer of a badge value such as `"120 m²"` or `"1.200 m²"`; `0` when there is none.
pub fn parse_leading_int(text: &str) -> u32 {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(&format!(r"^\D*{}", AREA_NUMBER)).ok())
        .as_ref()
        .and_then(|re| re.captures(text))
        .map(|caps| parse_area_number(&caps[1]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_billion_with_comma_decimal() {
        assert_eq!(normalize_currency("Rp 7,5 Miliar"), 7_500_000_000);
        assert_eq!(normalize_currency("Rp 3.25 milyar"), 3_250_000_000);
        assert_eq!(normalize_currency("Rp 1,2 M"), 1_200_000_000);
    }

    #[test]
    fn test_currency_million() {
        assert_eq!(normalize_currency("Rp 500 Juta"), 500_000_000);
        assert_eq!(normalize_currency("Rp 850 jt"), 850_000_000);
        assert_eq!(normalize_currency("Harga: Rp 1,75 JUTA / bulan"), 1_750_000);
    }

    #[test]
    fn test_currency_without_scale_is_zero() {
        assert_eq!(normalize_currency("no price here"), 0);
        assert_eq!(normalize_currency("Rp 1.250.000.000"), 0);
        assert_eq!(normalize_currency(""), 0);
    }

    #[test]
    fn test_currency_overflow_is_zero() {
        assert_eq!(normalize_currency("Rp 1000000000000000000000000000000 M"), 0);
        assert_eq!(normalize_currency("Rp 99999999999 Miliar"), 0);
    }

    #[test]
    fn test_currency_skips_area_units() {
        assert_eq!(normalize_currency("LT 120 m² LB 90 m2 Rp 2,1 M"), 2_100_000_000);
        assert_eq!(normalize_currency("120 meter"), 0);
    }

    #[test]
    fn test_area_label() {
        assert_eq!(normalize_area("LT: 120 m2", "LT"), 120);
        assert_eq!(normalize_area("LB 90 m² LT 150 m²", "LT"), 150);
        assert_eq!(normalize_area("lb:75", "LB"), 75);
        assert_eq!(normalize_area("no area field", "LT"), 0);
    }

    #[test]
    fn test_area_thousands_separator() {
        assert_eq!(normalize_area("LT: 1.200 m2", "LT"), 1_200);
        assert_eq!(normalize_area("LB 2.500.000", "LB"), 2_500_000);
        assert_eq!(normalize_area("LT 120.5 m2", "LT"), 120);
        assert_eq!(normalize_area("LT 1.200 m2 LB 300", "LB"), 300);
    }

    #[test]
    fn test_area_label_requires_word_boundary() {
        assert_eq!(normalize_area("SLT 40", "LT"), 0);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("120 m²"), 120);
        assert_eq!(parse_leading_int("  3"), 3);
        assert_eq!(parse_leading_int("m²"), 0);
        assert_eq!(parse_leading_int("1.200 m²"), 1_200);
        assert_eq!(parse_leading_int("Luas 1200 m²"), 1_200);
    }
}
