use regex::Regex;
use std::sync::LazyLock;

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("Digit filter pattern should be valid"));

/// Compose a price from its separately rendered integer and fractional parts
///
/// Grouping punctuation is stripped from the integer part (`"1.234"` becomes
/// `1234`); a missing fractional part counts as `"00"`. Without an integer part
/// the price is `0.0`, which validation rejects.
pub fn compose_price(integer: Option<&str>, fraction: Option<&str>) -> f64 {
    let integer = integer.map(digits_only).unwrap_or_default();
    if integer.is_empty() {
        return 0.0;
    }

    let fraction = fraction
        .map(digits_only)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| "00".to_string());

    format!("{integer}.{fraction}").parse().unwrap_or(0.0)
}

fn digits_only(text: &str) -> String {
    NON_DIGITS.replace_all(text, "").into_owned()
}
