use rust_decimal::Decimal;
use std::str::FromStr;

/// Lower-case a header and collapse separators to `_` so exports from
/// different accounting tools line up (`GSTIN/UIN` becomes `gstin_uin`).
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let mut header = String::with_capacity(cleaned.len());
    for ch in cleaned.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            header.push(ch.to_ascii_lowercase());
        } else if !header.ends_with('_') && !header.is_empty() {
            header.push('_');
        }
    }
    header.trim_end_matches('_').to_string()
}

pub(crate) fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an amount that may carry a rupee sign, an `Rs.`/`INR` prefix, or
/// thousands separators.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let unprefixed = ["Rs.", "Rs", "INR", "\u{20b9}"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    let cleaned: String = unprefixed
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err("amount is empty".to_string());
    }

    Decimal::from_str(&cleaned).map_err(|err| format!("'{raw}' is not an amount ({err})"))
}
