use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not a monetary amount: {0:?}")]
pub struct CurrencyParseError(pub String);

/// Parses a currency cell such as `"$48,000"`, `"65"` or `"-$1,234.50"`.
///
/// The leading `$` is optional. Grouping commas and whitespace are ignored.
pub fn parse_currency(raw: &str) -> Result<f64, CurrencyParseError> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let unsigned = rest.strip_prefix('$').unwrap_or(rest);
    let sanitized = unsigned
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>();
    let well_formed = !sanitized.is_empty()
        && sanitized.chars().any(|c| c.is_ascii_digit())
        && sanitized.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !well_formed {
        return Err(CurrencyParseError(raw.to_string()));
    }
    let amount = sanitized
        .parse::<f64>()
        .map_err(|_| CurrencyParseError(raw.to_string()))?;
    if !amount.is_finite() {
        return Err(CurrencyParseError(raw.to_string()));
    }
    Ok(if negative { -amount } else { amount })
}

/// Renders an amount as whole dollars with thousands separators, rounding
/// half to even.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round_ties_even();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&format!("{:.0}", rounded.abs())))
}

pub fn normalize_currency(raw: &str) -> Result<String, CurrencyParseError> {
    parse_currency(raw).map(format_currency)
}

/// Guarantees a single trailing `%` without reparsing the number.
pub fn normalize_percent(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    format!("{bare}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
