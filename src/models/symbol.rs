use std::sync::LazyLock;

use regex::Regex;

use crate::error::ServiceError;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").expect("symbol pattern"));

/// Upper-cases and trims a ticker, rejecting anything that does not look like one.
pub fn normalize_symbol(raw: &str) -> Result<String, ServiceError> {
    let sym = raw.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ServiceError::validation("symbol is required"));
    }
    if !SYMBOL_RE.is_match(&sym) {
        return Err(ServiceError::validation(format!("invalid symbol '{sym}'")));
    }
    Ok(sym)
}

/// Parses a user-supplied price or quantity; must be finite and positive.
pub fn parse_positive(raw: &str, what: &str) -> Result<f64, ServiceError> {
    let value: f64 = raw
        .trim()
        .trim_start_matches('$')
        .parse()
        .map_err(|_| ServiceError::validation(format!("{what} must be a number")))?;
    ensure_positive(value, what)
}

pub fn ensure_positive(value: f64, what: &str) -> Result<f64, ServiceError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ServiceError::validation(format!(
            "{what} must be a positive number"
        )));
    }
    Ok(value)
}
