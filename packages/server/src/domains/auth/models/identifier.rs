use lazy_static::lazy_static;
use regex::Regex;

use crate::domains::auth::errors::PhoneError;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[\s\-.()]").expect("separator regex is valid");
}

/// Login identifier as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    /// E.164 phone number
    Phone(String),
}

impl LoginIdentifier {
    /// Anything containing `@` is an email; everything else must normalize as a phone
    pub fn parse(raw: &str, country_code: &str) -> Result<Self, PhoneError> {
        if raw.contains('@') {
            Ok(LoginIdentifier::Email(normalize_email(raw)))
        } else {
            normalize_phone(raw, country_code).map(LoginIdentifier::Phone)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LoginIdentifier::Email(email) => email,
            LoginIdentifier::Phone(phone) => phone,
        }
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize a phone number to E.164
///
/// - `+...` is taken as already international: separators are dropped and
///   the rest must be 1 to 15 digits, so well-formed E.164 comes back unchanged
/// - 8 local digits get `+<country_code>` prepended
/// - `<country_code>` + 8 digits (optionally written `00<country_code>...`) get `+` prepended
pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String, PhoneError> {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('+') {
        let digits = SEPARATORS.replace_all(rest, "");
        if is_digits(&digits) && digits.len() <= E164_MAX_DIGITS {
            return Ok(format!("+{}", digits));
        }
        return Err(PhoneError::InvalidFormat(raw.to_string()));
    }

    let cleaned = SEPARATORS.replace_all(trimmed, "");
    let digits: &str = &cleaned;

    if !is_digits(digits) {
        return Err(PhoneError::InvalidFormat(raw.to_string()));
    }

    if digits.len() == 8 {
        return Ok(format!("+{}{}", country_code, digits));
    }

    let digits = digits.strip_prefix("00").unwrap_or(digits);
    match digits.strip_prefix(country_code) {
        Some(local) if local.len() == 8 => Ok(format!("+{}", digits)),
        _ => Err(PhoneError::InvalidFormat(raw.to_string())),
    }
}

const E164_MAX_DIGITS: usize = 15;

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Forms a number may have been stored in by older sign-up flows:
/// full E.164, E.164 without `+`, and the bare local number.
///
/// Forms without any digit are never produced.
pub fn phone_variants(e164: &str, country_code: &str) -> Vec<String> {
    let mut variants = vec![e164.to_string()];

    let without_plus = e164.trim_start_matches('+');
    variants.push(without_plus.to_string());

    if let Some(local) = without_plus.strip_prefix(country_code) {
        if !local.is_empty() {
            variants.push(local.to_string());
        }
    }

    variants.retain(|v| is_digits(v.strip_prefix('+').unwrap_or(v.as_str())));
    variants.dedup();
    variants
}
