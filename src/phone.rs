//! Normalization and validation of Kyrgyz phone numbers submitted through
//! the lead forms.
//!
//! Phone input is free text typed by site visitors. It goes through two
//! stages before it may be stored:
//!
//! 1. [`normalize_kg_phone`] reshapes the input into a `+996...` candidate
//!    using a fixed set of prefix rules.
//! 2. [`validate_kg_phone`] parses the candidate with libphonenumber metadata,
//!    requires a valid (assignable) number in country code 996, and returns
//!    the international display form, e.g. `+996 700 123 456`.
//!
//! [`canonicalize_kg_phone`] runs both stages.

use phonenumber::{Mode, ParseError};
use std::fmt;

/// Country calling code of Kyrgyzstan.
pub const KG_COUNTRY_CODE: u16 = 996;

const KG_PREFIX: &str = "+996";

/// Format shown to users when their input is rejected.
pub const EXPECTED_FORMAT: &str = "+996 XXX XXX XXX";

/// Why a phone number was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input matches none of the normalization rules.
    Format { input: String },
    /// The normalized candidate could not be parsed as a phone number.
    Parse { candidate: String, reason: String },
    /// The candidate parsed but is not an assignable number in country 996.
    Validation { candidate: String },
}

impl fmt::Display for PhoneError {
    /// User-facing message; the offending input is kept out of it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneError::Format { .. } | PhoneError::Parse { .. } => {
                write!(f, "Invalid phone number format. Use {}", EXPECTED_FORMAT)
            }
            PhoneError::Validation { .. } => {
                write!(f, "Invalid Kyrgyz phone number. Expected {}", EXPECTED_FORMAT)
            }
        }
    }
}

impl std::error::Error for PhoneError {}

/// First code points of the decimal digit blocks accepted in phone input.
///
/// ASCII, Arabic-Indic, Extended Arabic-Indic (Persian/Urdu keyboards),
/// Devanagari, Bengali, Thai, Myanmar, Mongolian and fullwidth forms.
const DIGIT_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x0966, 0x09E6, 0x0E50, 0x1040, 0x1810, 0xFF10,
];

/// ASCII form of a decimal digit from any block in [`DIGIT_ZEROS`].
fn decimal_digit(c: char) -> Option<char> {
    let code = u32::from(c);
    DIGIT_ZEROS
        .iter()
        .find(|zero| (**zero..**zero + 10).contains(&code))
        .and_then(|zero| char::from_digit(code - zero, 10))
}

/// Reshape a user-typed phone string into a `+996` candidate.
///
/// Decimal digits from other scripts (e.g. `٧`) are mapped to ASCII,
/// everything except digits and `+` is stripped, then the first matching rule
/// applies:
///
/// | cleaned input                  | result              |
/// |--------------------------------|---------------------|
/// | starts with `+996`             | unchanged           |
/// | starts with `996`              | `+` prepended       |
/// | starts with `0`, length >= 10  | `0` -> `+996`       |
/// | starts with `7`, length == 9   | `+996` prepended    |
///
/// Anything else is a [`PhoneError::Format`]. The result is only a
/// candidate; it still has to pass [`validate_kg_phone`].
pub fn normalize_kg_phone(raw: &str) -> Result<String, PhoneError> {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| match c {
            '+' => Some('+'),
            _ => decimal_digit(c),
        })
        .collect();

    if cleaned.starts_with(KG_PREFIX) {
        Ok(cleaned)
    } else if cleaned.starts_with(&KG_PREFIX[1..]) {
        Ok(format!("+{}", cleaned))
    } else if cleaned.starts_with('0') && cleaned.len() >= 10 {
        Ok(format!("{}{}", KG_PREFIX, &cleaned[1..]))
    } else if cleaned.starts_with('7') && cleaned.len() == 9 {
        Ok(format!("{}{}", KG_PREFIX, cleaned))
    } else {
        tracing::debug!("Phone '{}' matches no normalization rule", raw);
        Err(PhoneError::Format {
            input: raw.to_string(),
        })
    }
}

/// Confirm a normalized candidate is a real Kyrgyz number and return its
/// international display form.
///
/// No default region is assumed, so the leading `+996` is what selects the
/// country. Numbers with the right shape but outside any assigned range are
/// rejected.
pub fn validate_kg_phone(candidate: &str) -> Result<String, PhoneError> {
    let number = phonenumber::parse(None, candidate).map_err(|e| {
        // An all-zero national number has the right shape but no integer value
        if matches!(e, ParseError::MalformedInteger(_)) && is_kg_digit_string(candidate) {
            tracing::warn!("❌ Invalid KG phone number: {}", candidate);
            return PhoneError::Validation {
                candidate: candidate.to_string(),
            };
        }
        tracing::warn!("❌ Failed to parse phone candidate '{}': {:?}", candidate, e);
        PhoneError::Parse {
            candidate: candidate.to_string(),
            reason: format!("{:?}", e),
        }
    })?;

    if number.code().value() != KG_COUNTRY_CODE || !phonenumber::is_valid(&number) {
        tracing::warn!("❌ Invalid KG phone number: {}", candidate);
        return Err(PhoneError::Validation {
            candidate: candidate.to_string(),
        });
    }

    let formatted = number.format().mode(Mode::International).to_string();
    tracing::debug!("✓ Valid KG phone: {} → {}", candidate, formatted);
    Ok(formatted)
}

/// `+996` followed by at least one digit and nothing else.
fn is_kg_digit_string(candidate: &str) -> bool {
    candidate
        .strip_prefix(KG_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Normalize then validate; the value a lead is stored with.
pub fn canonicalize_kg_phone(raw: &str) -> Result<String, PhoneError> {
    let candidate = normalize_kg_phone(raw)?;
    validate_kg_phone(&candidate)
}
