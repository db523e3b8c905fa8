//! Field validation for request payloads.
//!
//! Regex validators mirroring the character classes the CRM accepts, each
//! with its fixed French message. Handlers collect failures per field into a
//! [`FieldErrors`] map that becomes the `details` object of a 400 response.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

pub const ALPHA_MESSAGE: &str =
    "La saisie doit comporter uniquement des caractères alphabétiques avec apostrophe, tiret et espace.";
pub const CHARFIELD_MESSAGE: &str =
    "La saisie doit comporter uniquement des caractères alphanumériques, apostrophe, tiret, @, point, espace.";
pub const DIGITS_MESSAGE: &str =
    "La saisie doit comporter uniquement des caractères numériques.";
pub const TEXTFIELD_MESSAGE: &str = "La saisie ne doit pas comporter de caractères spéciaux.";
pub const EMAIL_MESSAGE: &str = "Saisissez une adresse de courriel valide.";
pub const PHONE_MESSAGE: &str = "Le numéro saisi n'est pas valide.";
pub const REQUIRED_MESSAGE: &str = "Ce champ est obligatoire.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Password fields didn't match.";

static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ'\- ]+$").expect("valid alpha regex"));
static CHARFIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\da-zA-ZÀ-ÿ'@.\- ]+$").expect("valid charfield regex"));
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid digits regex"));
static TEXTFIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^<>&~`;%=\n\r\t\$\\\|/\{\}\[\]\+\*]*$").expect("valid textfield regex")
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 .\-]{5,19}$").expect("valid phone regex"));

/// Letters (including accented), apostrophe, hyphen, space.
pub fn validate_alpha(value: &str) -> Result<(), &'static str> {
    if ALPHA_RE.is_match(value) {
        Ok(())
    } else {
        Err(ALPHA_MESSAGE)
    }
}

/// Alphanumeric plus apostrophe, hyphen, `@`, dot, space.
pub fn validate_charfield(value: &str) -> Result<(), &'static str> {
    if CHARFIELD_RE.is_match(value) {
        Ok(())
    } else {
        Err(CHARFIELD_MESSAGE)
    }
}

/// Digits only.
pub fn validate_digits(value: &str) -> Result<(), &'static str> {
    if DIGITS_RE.is_match(value) {
        Ok(())
    } else {
        Err(DIGITS_MESSAGE)
    }
}

/// Free text, rejecting markup and shell metacharacters.
pub fn validate_textfield(value: &str) -> Result<(), &'static str> {
    if TEXTFIELD_RE.is_match(value) {
        Ok(())
    } else {
        Err(TEXTFIELD_MESSAGE)
    }
}

pub fn validate_email(value: &str) -> Result<(), &'static str> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(EMAIL_MESSAGE)
    }
}

pub fn validate_phone(value: &str) -> Result<(), &'static str> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(PHONE_MESSAGE)
    }
}

/// Exactly nine digits.
pub fn validate_siren(value: &str) -> Result<(), &'static str> {
    validate_digits(value)?;
    if value.len() == 9 {
        Ok(())
    } else {
        Err(DIGITS_MESSAGE)
    }
}

/// Exactly five digits.
pub fn validate_zip_code(value: &str) -> Result<(), &'static str> {
    validate_digits(value)?;
    if value.len() == 5 {
        Ok(())
    } else {
        Err(DIGITS_MESSAGE)
    }
}

/// Per-field error accumulator.
///
/// Collects every failed check so a single 400 response reports all invalid
/// fields at once, the way the original API did.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: Map<String, Value>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a single field check.
    pub fn check(&mut self, field: &str, result: Result<(), &'static str>) {
        if let Err(message) = result {
            self.push(field, message);
        }
    }

    /// Record an error message for a field.
    pub fn push(&mut self, field: &str, message: &str) {
        let entry = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finish validation: `Err` with the field→messages map if anything failed.
    pub fn into_result(self) -> Result<(), serde_json::Value> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Value::Object(self.fields))
        }
    }
}
