//! Submission checks run before anything is written to the store.
use serde_json::Value;
use thiserror::Error;

use crate::models::review::{NewReview, ReviewSubmission};

/// Words rejected by the content policy, matched as lowercase substrings.
const DEFAULT_FORBIDDEN_WORDS: &[&str] = &[
    "жах", "обман", "шахраї", "погано", "horror", "scam", "scammers", "bad",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Text, rating and email are required (missing: {})", .0.join(", "))]
    MissingField(Vec<&'static str>),

    #[error("Your review contains forbidden words and cannot be published.")]
    ForbiddenContent,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "MISSING_FIELD",
            ValidationError::ForbiddenContent => "FORBIDDEN_CONTENT",
        }
    }
}

/// Immutable list of forbidden substrings, built once at startup and shared
/// read-only between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Denylist {
    words: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Denylist { words }
    }

    /// Case-insensitive substring match, so "bad" also hits "BADly".
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.words.iter().any(|w| lowered.contains(w.as_str()))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Denylist::new(DEFAULT_FORBIDDEN_WORDS)
    }
}

/// Checks a submission for `tour_id` and returns the record to persist.
///
/// Required fields use truthiness: an empty string, a zero rating, `false`
/// and `null` all count as missing. A rating of `0` is therefore rejected,
/// while the string `"0"` passes and is stored as 0. A present email that is
/// not a string (say `123`) is kept in its text form.
pub fn validate(
    tour_id: &str,
    submission: &ReviewSubmission,
    denylist: &Denylist,
) -> Result<NewReview, ValidationError> {
    let text = submission.text.as_deref().filter(|t| !t.is_empty());
    let rating = submission.rating.as_ref().filter(|r| is_truthy(r));
    let email = submission.email.as_ref().filter(|e| is_truthy(e));

    let (text, rating, email) = match (text, rating, email) {
        (Some(text), Some(rating), Some(email)) => (text, rating, email),
        (text, rating, email) => {
            let mut missing = Vec::new();
            if text.is_none() {
                missing.push("text");
            }
            if rating.is_none() {
                missing.push("rating");
            }
            if email.is_none() {
                missing.push("email");
            }
            return Err(ValidationError::MissingField(missing));
        }
    };

    if denylist.matches(text) {
        return Err(ValidationError::ForbiddenContent);
    }

    Ok(NewReview {
        tour_id: tour_id.to_string(),
        email: stringify(email),
        text: text.to_string(),
        rating: coerce_rating(rating),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric coercion of a present rating. Booleans, decimal and `0x`/`0o`/`0b`
/// strings and single-element arrays follow the usual loose number rules.
/// Anything without a finite numeric reading (including infinities) becomes 0.
pub fn coerce_rating(value: &Value) -> f64 {
    let coerced = match value {
        Value::Bool(true) => 1.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [Value::Number(n)] => n.as_f64().unwrap_or(0.0),
            [Value::String(s)] => parse_numeric(s),
            [nested @ Value::Array(_)] => coerce_rating(nested),
            _ => 0.0,
        },
        _ => 0.0,
    };

    if coerced.is_finite() {
        coerced
    } else {
        0.0
    }
}

fn parse_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    match radix {
        Some(radix) => u64::from_str_radix(&trimmed[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(0.0),
        None => trimmed.parse::<f64>().unwrap_or(0.0),
    }
}
