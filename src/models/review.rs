// src/models/review.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{Document, StoreError};

/// A persisted review, as returned to callers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,                // Assigned by the store on append
    pub tour_id: String,           // Opaque tour key, never checked for existence
    pub email: String,             // Reviewer email, not format-checked
    pub text: String,              // Free-text comment
    pub rating: f64,               // Coerced numeric rating
    pub created_at: DateTime<Utc>, // Assigned by the store on append
}

/// A validated review that has not been persisted yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub tour_id: String,
    pub email: String,
    pub text: String,
    pub rating: f64,
}

impl NewReview {
    /// Document body as written to the store.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("tourId".into(), Value::from(self.tour_id.as_str()));
        record.insert("email".into(), Value::from(self.email.as_str()));
        record.insert("text".into(), Value::from(self.text.as_str()));
        record.insert("rating".into(), Value::from(self.rating));
        record
    }

    pub fn into_review(self, id: String, created_at: DateTime<Utc>) -> Review {
        Review {
            id,
            tour_id: self.tour_id,
            email: self.email,
            text: self.text,
            rating: self.rating,
            created_at,
        }
    }
}

impl TryFrom<Document> for Review {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let body: NewReview = serde_json::from_value(Value::Object(doc.data)).map_err(|e| {
            StoreError::Corrupt {
                id: doc.id.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(body.into_review(doc.id, doc.created_at))
    }
}

/// Raw submission body. Every field is optional so that absence can be
/// reported as a validation failure instead of a payload error.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ReviewSubmission {
    pub email: Option<Value>,
    pub text: Option<String>,
    pub rating: Option<Value>,
}

/// Rating summary for one tour.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub reviews: Vec<Review>,
}

impl ReviewSummary {
    pub fn empty() -> Self {
        ReviewSummary {
            average_rating: 0.0,
            reviews: Vec::new(),
        }
    }
}

/// Response body for a successful submission.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatedReview {
    pub message: String,
    pub review: Review,
}
