// src/entity/number.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchased phone number and what it is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedNumber {
    pub id: i64,
    #[serde(alias = "number")]
    pub phone_number: String,
    #[serde(default)]
    pub client: Option<i64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub agent: Option<i64>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /purchase_number/{id}/`.
///
/// Outer `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Option<i64>>,
}
