//! Represents a rentable car listing owned by a provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Rating stamped on every newly listed car.
pub const DEFAULT_RATING: f64 = 4.5;

/// Keys a caller may never set through the free-form field set.
const RESERVED_KEYS: [&str; 4] = ["id", "_id", "createdAt", "updatedAt"];

/// Availability of a car. `Booked` while exactly one active booking references it.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Booked,
}

/// A car listing as stored in the `cars` table.
///
/// Known attributes live in typed columns; anything else the provider sent is
/// kept verbatim in `extra` and flattened back into the JSON representation.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Rental price per period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    pub rating: f64,

    pub status: CarStatus,

    /// Owner identity. Immutable once the car is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_email: Option<String>,

    /// Immutable once the car is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[sqlx(json)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Field set accepted by car creation and update.
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CarInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub status: Option<CarStatus>,
    pub provider_email: Option<String>,
    pub provider_name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CarInput {
    /// Free-form fields with identity and timestamp keys removed.
    pub fn free_fields(&self) -> Map<String, Value> {
        let mut extra = self.extra.clone();
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        extra
    }
}

impl Car {
    /// Build a fresh listing from caller input. Status, rating and creation
    /// time are always ours to set.
    pub fn from_input(input: CarInput) -> Self {
        let extra = input.free_fields();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            price: input.price,
            rating: DEFAULT_RATING,
            status: CarStatus::Available,
            provider_email: input.provider_email,
            provider_name: input.provider_name,
            image: input.image,
            description: input.description,
            created_at: Utc::now(),
            updated_at: None,
            extra,
        }
    }
}
