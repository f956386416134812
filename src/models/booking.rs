//! Represents a confirmed reservation linking a user to a car.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use super::car::Car;

/// Keys that are always derived from the car or stamped by the service.
const RESERVED_KEYS: [&str; 7] = [
    "id",
    "_id",
    "carName",
    "carImage",
    "price",
    "status",
    "createdAt",
];

#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

/// A booking row. Car name, image and price are a snapshot taken at booking
/// time and do not follow later edits to the car.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,

    pub car_id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    pub status: BookingStatus,

    pub created_at: DateTime<Utc>,

    /// Caller-supplied fields (rental dates, phone, ...) kept verbatim.
    #[sqlx(json)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for booking creation.
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub car_id: Option<String>,
    pub user_email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    /// Snapshot `car` into a new confirmed booking carrying the caller's fields.
    pub fn for_car(car: &Car, input: BookingInput) -> Self {
        let mut extra = input.extra;
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        Self {
            id: Uuid::new_v4(),
            car_id: car.id,
            car_name: car.name.clone(),
            car_image: car.image.clone(),
            price: car.price,
            user_email: input.user_email,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::car::CarInput;
    use serde_json::json;

    #[test]
    fn for_car_snapshots_car_and_overrides_caller_fields() {
        let car = Car::from_input(
            serde_json::from_value::<CarInput>(json!({
                "name": "Civic",
                "price": 50,
                "image": "civic.png"
            }))
            .unwrap(),
        );
        let input: BookingInput = serde_json::from_value(json!({
            "carId": car.id.to_string(),
            "userEmail": "a@x.com",
            "price": 1,
            "status": "pending",
            "startDate": "2026-11-01"
        }))
        .unwrap();

        let booking = Booking::for_car(&car, input);

        assert_eq!(booking.car_id, car.id);
        assert_eq!(booking.car_name.as_deref(), Some("Civic"));
        assert_eq!(booking.car_image.as_deref(), Some("civic.png"));
        assert_eq!(booking.price, Some(50.0));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.extra.get("startDate"), Some(&json!("2026-11-01")));
        assert!(!booking.extra.contains_key("price"));
        assert!(!booking.extra.contains_key("status"));
    }
}
