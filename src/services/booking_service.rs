//! BookingService: reservations over the `bookings` table.
//!
//! Creating or cancelling a booking also flips the referenced car's status.
//! Both writes run inside one `BEGIN IMMEDIATE` transaction, and the car is
//! claimed with a conditional update so two concurrent bookings cannot both
//! succeed. Losers see `CarAlreadyBooked`, never a lock error.

use crate::{
    db,
    models::{
        booking::{Booking, BookingInput},
        car::{Car, CarStatus},
    },
    services::{
        car_service::CAR_COLUMNS,
        error::{ServiceError, ServiceResult, parse_id},
    },
};
use sqlx::{SqlitePool, types::Json};
use std::sync::Arc;
use tracing::{debug, info, warn};

const BOOKING_COLUMNS: &str =
    "id, car_id, car_name, car_image, price, user_email, status, extra, created_at";

#[derive(Clone)]
pub struct BookingService {
    pub db: Arc<SqlitePool>,
}

impl BookingService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Bookings made by `email`, newest first.
    pub async fn bookings_for_user(&self, email: &str) -> ServiceResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_email = ? \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(email)
        .fetch_all(&*self.db)
        .await?;
        Ok(bookings)
    }

    /// Book a car.
    ///
    /// 1. Claim the car: `available -> booked`. When nothing matched, fail
    ///    with `CarNotFound` or `CarAlreadyBooked`.
    /// 2. Persist the booking with a snapshot of the car's name, image and price.
    ///
    /// Nothing is written unless every step succeeds.
    pub async fn create_booking(&self, input: BookingInput) -> ServiceResult<Booking> {
        let raw_car_id = input
            .car_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ServiceError::InvalidPayload("carId is required".into()))?;
        let car_id = parse_id(raw_car_id)?;

        let mut tx = db::begin_write(&self.db).await?;

        let claimed = sqlx::query("UPDATE cars SET status = ? WHERE id = ? AND status = ?")
            .bind(CarStatus::Booked)
            .bind(car_id)
            .bind(CarStatus::Available)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cars WHERE id = ?)")
                    .bind(car_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(ServiceError::CarNotFound(car_id));
            }
            warn!(car_id = %car_id, "car is already booked");
            return Err(ServiceError::CarAlreadyBooked(car_id));
        }

        let car =
            sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?"))
                .bind(car_id)
                .fetch_one(&mut *tx)
                .await?;

        let booking = Booking::for_car(&car, input);
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(&booking.car_name)
        .bind(&booking.car_image)
        .bind(booking.price)
        .bind(&booking.user_email)
        .bind(booking.status)
        .bind(Json(&booking.extra))
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            booking_id = %booking.id,
            car_id = %car_id,
            user = ?booking.user_email,
            "booking confirmed"
        );
        Ok(booking)
    }

    /// Cancel a booking and release its car.
    pub async fn cancel_booking(&self, raw_id: &str) -> ServiceResult<Booking> {
        let id = parse_id(raw_id)?;
        let mut tx = db::begin_write(&self.db).await?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::BookingNotFound(id))?;

        sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let released = sqlx::query("UPDATE cars SET status = ? WHERE id = ?")
            .bind(CarStatus::Available)
            .bind(booking.car_id)
            .execute(&mut *tx)
            .await?;
        if released.rows_affected() == 0 {
            debug!(car_id = %booking.car_id, "booked car no longer exists");
        }

        tx.commit().await?;
        info!(booking_id = %id, car_id = %booking.car_id, "booking cancelled");
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::car::CarInput, services::car_service::CarService};
    use serde_json::{Value, json};
    use uuid::Uuid;

    async fn services() -> (CarService, BookingService) {
        let pool = db::connect("sqlite::memory:", 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let pool = Arc::new(pool);
        (CarService::new(pool.clone()), BookingService::new(pool))
    }

    async fn civic(cars: &CarService) -> Car {
        let input: CarInput = serde_json::from_value(json!({
            "name": "Civic",
            "category": "sedan",
            "price": 50,
            "image": "civic.png"
        }))
        .unwrap();
        cars.create_car(input).await.unwrap()
    }

    fn booking_input(value: Value) -> BookingInput {
        serde_json::from_value(value).unwrap()
    }

    async fn booking_count(bookings: &BookingService) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&*bookings.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn booking_flips_car_and_cancel_releases_it() {
        let (cars, bookings) = services().await;
        let car = civic(&cars).await;

        let booking = bookings
            .create_booking(booking_input(json!({
                "carId": car.id.to_string(),
                "userEmail": "a@x.com"
            })))
            .await
            .unwrap();
        assert_eq!(booking.car_name.as_deref(), Some("Civic"));
        assert_eq!(booking.price, Some(50.0));
        assert_eq!(
            cars.get_car(&car.id.to_string()).await.unwrap().status,
            CarStatus::Booked
        );

        bookings
            .cancel_booking(&booking.id.to_string())
            .await
            .unwrap();
        assert_eq!(
            cars.get_car(&car.id.to_string()).await.unwrap().status,
            CarStatus::Available
        );
        assert_eq!(booking_count(&bookings).await, 0);
    }

    #[tokio::test]
    async fn second_booking_conflicts_without_writing() {
        let (cars, bookings) = services().await;
        let car = civic(&cars).await;
        let body = json!({ "carId": car.id.to_string(), "userEmail": "a@x.com" });

        bookings
            .create_booking(booking_input(body.clone()))
            .await
            .unwrap();
        let err = bookings
            .create_booking(booking_input(body))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::CarAlreadyBooked(id) if id == car.id));
        assert_eq!(booking_count(&bookings).await, 1);
    }

    #[tokio::test]
    async fn booking_unknown_car_is_not_found() {
        let (_cars, bookings) = services().await;
        let err = bookings
            .create_booking(booking_input(json!({ "carId": Uuid::new_v4().to_string() })))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::CarNotFound(_)));
        assert_eq!(booking_count(&bookings).await, 0);
    }

    #[tokio::test]
    async fn booking_requires_well_formed_car_id() {
        let (_cars, bookings) = services().await;

        assert!(matches!(
            bookings.create_booking(booking_input(json!({}))).await,
            Err(ServiceError::InvalidPayload(_))
        ));
        assert!(matches!(
            bookings
                .create_booking(booking_input(json!({ "carId": "12345" })))
                .await,
            Err(ServiceError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_survives_car_edits() {
        let (cars, bookings) = services().await;
        let car = civic(&cars).await;
        bookings
            .create_booking(booking_input(json!({
                "carId": car.id.to_string(),
                "userEmail": "a@x.com",
                "startDate": "2026-11-01"
            })))
            .await
            .unwrap();

        let edit: CarInput =
            serde_json::from_value(json!({ "name": "Civic Type R", "price": 80 })).unwrap();
        cars.update_car(&car.id.to_string(), edit).await.unwrap();

        let listed = bookings.bookings_for_user("a@x.com").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].car_name.as_deref(), Some("Civic"));
        assert_eq!(listed[0].price, Some(50.0));
        assert_eq!(listed[0].extra.get("startDate"), Some(&json!("2026-11-01")));
        assert!(bookings.bookings_for_user("b@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_unknown_or_malformed_booking() {
        let (_cars, bookings) = services().await;

        assert!(matches!(
            bookings.cancel_booking("nope").await,
            Err(ServiceError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            bookings.cancel_booking(&Uuid::new_v4().to_string()).await,
            Err(ServiceError::BookingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn booked_car_cannot_be_deleted() {
        let (cars, bookings) = services().await;
        let car = civic(&cars).await;
        let booking = bookings
            .create_booking(booking_input(json!({ "carId": car.id.to_string() })))
            .await
            .unwrap();

        assert!(matches!(
            cars.delete_car(&car.id.to_string()).await,
            Err(ServiceError::CarHasActiveBooking(_))
        ));

        bookings
            .cancel_booking(&booking.id.to_string())
            .await
            .unwrap();
        cars.delete_car(&car.id.to_string()).await.unwrap();
    }
}
