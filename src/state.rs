//! Shared application state handed to every handler.

use crate::services::{booking_service::BookingService, car_service::CarService};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

/// One pool for the process, shared by both services.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub cars: CarService,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            cars: CarService::new(db.clone()),
            bookings: BookingService::new(db.clone()),
            db,
        }
    }
}

impl FromRef<AppState> for CarService {
    fn from_ref(state: &AppState) -> Self {
        state.cars.clone()
    }
}

impl FromRef<AppState> for BookingService {
    fn from_ref(state: &AppState) -> Self {
        state.bookings.clone()
    }
}
