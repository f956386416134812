//! HTTP handlers for bookings.

use crate::{
    errors::AppError,
    models::booking::BookingInput,
    services::booking_service::BookingService,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

/// GET `/bookings/user/{email}`
pub async fn bookings_for_user(
    State(service): State<BookingService>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = service
        .bookings_for_user(&email)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to fetch bookings"))?;

    Ok(Json(json!({
        "success": true,
        "count": bookings.len(),
        "bookings": bookings,
    })))
}

/// POST `/bookings` - book an available car.
pub async fn create_booking(
    State(service): State<BookingService>,
    payload: Result<Json<BookingInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let booking = service
        .create_booking(input)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to create booking"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Booking created successfully",
            "bookingId": booking.id,
        })),
    ))
}

/// DELETE `/bookings/{id}` - cancel and release the car.
pub async fn cancel_booking(
    State(service): State<BookingService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    service
        .cancel_booking(&id)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to cancel booking"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled successfully",
    })))
}
