//! HTTP handlers for the car catalog. Each one delegates to `CarService`
//! and wraps the result in the `{success, ...}` JSON envelope.

use crate::{
    errors::AppError,
    models::car::CarInput,
    services::car_service::{CarService, CarSort, ListCarsParams},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

/// Query params accepted by `GET /cars`.
#[derive(Debug, Deserialize)]
pub struct ListCarsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl From<ListCarsQuery> for ListCarsParams {
    fn from(q: ListCarsQuery) -> Self {
        Self {
            sort: CarSort::from_query(q.sort.as_deref()),
            search: q.search,
            category: q.category,
        }
    }
}

/// GET `/cars` - list, search, filter and sort.
pub async fn list_cars(
    State(service): State<CarService>,
    Query(q): Query<ListCarsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cars = service
        .list_cars(&q.into())
        .await
        .map_err(|err| AppError::from_service(err, "Failed to fetch cars"))?;

    Ok(Json(json!({
        "success": true,
        "count": cars.len(),
        "cars": cars,
    })))
}

/// GET `/cars/featured` - the newest six cars.
pub async fn featured_cars(
    State(service): State<CarService>,
) -> Result<impl IntoResponse, AppError> {
    let cars = service
        .featured_cars()
        .await
        .map_err(|err| AppError::from_service(err, "Failed to fetch featured cars"))?;

    Ok(Json(json!({
        "success": true,
        "count": cars.len(),
        "cars": cars,
    })))
}

/// GET `/cars/user/{email}` - cars listed by one provider.
pub async fn cars_by_owner(
    State(service): State<CarService>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cars = service
        .cars_by_owner(&email)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to fetch user cars"))?;

    Ok(Json(json!({
        "success": true,
        "count": cars.len(),
        "cars": cars,
    })))
}

/// GET `/cars/{id}`
pub async fn get_car(
    State(service): State<CarService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let car = service
        .get_car(&id)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to fetch car"))?;

    Ok(Json(json!({ "success": true, "car": car })))
}

/// POST `/cars` - list a new car.
pub async fn create_car(
    State(service): State<CarService>,
    payload: Result<Json<CarInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let car = service
        .create_car(input)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to add car"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Car added successfully",
            "carId": car.id,
        })),
    ))
}

/// PUT `/cars/{id}` - partial update.
pub async fn update_car(
    State(service): State<CarService>,
    Path(id): Path<String>,
    payload: Result<Json<CarInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    service
        .update_car(&id, input)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to update car"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Car updated successfully",
    })))
}

/// DELETE `/cars/{id}`
pub async fn delete_car(
    State(service): State<CarService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    service
        .delete_car(&id)
        .await
        .map_err(|err| AppError::from_service(err, "Failed to delete car"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Car deleted successfully",
    })))
}
