//! Defines routes for the car catalog and booking endpoints.
//!
//! ## Structure
//! - **Car endpoints**
//!   - `GET    /cars`               - list (supports search, category, sort)
//!   - `POST   /cars`               - create car
//!   - `GET    /cars/featured`      - six newest cars
//!   - `GET    /cars/user/{email}`  - cars listed by a provider
//!   - `GET    /cars/{id}`          - single car
//!   - `PUT    /cars/{id}`          - partial update
//!   - `DELETE /cars/{id}`          - delete car
//!
//! - **Booking endpoints**
//!   - `POST   /bookings`              - book a car
//!   - `GET    /bookings/user/{email}` - a user's bookings
//!   - `DELETE /bookings/{id}`         - cancel booking
//!
//! Static segments (`featured`, `user`) win over `{id}` captures.

use crate::{
    handlers::{
        booking_handlers::{bookings_for_user, cancel_booking, create_booking},
        car_handlers::{
            cars_by_owner, create_car, delete_car, featured_cars, get_car, list_cars, update_car,
        },
        health_handlers::{healthz, index, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build and return the router for all API routes.
///
/// The router carries shared state (`AppState`) to all handlers; handlers
/// pull the service they need out of it via `FromRef`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Car routes
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/featured", get(featured_cars))
        .route("/cars/user/{email}", get(cars_by_owner))
        .route(
            "/cars/{id}",
            get(get_car).put(update_car).delete(delete_car),
        )
        // Booking routes
        .route("/bookings", post(create_booking))
        .route("/bookings/user/{email}", get(bookings_for_user))
        .route("/bookings/{id}", delete(cancel_booking))
}

/// CORS policy for the browser client. Only the configured origins are
/// allowed, with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring invalid CORS origin `{}`: {}", origin, err);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
