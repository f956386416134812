pub mod booking_handlers;
pub mod car_handlers;
pub mod health_handlers;
