pub mod booking_service;
pub mod car_service;
pub mod error;
