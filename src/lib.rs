//! GariWala: car rental marketplace backend.
//!
//! Two services over one SQLite store: the car catalog and bookings.
//! Booking a car marks it `booked`; cancelling releases it again.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
