//! Core data models for the car rental marketplace.
//!
//! These entities map to database tables via `sqlx::FromRow` and serialize
//! as JSON via `serde`. Fields the models do not know about are carried
//! verbatim in a JSON `extra` column.

pub mod booking;
pub mod car;
