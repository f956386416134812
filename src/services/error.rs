use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("car `{0}` not found")]
    CarNotFound(Uuid),
    #[error("booking `{0}` not found")]
    BookingNotFound(Uuid),
    #[error("car `{0}` is already booked")]
    CarAlreadyBooked(Uuid),
    #[error("car `{0}` has an active booking")]
    CarHasActiveBooking(Uuid),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Parse a path or body identifier. Malformed ids never reach the store.
pub fn parse_id(raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidIdentifier(raw.to_string()))
}
