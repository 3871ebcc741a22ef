use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Outside working hours: {0}")]
    OutOfHours(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// Transient failures the caller may retry; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Unavailable(_))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
