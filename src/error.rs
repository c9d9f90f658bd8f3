use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the booking form and its collaborators
#[derive(Debug, Clone, Error)]
pub enum BookingError {
    #[error("intake endpoint is not configured")]
    IntakeNotConfigured,

    #[error("intake transport failed: {0}")]
    Transport(String),

    #[error("a submission is already in flight for this form")]
    SubmissionInFlight,

    #[error("form session not found: {0}")]
    SessionNotFound(String),

    #[error("too many live forms (limit {0})")]
    TooManyForms(usize),

    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("failed to load content: {0}")]
    Content(String),
}

impl From<BookingError> for StatusCode {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SubmissionInFlight => StatusCode::CONFLICT,
            BookingError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            BookingError::UnknownField(_) => StatusCode::BAD_REQUEST,
            BookingError::TooManyForms(_) => StatusCode::SERVICE_UNAVAILABLE,
            BookingError::IntakeNotConfigured
            | BookingError::Transport(_)
            | BookingError::Content(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
