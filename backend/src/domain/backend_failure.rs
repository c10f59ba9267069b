//! Default translation of [`BackendError`] into domain [`Error`]s.
//!
//! Services override individual variants where an operation gives a failure
//! a more specific meaning (for example a missing profile table during
//! provisioning) and fall back to [`map_backend_error`] for the rest.

use serde_json::json;
use tracing::{error, warn};

use crate::domain::Error;
use crate::domain::ports::BackendError;

/// Map a hosted backend failure onto the domain error taxonomy.
pub(crate) fn map_backend_error(failure: BackendError) -> Error {
    match failure {
        BackendError::NotFound => Error::not_found("resource not found"),
        BackendError::UniqueViolation { message } => Error::conflict("resource already exists")
            .with_details(json!({ "code": "unique_violation", "reason": message })),
        BackendError::ForeignKeyViolation { message } => foreign_key_violation(&message),
        BackendError::MissingTable { message } => {
            error!(reason = %message, "hosted backend table missing");
            Error::internal(format!("table does not exist: {message}"))
                .with_details(json!({ "code": "missing_table" }))
        }
        BackendError::Unauthorized { message } => {
            Error::unauthorized("session rejected by the hosted backend")
                .with_details(json!({ "code": "session_rejected", "reason": message }))
        }
        failure @ (BackendError::Timeout { .. } | BackendError::Transport { .. }) => {
            warn!(error = %failure, "hosted backend unavailable");
            backend_unavailable()
        }
        BackendError::Rejected { message } => {
            Error::invalid_request(format!("hosted backend rejected the request: {message}"))
        }
        BackendError::Decode { message } => {
            error!(reason = %message, "hosted backend response could not be decoded");
            Error::internal(format!("unexpected hosted backend response: {message}"))
        }
    }
}

/// Error returned when the hosted backend cannot be reached.
pub(crate) fn backend_unavailable() -> Error {
    Error::service_unavailable("hosted backend unavailable")
        .with_details(json!({ "code": "backend_unavailable" }))
}

/// Error returned when a post references a profile that does not exist.
pub(crate) fn foreign_key_violation(reason: &str) -> Error {
    Error::invalid_request("Foreign key constraint violated").with_details(json!({
        "code": "foreign_key_violation",
        "hint": "Make sure you have created a profile for your user before creating a post.",
        "reason": reason,
    }))
}
