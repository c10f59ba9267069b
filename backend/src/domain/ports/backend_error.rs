//! Closed set of failures reported by hosted backend adapters.
//!
//! Adapters translate vendor status codes and error payloads into these
//! variants exactly once, so services never match on opaque strings.

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by the hosted authentication and database ports.
    pub enum BackendError {
        /// A single-row lookup or mutation matched nothing.
        NotFound => "hosted backend found no matching row",
        /// A uniqueness constraint rejected the write.
        UniqueViolation { message: String } =>
            "hosted backend unique constraint violated: {message}",
        /// A foreign-key constraint rejected the write.
        ForeignKeyViolation { message: String } =>
            "hosted backend foreign key constraint violated: {message}",
        /// The target table has not been provisioned.
        MissingTable { message: String } =>
            "hosted backend table does not exist: {message}",
        /// The bearer token or credentials were rejected.
        Unauthorized { message: String } =>
            "hosted backend rejected credentials: {message}",
        /// The call exceeded the configured timeout.
        Timeout { message: String } =>
            "hosted backend timed out: {message}",
        /// The network call failed or the backend reported a server fault.
        Transport { message: String } =>
            "hosted backend transport failed: {message}",
        /// The backend refused the request for another client-side reason.
        Rejected { message: String } =>
            "hosted backend rejected request: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "hosted backend response decode failed: {message}",
    }
}

impl BackendError {
    /// Whether the failure means the backend could not be reached at all.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::ports::BackendError;
    ///
    /// assert!(BackendError::timeout("10s elapsed").is_unavailable());
    /// assert!(!BackendError::not_found().is_unavailable());
    /// ```
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
