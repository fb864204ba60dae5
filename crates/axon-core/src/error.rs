use http::StatusCode;

/// Trait for domain errors that map onto HTTP responses
///
/// Each feature crate implements this for its error type so the server
/// layer can build wire responses without the domain crates depending
/// on axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
