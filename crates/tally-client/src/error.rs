//! Client error types.

/// Errors that can occur when talking to the billing API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing or malformed credentials at setup time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server rejected the request with a non-2xx status.
    ///
    /// `message` comes from the response body's `message` field when present,
    /// else `"request failed with status N"`. It never contains the
    /// configured public key or customer token.
    #[error("request failed with status {status}: {message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Sanitized server message.
        message: String,
    },

    /// The HTTP layer failed before a well-formed response was delivered
    /// (DNS, connection, timeout, body decode). Carries no status code,
    /// distinguishing transport failure from a server rejection.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be built from the given inputs.
    #[error("validation error: {0}")]
    Validation(String),
}
