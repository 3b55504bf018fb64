//! Error types for a single fetch.
//!
//! Every failure a [`Fetch`](crate::Fetch) can produce is expressed as one
//! [`Error`] value. Errors that originate from an HTTP response keep the
//! status code, and the ones that had a chance to read the payload keep the
//! raw body as well, so callers can reclassify domain-specific error payloads.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// The error type returned by every terminal operation of a [`Fetch`](crate::Fetch).
///
/// # Examples
///
/// ```no_run
/// use fetchling::{Error, Fetch, Payload};
///
/// # async fn example() -> Result<(), Error> {
/// let fetch = Fetch::new("https://api.example.com/items")?;
///
/// match fetch.fetch(Payload::new()).await {
///     Ok(body) => println!("Success: {}", body),
///     Err(Error::HttpError { status, body, .. }) => {
///         eprintln!("HTTP error {}: {}", status, body);
///     }
///     Err(e) if e.is_timeout() => eprintln!("Gave up waiting: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The target URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL parsed, but cannot be fetched (wrong scheme or no host).
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// The connection could not be established or was aborted.
    ///
    /// Covers DNS failures, refused connections and TLS handshake failures.
    /// No status code is available.
    #[error("http req. error, {0}")]
    Transport(#[source] reqwest::Error),

    /// No response headers arrived within the configured window.
    #[error("http req. error, timeout after {}ms", .after.as_millis())]
    Timeout {
        /// The window that elapsed
        after: Duration,
    },

    /// The server answered `307 Temporary Redirect` without a `Location` header.
    #[error("http resp. 307 without location header")]
    RedirectWithoutLocation {
        /// The response body read before the decision was made
        body: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The redirect chain was longer than the configured limit.
    #[error("http resp. too many redirects (limit {limit})")]
    TooManyRedirects {
        /// The configured maximum number of redirects
        limit: usize,
    },

    /// The server returned a non-2xx status in buffered mode.
    ///
    /// The full response payload has already been read and is kept in `body`.
    #[error("http resp. invalid code = {status}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        body: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The server returned a non-2xx status in streaming mode.
    ///
    /// The body was never read, so none is attached.
    #[error("http resp. invalid code = {status}")]
    UnexpectedStatus {
        /// The HTTP status code
        status: StatusCode,
        /// The response headers
        headers: HeaderMap,
    },

    /// Reading an already accepted response body failed midway.
    #[error("http resp. error, {source}")]
    ResponseStream {
        /// The status that had been accepted before the failure
        status: StatusCode,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Writing to the caller-supplied sink failed.
    #[error("sink error, {0}")]
    Sink(#[source] std::io::Error),

    /// A successful body could not be deserialized into the requested type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A text body is not valid under the encoding it was declared with.
    #[error("Invalid {encoding} body: {reason}")]
    InvalidEncoding {
        /// The declared encoding
        encoding: crate::Encoding,
        /// Why decoding failed
        reason: String,
    },

    /// A header, TLS identity or transport setting was rejected when the request was built.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl Error {
    /// Returns the HTTP status code if the failure originates from a response.
    ///
    /// Pure transport failures and local configuration errors return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchling::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::INTERNAL_SERVER_ERROR,
    ///     body: r#"{"status":500}"#.to_string(),
    ///     headers: http::HeaderMap::new(),
    /// };
    /// assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    ///
    /// let err = Error::Timeout { after: std::time::Duration::from_secs(1) };
    /// assert_eq!(err.status(), None);
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RedirectWithoutLocation { .. } => Some(StatusCode::TEMPORARY_REDIRECT),
            Error::HttpError { status, .. } => Some(*status),
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::ResponseStream { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body that was read before the failure, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::RedirectWithoutLocation { body, .. } => Some(body),
            Error::HttpError { body, .. } => Some(body),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the response headers if the failure carries them.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::RedirectWithoutLocation { headers, .. } => Some(headers),
            Error::HttpError { headers, .. } => Some(headers),
            Error::UnexpectedStatus { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns `true` for failures below the HTTP layer, timeouts included.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout { .. })
    }

    /// Returns `true` if the request was aborted by the timeout window.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// A specialized `Result` type for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_without_location_reports_307() {
        let err = Error::RedirectWithoutLocation {
            body: "moved".to_string(),
            headers: HeaderMap::new(),
        };

        assert_eq!(err.status(), Some(StatusCode::TEMPORARY_REDIRECT));
        assert_eq!(err.body(), Some("moved"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_unexpected_status_has_no_body() {
        let err = Error::UnexpectedStatus {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
        };

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.body(), None);
        assert!(err.headers().is_some());
    }

    #[test]
    fn test_timeout_message_mentions_timeout() {
        let err = Error::Timeout {
            after: Duration::from_millis(1000),
        };

        assert!(err.is_timeout());
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "http req. error, timeout after 1000ms");
    }

    #[test]
    fn test_http_error_message_includes_reason() {
        let err = Error::HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
            headers: HeaderMap::new(),
        };

        assert_eq!(
            err.to_string(),
            "http resp. invalid code = 500 Internal Server Error"
        );
    }
}
