//! Caller-supplied error mapping.
//!
//! Every failure of a terminal operation passes through exactly one
//! [`ErrorMapper`] before it reaches the caller. The plain operations use
//! [`Unmapped`]; the `*_with_mapper` variants take the caller's mapper as an
//! argument.

use crate::Error;

/// Turns a normalized [`Error`] into the caller's error type.
///
/// The mapper also receives the raw response body when one was read, so a
/// domain-specific error payload can be reclassified. Mappers should be pure:
/// the same error and body should yield the same result.
///
/// Any `Fn(Error, Option<&str>) -> E` closure is a mapper.
///
/// # Examples
///
/// ```
/// use fetchling::{Error, ErrorMapper};
/// use http::{HeaderMap, StatusCode};
///
/// #[derive(Debug, PartialEq)]
/// enum ApiError {
///     Quota,
///     Other(String),
/// }
///
/// let mapper = |error: Error, body: Option<&str>| match body {
///     Some(body) if body.contains("quota") => ApiError::Quota,
///     _ => ApiError::Other(error.to_string()),
/// };
///
/// let error = Error::HttpError {
///     status: StatusCode::FORBIDDEN,
///     body: r#"{"reason":"quota"}"#.to_string(),
///     headers: HeaderMap::new(),
/// };
/// assert_eq!(mapper.map_error(error, Some(r#"{"reason":"quota"}"#)), ApiError::Quota);
/// ```
pub trait ErrorMapper<E>: Send + Sync {
    /// Maps `error`; `body` is the response payload read before the failure, if any.
    fn map_error(&self, error: Error, body: Option<&str>) -> E;
}

impl<E, F> ErrorMapper<E> for F
where
    F: Fn(Error, Option<&str>) -> E + Send + Sync,
{
    fn map_error(&self, error: Error, body: Option<&str>) -> E {
        self(error, body)
    }
}

/// The identity mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmapped;

impl ErrorMapper<Error> for Unmapped {
    fn map_error(&self, error: Error, _body: Option<&str>) -> Error {
        error
    }
}

/// Runs `mapper` over `error`, handing it a copy of the body the error carries.
pub(crate) fn normalize<E>(mapper: &(impl ErrorMapper<E> + ?Sized), error: Error) -> E {
    tracing::warn!(
        error = %error,
        status = error.status().map(|s| s.as_u16()),
        "Request failed"
    );

    let body = error.body().map(str::to_owned);
    mapper.map_error(error, body.as_deref())
}
