//! Per-call request options for buffered fetches.

use crate::{Encoding, Error, Result};
use bytes::Bytes;
use http::Method;
use serde::Serialize;

/// Content type sent with a body when none is given.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// A request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Text, turned into bytes with the payload's [`Encoding`].
    Text(String),
    /// Raw bytes, sent as they are.
    Binary(Bytes),
}

/// What a single fetch sends: an optional body, its content type, an
/// optional method override and the text encoding.
///
/// The same payload is replayed unchanged when a `307` is followed.
///
/// # Examples
///
/// ```
/// use fetchling::{Encoding, Payload};
/// use http::Method;
///
/// let payload = Payload::text("hello").content_type("text/plain");
/// assert_eq!(payload.effective_method(&Method::GET), Method::POST);
///
/// let payload = Payload::new().method(Method::DELETE);
/// assert_eq!(payload.effective_method(&Method::GET), Method::DELETE);
///
/// let payload = Payload::text("aGk=").encoding(Encoding::Base64);
/// assert_eq!(payload.body_bytes().unwrap().unwrap().as_ref(), b"hi");
/// ```
#[derive(Debug, Clone)]
pub struct Payload {
    content: Option<Content>,
    content_type: String,
    method: Option<Method>,
    encoding: Encoding,
}

impl Payload {
    /// A payload without a body.
    pub fn new() -> Self {
        Self {
            content: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            method: None,
            encoding: Encoding::default(),
        }
    }

    /// A payload carrying a text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content: Some(Content::Text(body.into())),
            ..Self::new()
        }
    }

    /// A payload carrying a binary body.
    pub fn binary(body: impl Into<Bytes>) -> Self {
        Self {
            content: Some(Content::Binary(body.into())),
            ..Self::new()
        }
    }

    /// A payload carrying `value` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let body =
            serde_json::to_string(value).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        Ok(Self::text(body))
    }

    /// Sets the `Content-Type` sent with the body.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Overrides the method, with or without a body.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the encoding used for a text body and for the response text.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// The body, if any.
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// The `Content-Type` sent with the body.
    pub fn content_type_str(&self) -> &str {
        &self.content_type
    }

    /// The encoding applied to a text body and to the response text.
    pub fn text_encoding(&self) -> Encoding {
        self.encoding
    }

    /// The method to send: the override, else `POST` when there is a body,
    /// else `default`.
    pub fn effective_method(&self, default: &Method) -> Method {
        match (&self.method, &self.content) {
            (Some(method), _) => method.clone(),
            (None, Some(_)) => Method::POST,
            (None, None) => default.clone(),
        }
    }

    /// The bytes that go on the wire, if there is a body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if a text body does not fit its encoding.
    pub fn body_bytes(&self) -> Result<Option<Bytes>> {
        match &self.content {
            None => Ok(None),
            Some(Content::Text(text)) => Ok(Some(Bytes::from(self.encoding.encode(text)?))),
            Some(Content::Binary(bytes)) => Ok(Some(bytes.clone())),
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new()
    }
}
