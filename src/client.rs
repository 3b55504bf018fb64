//! The single-request client.
//!
//! A [`Fetch`] owns one [`RequestConfig`] and turns it into exactly one
//! outbound request per terminal operation: [`Fetch::fetch`] buffers the
//! response body, [`Fetch::pipe`] streams it into a sink.

use crate::{
    mapper::{normalize, ErrorMapper, Unmapped},
    Error, Payload, RequestConfig, Response, Result,
};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A configurable client for one HTTP or HTTPS target.
///
/// Builder calls consume and return the value, so a `Fetch` is fully
/// configured before any request leaves. Terminal operations borrow it and
/// never change its configuration.
///
/// # Examples
///
/// ```no_run
/// use fetchling::{Fetch, Payload};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), fetchling::Error> {
/// let fetch = Fetch::new("https://postman-echo.com/post")?
///     .header("X-Time", "1700000000")
///     .timeout(Duration::from_secs(5));
///
/// let json = fetch.fetch(Payload::text("hello").content_type("text/plain")).await?;
/// println!("{}", json);
///
/// let mut out = Vec::new();
/// Fetch::new("https://postman-echo.com/get")?
///     .pipe(&mut out, true)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetch {
    config: RequestConfig,
}

impl Fetch {
    /// Creates a client for `url` with default settings.
    ///
    /// # Errors
    ///
    /// Fails right away if the URL is malformed or not `http`/`https`.
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::from_config(RequestConfig::new(url)?))
    }

    /// Creates a client for `url` with the given timeout window.
    pub fn with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        Ok(Self::from_config(RequestConfig::new(url)?.with_timeout(timeout)))
    }

    /// Creates a client from a prepared configuration.
    pub fn from_config(config: RequestConfig) -> Self {
        Self { config }
    }

    /// The configuration every request is built from.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Sets a header; the last value per name wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config = self.config.with_header(name, value);
        self
    }

    /// Skips certificate validation for this client's `https` requests.
    pub fn disable_certificate_validation(mut self) -> Self {
        self.config = self.config.without_certificate_validation();
        self
    }

    /// Uses HTTP basic authentication, replacing any earlier `Authorization`.
    pub fn basic_auth(mut self, user: &str, password: &str) -> Self {
        self.config = self.config.with_basic_auth(user, password);
        self
    }

    /// Uses a bearer token, replacing any earlier `Authorization`.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.config = self.config.with_bearer_auth(token);
        self
    }

    /// Sets the window allowed for response headers to arrive.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Presents a PEM key and certificate during the TLS handshake.
    pub fn client_certificate(mut self, key: impl Into<String>, cert: impl Into<String>) -> Self {
        self.config = self.config.with_client_certificate(key, cert);
        self
    }

    /// Sets the method used when the payload does not pick one.
    pub fn method(mut self, method: Method) -> Self {
        self.config = self.config.with_method(method);
        self
    }

    /// Sets how many `307` hops [`Fetch::fetch`] follows.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config = self.config.with_max_redirects(max_redirects);
        self
    }

    /// Sends the request and resolves with the decoded response body.
    ///
    /// A `307 Temporary Redirect` is followed by replaying the same payload
    /// against the `Location` target. Any other non-2xx status fails with
    /// [`Error::HttpError`], carrying the body that was read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::{Error, Fetch, Payload};
    ///
    /// # async fn example() -> Result<(), Error> {
    /// match Fetch::new("http://example.com/missing")?.fetch(Payload::new()).await {
    ///     Ok(body) => println!("{}", body),
    ///     Err(e) => eprintln!("status {:?}, body {:?}", e.status(), e.body()),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, payload: Payload) -> Result<String> {
        self.fetch_with_mapper(payload, &Unmapped).await
    }

    /// Like [`Fetch::fetch`], with every failure passed through `mapper`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::{Error, Fetch, Payload};
    ///
    /// #[derive(Debug)]
    /// enum AppError {
    ///     NotFound,
    ///     Upstream(String),
    /// }
    ///
    /// # async fn example() -> Result<(), AppError> {
    /// let fetch = Fetch::new("https://api.example.com/users/7")
    ///     .map_err(|e| AppError::Upstream(e.to_string()))?;
    ///
    /// let _body = fetch
    ///     .fetch_with_mapper(Payload::new(), &|error: Error, body: Option<&str>| {
    ///         match error.status().map(|s| s.as_u16()) {
    ///             Some(404) => AppError::NotFound,
    ///             _ => AppError::Upstream(body.unwrap_or_default().to_string()),
    ///         }
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_with_mapper<E>(
        &self,
        payload: Payload,
        mapper: &impl ErrorMapper<E>,
    ) -> std::result::Result<String, E> {
        self.fetch_buffered(&payload)
            .await
            .map(|response| response.data)
            .map_err(|e| normalize(mapper, e))
    }

    /// Like [`Fetch::fetch`], keeping status, headers, final URL and timing.
    pub async fn fetch_response(&self, payload: Payload) -> Result<Response<String>> {
        self.fetch_buffered(&payload)
            .await
            .map_err(|e| normalize(&Unmapped, e))
    }

    /// Like [`Fetch::fetch_response`], deserializing the body as JSON.
    ///
    /// # Errors
    ///
    /// Besides the failures of [`Fetch::fetch`], returns
    /// [`Error::DeserializationFailed`] with the raw body if it is not valid
    /// JSON for `T`.
    pub async fn fetch_json<T>(&self, payload: Payload) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.fetch_deserialized(&payload)
            .await
            .map_err(|e| normalize(&Unmapped, e))
    }

    /// Sends the request and copies the response body into `sink`.
    ///
    /// The status is checked as soon as headers arrive: a non-2xx status fails
    /// with [`Error::UnexpectedStatus`] before a single byte reaches the sink.
    /// Redirects are not followed in this mode. When `end` is `true` the sink
    /// is shut down after the last byte; otherwise it is only flushed.
    ///
    /// Resolves with the number of bytes written.
    pub async fn pipe<W>(&self, sink: &mut W, end: bool) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.pipe_with_mapper(sink, end, &Unmapped).await
    }

    /// Like [`Fetch::pipe`], with every failure passed through `mapper`.
    pub async fn pipe_with_mapper<W, E>(
        &self,
        sink: &mut W,
        end: bool,
        mapper: &impl ErrorMapper<E>,
    ) -> std::result::Result<u64, E>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.pipe_streamed(sink, end)
            .await
            .map_err(|e| normalize(mapper, e))
    }

    async fn fetch_buffered(&self, payload: &Payload) -> Result<Response<String>> {
        let start_time = Instant::now();
        let body = payload.body_bytes()?;
        let method = payload.effective_method(self.config.method());
        let mut config = self.config.clone();
        let mut redirects = 0;

        loop {
            let request_body = body.clone().map(|b| (b, payload.content_type_str()));
            let response = dispatch(&config, &method, request_body, redirects).await?;

            let status = response.status();
            let headers = response.headers().clone();
            let url = response.url().clone();

            tracing::info!(
                status = status.as_u16(),
                latency_ms = start_time.elapsed().as_millis(),
                redirects = redirects,
                "Received HTTP response"
            );

            let raw = read_body(response, status).await?;
            let text = payload.text_encoding().decode(&raw);

            if status == StatusCode::TEMPORARY_REDIRECT {
                let location = headers
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let Some(location) = location else {
                    return Err(Error::RedirectWithoutLocation {
                        body: text,
                        headers,
                    });
                };

                if redirects >= config.max_redirects() {
                    return Err(Error::TooManyRedirects {
                        limit: config.max_redirects(),
                    });
                }

                tracing::info!(
                    location = %location,
                    redirects = redirects + 1,
                    "Following temporary redirect"
                );

                config = config.redirected_to(&location)?;
                redirects += 1;
                continue;
            }

            if status.is_success() {
                return Ok(Response {
                    data: text.clone(),
                    raw_body: text,
                    status,
                    headers,
                    url,
                    latency: start_time.elapsed(),
                    redirects,
                });
            }

            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %text,
                    "Client error (4xx)"
                );
            } else if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %text,
                    "Server error (5xx)"
                );
            }

            return Err(Error::HttpError {
                status,
                body: text,
                headers,
            });
        }
    }

    async fn fetch_deserialized<T>(&self, payload: &Payload) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.fetch_buffered(payload).await?;

        match serde_json::from_str::<T>(&response.raw_body) {
            Ok(data) => Ok(response.map(|_| data)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %response.raw_body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: response.raw_body,
                    serde_error: e.to_string(),
                    status: response.status,
                })
            }
        }
    }

    async fn pipe_streamed<W>(&self, sink: &mut W, end: bool) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut response = dispatch(&self.config, self.config.method(), None, 0).await?;
        let status = response.status();

        tracing::info!(status = status.as_u16(), "Received HTTP response");

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status,
                headers: response.headers().clone(),
            });
        }

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| Error::ResponseStream { status, source })?
        {
            sink.write_all(&chunk).await.map_err(Error::Sink)?;
            written += chunk.len() as u64;
        }

        sink.flush().await.map_err(Error::Sink)?;
        if end {
            sink.shutdown().await.map_err(Error::Sink)?;
        }

        tracing::debug!(bytes = written, "Response piped to sink");

        Ok(written)
    }
}

/// Opens one connection for `config` and waits for the response headers.
///
/// The timeout covers everything up to the headers; when it fires the
/// in-flight request is dropped, which closes the connection.
async fn dispatch(
    config: &RequestConfig,
    method: &Method,
    body: Option<(Bytes, &str)>,
    hop: usize,
) -> Result<reqwest::Response> {
    let client = transport(config)?;

    // Names that differ only in case share one wire header; append keeps both values.
    let mut headers = HeaderMap::new();
    for (name, value) in config.headers() {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        headers.append(name, value);
    }

    tracing::debug!(
        method = %method,
        url = %config.url(),
        redirect = hop,
        "Executing HTTP request"
    );

    let mut request = client.request(method.clone(), config.url().clone());

    if let Some((bytes, content_type)) = body {
        let content_type = HeaderValue::try_from(content_type)
            .map_err(|e| Error::ConfigurationError(format!("Invalid content type: {}", e)))?;
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        request = request.body(bytes);
    }

    let request = request.headers(headers);
    let timeout = config.timeout();

    match tokio::time::timeout(timeout, request.send()).await {
        Ok(result) => result.map_err(Error::Transport),
        Err(_) => Err(Error::Timeout { after: timeout }),
    }
}

/// Builds the transport for one dispatch.
///
/// TLS trust and client identity are per request, so clients are not shared.
/// Redirects are never followed by the transport itself.
fn transport(config: &RequestConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

    if config.is_https() {
        if config.accepts_invalid_certs() {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(certificate) = config.client_certificate() {
            let pem = format!("{}\n{}", certificate.cert, certificate.key);
            let identity = reqwest::Identity::from_pem(pem.as_bytes()).map_err(|e| {
                Error::ConfigurationError(format!("Invalid client certificate: {}", e))
            })?;
            builder = builder.identity(identity);
        }
    }

    builder
        .build()
        .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
}

/// Reads the whole body, keeping chunks in arrival order.
async fn read_body(mut response: reqwest::Response, status: StatusCode) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| Error::ResponseStream { status, source })?
    {
        tracing::trace!(len = chunk.len(), "Received body chunk");
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
