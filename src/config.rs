//! Request configuration.
//!
//! A [`RequestConfig`] holds everything needed to address and shape one
//! outbound request. It is built by chaining owned-value calls and is never
//! touched again once a send begins; following a redirect produces a new
//! value through [`RequestConfig::redirected_to`].

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Time allowed between sending a request and receiving its response headers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Upper bound on consecutive `307` hops followed by buffered fetches.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

const AUTHORIZATION: &str = "Authorization";

/// PEM material presented to the server during the TLS handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    /// PEM-encoded private key.
    pub key: String,
    /// PEM-encoded certificate chain.
    pub cert: String,
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("key", &"<redacted>")
            .field("cert", &self.cert)
            .finish()
    }
}

/// Configuration for one outbound request.
///
/// # Examples
///
/// ```
/// use fetchling::RequestConfig;
/// use std::time::Duration;
///
/// let config = RequestConfig::new("https://api.example.com:8443/items?page=2")?
///     .with_header("X-Trace", "abc")
///     .with_bearer_auth("secret")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.hostname(), "api.example.com");
/// assert_eq!(config.port(), 8443);
/// assert_eq!(config.path(), "/items?page=2");
/// assert_eq!(config.scheme(), "https");
/// assert_eq!(config.headers()["Authorization"], "Bearer secret");
/// # Ok::<(), fetchling::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestConfig {
    url: Url,
    method: Method,
    headers: HashMap<String, String>,
    timeout: Duration,
    accept_invalid_certs: bool,
    client_certificate: Option<ClientCertificate>,
    max_redirects: usize,
}

impl RequestConfig {
    /// Parses `url` and creates a configuration with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL does not parse, and
    /// [`Error::UnsupportedUrl`] if it is not an `http`/`https` URL with a host.
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let url = checked(Url::parse(url.as_ref())?)?;

        Ok(Self {
            url,
            method: Method::GET,
            headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            client_certificate: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    /// Sets a header, replacing any earlier value stored under the same name.
    ///
    /// Names are kept exactly as given. Legality is checked only when the
    /// request is sent.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the method used when a fetch does not choose one itself.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets `Authorization: Basic <base64(user:password)>`.
    pub fn with_basic_auth(self, user: &str, password: &str) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", user, password));
        self.with_header(AUTHORIZATION, format!("Basic {}", credentials))
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn with_bearer_auth(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Sets the window allowed for response headers to arrive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skips server certificate validation. Ignored for plain `http`.
    pub fn without_certificate_validation(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }

    /// Sets the PEM key and certificate used for TLS client authentication.
    pub fn with_client_certificate(mut self, key: impl Into<String>, cert: impl Into<String>) -> Self {
        self.client_certificate = Some(ClientCertificate {
            key: key.into(),
            cert: cert.into(),
        });
        self
    }

    /// Sets how many `307` hops a buffered fetch follows before giving up.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Returns a copy of this configuration aimed at `location`.
    ///
    /// Relative locations are resolved against the current URL. Headers,
    /// timeout, TLS settings and authentication carry over unchanged.
    ///
    /// # Errors
    ///
    /// Fails like [`RequestConfig::new`] when the location is not fetchable.
    pub fn redirected_to(&self, location: &str) -> Result<Self> {
        let url = checked(self.url.join(location)?)?;
        Ok(Self {
            url,
            ..self.clone()
        })
    }

    /// The full target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The target host name.
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// The target port, falling back to the scheme's default.
    pub fn port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(80)
    }

    /// The path including the query string, as sent on the request line.
    pub fn path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// `http` or `https`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Whether the target uses TLS.
    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// The method used when a fetch does not choose one.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Headers keyed by the names exactly as they were set.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The window allowed for response headers to arrive.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether server certificate validation is skipped.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// The PEM material for TLS client authentication, if set.
    pub fn client_certificate(&self) -> Option<&ClientCertificate> {
        self.client_certificate.as_ref()
    }

    /// How many `307` hops a buffered fetch follows.
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

fn checked(url: Url) -> Result<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::UnsupportedUrl(format!(
            "scheme '{}' in {}",
            url.scheme(),
            url
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::UnsupportedUrl(format!("no host in {}", url)));
    }
    Ok(url)
}
