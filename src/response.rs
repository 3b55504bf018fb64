//! Successful buffered responses together with their transaction details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;
use url::Url;

/// A successful buffered response.
///
/// `data` is the decoded body (or, for [`Fetch::fetch_json`](crate::Fetch::fetch_json),
/// the deserialized value). The remaining fields describe the final request of
/// the chain, after any `307` hops.
///
/// # Examples
///
/// ```no_run
/// use fetchling::{Fetch, Payload};
///
/// # async fn example() -> Result<(), fetchling::Error> {
/// let response = Fetch::new("https://api.example.com/items")?
///     .fetch_response(Payload::new())
///     .await?;
///
/// println!("Body: {}", response.data);
/// println!("Served by {} after {} redirect(s)", response.url, response.redirects);
/// println!("Took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The response data.
    pub data: T,

    /// The decoded response body.
    pub raw_body: String,

    /// The HTTP status code of the final response.
    pub status: StatusCode,

    /// The headers of the final response.
    pub headers: HeaderMap,

    /// The URL that produced the final response.
    pub url: Url,

    /// Time from the first dispatch until the final body was read.
    pub latency: Duration,

    /// How many `307` hops were followed.
    pub redirects: usize,
}

impl<T> Response<T> {
    /// Maps the response data to a different type, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            url: self.url,
            latency: self.latency,
            redirects: self.redirects,
        }
    }

    /// Returns `true` if at least one redirect was followed.
    pub fn was_redirected(&self) -> bool {
        self.redirects > 0
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn sample(redirects: usize) -> Response<String> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        Response {
            data: "42".to_string(),
            raw_body: "42".to_string(),
            status: StatusCode::OK,
            headers,
            url: Url::parse("http://localhost/answer").unwrap(),
            latency: Duration::from_millis(10),
            redirects,
        }
    }

    #[test]
    fn test_map_keeps_metadata() {
        let response = sample(1).map(|s| s.parse::<u32>().unwrap());

        assert_eq!(response.data, 42);
        assert_eq!(response.raw_body, "42");
        assert!(response.was_redirected());
    }

    #[test]
    fn test_header_lookup() {
        let response = sample(0);

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
        assert!(!response.was_redirected());
    }
}
