//! # Fetchling - a single-request HTTP/HTTPS client
//!
//! Fetchling builds one outbound request from a URL and a handful of chained
//! options (headers, authentication, TLS trust, client certificates,
//! timeout), sends it with `reqwest`, and either buffers the response body or
//! pipes it into an async sink.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fetchling::{Fetch, Payload};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fetchling::Error> {
//!     // POST a text body and read the echoed JSON back
//!     let json = Fetch::new("https://postman-echo.com/post")?
//!         .header("X-Time", "1700000000")
//!         .timeout(Duration::from_secs(10))
//!         .fetch(Payload::text("hello").content_type("text/plain"))
//!         .await?;
//!     println!("{}", json);
//!
//!     // Basic auth, plain GET
//!     let json = Fetch::new("https://postman-echo.com/basic-auth")?
//!         .basic_auth("postman", "password")
//!         .fetch(Payload::new())
//!         .await?;
//!     println!("{}", json);
//!
//!     // Stream a body straight into a file
//!     let mut file = tokio::fs::File::create("download.bin").await.map_err(fetchling::Error::Sink)?;
//!     Fetch::new("https://example.com/download.bin")?
//!         .pipe(&mut file, true)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Response handling
//!
//! - **Buffered** ([`Fetch::fetch`]): the whole body is read first. `2xx`
//!   resolves with the body, `307` is followed by replaying the same payload
//!   against `Location`, anything else fails with [`Error::HttpError`]
//!   carrying status and body.
//! - **Streamed** ([`Fetch::pipe`]): the status is checked when headers
//!   arrive. Non-`2xx` fails with [`Error::UnexpectedStatus`] and the sink
//!   receives nothing. Redirects are not followed.
//!
//! ## Error mapping
//!
//! Every failure passes through one [`ErrorMapper`] before it is returned.
//! The `*_with_mapper` operations accept any `Fn(Error, Option<&str>) -> E`:
//!
//! ```no_run
//! use fetchling::{Error, Fetch, Payload};
//!
//! #[derive(Debug)]
//! struct Marker(Option<u16>);
//!
//! # async fn example() -> Result<(), Marker> {
//! let fetch = Fetch::new("https://api.example.com/flaky").map_err(|_| Marker(None))?;
//! let body = fetch
//!     .fetch_with_mapper(Payload::new(), &|e: Error, _body: Option<&str>| {
//!         Marker(e.status().map(|s| s.as_u16()))
//!     })
//!     .await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod encoding;
mod error;
pub mod mapper;
mod payload;
mod response;

pub use client::Fetch;
pub use config::RequestConfig;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use mapper::ErrorMapper;
pub use payload::{Content, Payload, DEFAULT_CONTENT_TYPE};
pub use response::Response;
