//! Smoke test against postman-echo.com.
//!
//! This demo shows how to:
//! - POST a text body with a custom header and check the echo
//! - Observe the status code of a non-2xx response
//! - Authenticate with HTTP basic auth
//!
//! Run with: `cargo run --example echo`

use fetchling::{Error, Fetch, Payload};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Deserialize)]
struct PostEcho {
    data: String,
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct AuthEcho {
    authenticated: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("fetchling=debug,echo=info")
        .init();

    const TEST: &str = "hello";
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string();

    println!("=== Echo ===");
    let echo = Fetch::new("https://postman-echo.com/post")?
        .header("X-Time", t.as_str())
        .fetch_json::<PostEcho>(Payload::text(TEST).content_type("text/plain"))
        .await;

    match echo {
        Ok(response) if response.data.data != TEST => println!("invalid data"),
        Ok(response) if response.data.headers.get("x-time") != Some(&t) => {
            println!("invalid header")
        }
        Ok(response) => println!("all ok ({:?})", response.latency),
        Err(e) => println!("exception: {}", e),
    }
    println!();

    println!("=== Error status ===");
    match Fetch::new("http://google.com")?.fetch(Payload::new()).await {
        Err(e) if e.status().map(|s| s.as_u16()) == Some(301) => println!("error test ok"),
        other => println!("error test failed: {:?}", other.map(|body| body.len())),
    }
    println!();

    println!("=== Basic auth ===");
    let auth = Fetch::new("https://postman-echo.com/basic-auth")?
        .basic_auth("postman", "password")
        .fetch_json::<AuthEcho>(Payload::new())
        .await;

    match auth {
        Ok(response) if response.data.authenticated => println!("basic auth ok"),
        Ok(_) => println!("basic auth failed"),
        Err(e) => println!("exception: {}", e),
    }

    Ok(())
}
