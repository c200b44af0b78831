//! Basic SDK usage example.
//!
//! Connects to a running Vetta server and runs each check once.
//!
//! Run with: cargo run --example basic_usage

use std::time::Duration;
use vetta_sdk::{ValidationClient, VettaResult};

#[tokio::main]
async fn main() -> VettaResult<()> {
    tracing_subscriber::fmt::init();

    let client = ValidationClient::builder()
        .base_url("http://localhost:8000")
        .timeout(Duration::from_secs(10))
        .build()?;

    println!("Checking server health...");
    let health = client.health().await?;
    println!("Server status: {} ({})", health.status, health.service);

    let email = client.validate_email("user@example.com").await;
    println!("\nEmail: {} - {}", email.valid, email.message);

    let phone = client.validate_phone("+12025550123").await;
    println!("Phone: {} - {}", phone.valid, phone.message);

    let url = client.validate_url("https://example.com/docs").await;
    println!("URL: {} - {}", url.valid, url.message);
    if let Some(details) = url.details {
        println!(
            "  scheme={:?} netloc={:?} path={:?}",
            details.scheme, details.netloc, details.path
        );
    }

    let regex = client.validate_regex("Order #A-1042", r"\d+", "").await;
    println!(
        "Regex: {} - {} (match: {:?})",
        regex.valid, regex.message, regex.matched
    );

    Ok(())
}
