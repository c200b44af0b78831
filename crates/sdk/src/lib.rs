//! # Vetta SDK
//!
//! Rust client for a remote Vetta validation server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vetta_sdk::{ValidationClient, VettaResult};
//!
//! #[tokio::main]
//! async fn main() -> VettaResult<()> {
//!     // Build client
//!     let client = ValidationClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     // Check health
//!     let health = client.health().await?;
//!     println!("Server status: {}", health.status);
//!
//!     // Transport failures come back as invalid verdicts
//!     let result = client.validate_email("user@example.com").await;
//!     println!("{}: {}", result.valid, result.message);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Surfacing Transport Errors
//!
//! ```rust,no_run
//! use vetta_sdk::{ValidationClient, VettaError};
//!
//! # async fn example() -> vetta_sdk::VettaResult<()> {
//! let client = ValidationClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! match client.try_validate_url("https://example.com/path").await {
//!     Ok(result) => println!("{:?}", result.details),
//!     Err(VettaError::Api { status, message, .. }) => {
//!         eprintln!("server answered {}: {}", status, message);
//!     }
//!     Err(e) => eprintln!("request failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{HealthStatus, ValidationClient, ValidationClientBuilder};
pub use config::{ClientConfig, RetryConfig};
pub use error::{VettaError, VettaResult};

// Re-export core types for convenience
pub use vetta_core::{UrlDetails, ValidationResult};
