//! Provider client library.
//!
//! This crate talks to an Evolution-style WhatsApp provider whose HTTP
//! surface differs between builds and forks. Each operation is an ordered
//! list of endpoint candidates, tried one at a time until one is accepted,
//! and each candidate is retried across auth-header variants on 401/403.
//!
//! - Instance lifecycle: create, webhook registration, connect, state
//! - QR image or pairing-code retrieval, rendering link codes locally
//! - Outbound text messages
//!
//! Request failures never surface as errors: every call returns a
//! [`ProviderResponse`] (status + body), with status 599 for network errors.
//!
//! # Example
//!
//! ```no_run
//! use provider_client::{ProviderClient, ProviderConfig};
//!
//! # async fn example() -> Result<(), provider_client::ProviderError> {
//! let config = ProviderConfig::new("http://localhost:8080").with_api_key("secret");
//! let client = ProviderClient::new(config)?;
//!
//! let started = client
//!     .ensure_started("brand_1", Some("https://gw.example.com/api/wa/webhook?token=t"))
//!     .await;
//! println!("started: {}", started.ok);
//!
//! let sent = client.send_text("brand_1", "5493511234567", "Hola!").await;
//! println!("sent: {} ({})", sent.ok, sent.response.status);
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod client;
pub mod config;
pub mod error;
pub mod qr;
pub mod types;

pub use client::{number_from_jid, ProviderClient};
pub use config::{HeaderVariant, ProviderConfig, DEFAULT_TIMEOUT};
pub use error::ProviderError;
pub use types::*;
