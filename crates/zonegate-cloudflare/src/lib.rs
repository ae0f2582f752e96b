//! Async client for the Cloudflare DNS records API.
//!
//! This is the gateway's "downstream mutation executor": validated and
//! policy-checked record mutations are forwarded here and nowhere else.
//! The client resolves the target zone once (by configured id, or by a
//! cached name lookup) and exposes the records CRUD surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use zonegate_cloudflare::{CloudflareClient, NewRecord};
//! use zonegate_core::RecordType;
//!
//! let client = CloudflareClient::builder("api-token")
//!     .zone_name("example.com")
//!     .build();
//!
//! let page = client.records().list().record_type(RecordType::A).send().await?;
//! println!("{} records", page.total);
//! ```

#![doc(html_root_url = "https://docs.rs/zonegate-cloudflare/0.3.0")]

mod api;
mod client;
mod config;
mod error;
mod types;

pub use api::{ListRecordsBuilder, RecordsApi};
pub use client::{CloudflareClient, CloudflareClientBuilder};
pub use config::{RetryConfig, ZoneConfig};
pub use error::{CloudflareError, Result};
pub use types::{ApiEnvelope, ApiError, NewRecord, ProviderRecord, RecordPage, RecordPatch, ResultInfo};
