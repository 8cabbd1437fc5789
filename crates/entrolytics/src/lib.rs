// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side Rust SDK for Entrolytics analytics.
//!
//! Each call validates its input, builds the wire payload, and posts it to
//! the collector in a single HTTP request. Nothing is queued or retried: a
//! call either returns `Ok(())` after a 200/201 response or an
//! [`EntrolyticsError`] describing what went wrong.
//!
//! # Quick Start
//!
//! ```ignore
//! use entrolytics::{AnalyticsClient, PageViewParams, Properties, TrackParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), entrolytics::EntrolyticsError> {
//!     let client = AnalyticsClient::builder()
//!         .api_key("ent_xxx")
//!         .host("https://ng.entrolytics.click")
//!         .timeout_secs(5)
//!         .build()?;
//!
//!     client.track(TrackParams {
//!         data: Properties::new().insert("revenue", 99.99),
//!         ..TrackParams::new("abc123", "purchase")
//!     }).await?;
//!
//!     client.page_view(PageViewParams {
//!         title: Some("Pricing".into()),
//!         ..PageViewParams::new("abc123", "https://shop.example.com/pricing")
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! | Kind | Cause | Retry? |
//! |------|-------|--------|
//! | `Authentication` | empty key, 401 | no |
//! | `Validation` | missing required field, 400 | no, fix the input |
//! | `RateLimit` | 429 | yes, after [`EntrolyticsError::retry_after`] |
//! | `Network` | no response (connect, DNS, timeout) | at caller's discretion |
//! | `Generic` | any other status | no |
//!
//! ```ignore
//! use entrolytics::ErrorKind;
//!
//! if let Err(e) = client.track(params).await {
//!     match e.kind() {
//!         ErrorKind::RateLimit => schedule_retry(e.retry_after()),
//!         ErrorKind::Network => schedule_retry(None),
//!         _ => tracing::warn!(error = %e, "dropping analytics event"),
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod params;
pub mod payload;
pub mod properties;

pub use client::{
	AnalyticsClient, AnalyticsClientBuilder, ClientOptions, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS,
};
pub use error::{EntrolyticsError, ErrorKind, Result};
pub use params::{
	DeploymentParams, FormEventParams, IdentifyParams, PageViewParams, TrackParams, VitalParams,
	VitalRating, WebVitalMetric,
};
pub use properties::Properties;

pub use entrolytics_common_secret::SecretString;
/// Header types used by [`AnalyticsClient::send_to_endpoint`].
pub use reqwest::header;
