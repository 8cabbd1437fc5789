// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Automatic page view tracking for axum applications.
//!
//! ```ignore
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use entrolytics_axum::{track_page_views, PageViewTracker};
//!
//! let config = entrolytics_config::load_config(None)?;
//! let tracker = PageViewTracker::from_config(&config)?;
//!
//! let app = Router::new()
//! 	.route("/", get(|| async { "hello" }))
//! 	.layer(from_fn_with_state(tracker, track_page_views));
//! ```
//!
//! Serve with `into_make_service_with_connect_info::<SocketAddr>()` to
//! forward visitor IP addresses.

mod error;
mod exclusions;
mod middleware;
mod script;
mod tracker;

pub use error::IntegrationError;
pub use exclusions::PathExclusions;
pub use middleware::{track_page_views, AuthenticatedUser};
pub use script::{script_tag, script_tag_from_config};
pub use tracker::{client_from_config, PageView, PageViewTracker};
