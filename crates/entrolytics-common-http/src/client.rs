// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client builder with the Entrolytics User-Agent and auth headers.

use reqwest::header::{
	HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE,
};
use reqwest::ClientBuilder;

/// SDK name reported in the User-Agent.
pub const SDK_NAME: &str = "entrolytics-rust";
/// SDK version reported in the User-Agent.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates a new HTTP client builder with the SDK User-Agent header.
///
/// # Example
/// ```ignore
/// let client = entrolytics_common_http::builder()
///     .timeout(Duration::from_secs(10))
///     .default_headers(entrolytics_common_http::default_headers("ent_xxx")?)
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	reqwest::Client::builder().user_agent(user_agent())
}

/// Returns the SDK User-Agent string.
///
/// Format: `entrolytics-rust/{version}`
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// Builds the headers sent with every collector request.
///
/// The `Authorization` value is marked sensitive so it is never printed by
/// reqwest's own Debug output.
pub fn default_headers(api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
	let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
	auth.set_sensitive(true);

	let mut headers = HeaderMap::new();
	headers.insert(AUTHORIZATION, auth);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	Ok(headers)
}
