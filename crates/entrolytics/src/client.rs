// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Analytics client for sending events to the Entrolytics collector.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use entrolytics_common_http::{SDK_NAME, SDK_VERSION};
use entrolytics_common_secret::SecretString;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, IntoUrl, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{
	EntrolyticsError, Result, AUTHENTICATION_MESSAGE, INVALID_REQUEST_MESSAGE,
};
use crate::params::{
	DeploymentParams, FormEventParams, IdentifyParams, PageViewParams, TrackParams, VitalParams,
};
use crate::payload::{format_timestamp, DeploymentRecord, Envelope, FormEvent, VitalReport};

/// Production collector.
pub const DEFAULT_HOST: &str = "https://ng.entrolytics.click";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SEND_ENDPOINT: &str = "/api/send";
const VITALS_ENDPOINT: &str = "/api/collect/vitals";
const FORMS_ENDPOINT: &str = "/api/collect/forms";

const X_FORWARDED_USER_AGENT: HeaderName = HeaderName::from_static("x-forwarded-user-agent");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Connection options of a client. The API key is held separately so it
/// never appears in these options' Debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
	/// Collector base URL. Trailing slashes are stripped at build time.
	pub host: String,
	/// Timeout for each HTTP request.
	pub timeout: Duration,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
		}
	}
}

/// Builder for constructing an [`AnalyticsClient`].
pub struct AnalyticsClientBuilder {
	api_key: Option<SecretString>,
	options: ClientOptions,
}

impl AnalyticsClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			api_key: None,
			options: ClientOptions::default(),
		}
	}

	/// Sets the API key used as the bearer credential.
	pub fn api_key(mut self, key: impl Into<SecretString>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the collector host. Defaults to [`DEFAULT_HOST`].
	///
	/// Example: `https://analytics.example.com` for a self-hosted collector.
	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.options.host = host.into();
		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.options.timeout = timeout;
		self
	}

	/// Sets the per-request timeout in whole seconds.
	pub fn timeout_secs(self, secs: u64) -> Self {
		self.timeout(Duration::from_secs(secs))
	}

	/// Builds the client. Performs no network I/O.
	pub fn build(self) -> Result<AnalyticsClient> {
		let api_key = self
			.api_key
			.filter(|key| !key.is_empty())
			.ok_or_else(|| EntrolyticsError::authentication("API key is required"))?;

		let mut options = self.options;
		options.host = options.host.trim().trim_end_matches('/').to_string();
		if options.host.is_empty() {
			options.host = DEFAULT_HOST.to_string();
		}
		let base_url = Url::parse(&options.host).map_err(|e| {
			EntrolyticsError::validation(format!("invalid host '{}': {e}", options.host))
		})?;
		if base_url.cannot_be_a_base() {
			return Err(EntrolyticsError::validation(format!(
				"invalid host '{}': not a base URL",
				options.host
			)));
		}

		let headers = entrolytics_common_http::default_headers(api_key.expose()).map_err(|_| {
			EntrolyticsError::authentication("API key contains characters not allowed in a header")
		})?;

		let http_client = entrolytics_common_http::builder()
			.timeout(options.timeout)
			.default_headers(headers)
			.build()
			.map_err(EntrolyticsError::client_setup)?;

		info!(
			host = %options.host,
			timeout_secs = options.timeout.as_secs(),
			sdk_name = SDK_NAME,
			sdk_version = SDK_VERSION,
			"Entrolytics client initialized"
		);

		Ok(AnalyticsClient {
			inner: Arc::new(ClientInner {
				base_url,
				http_client,
				options,
			}),
		})
	}
}

impl Default for AnalyticsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug)]
struct ClientInner {
	base_url: Url,
	http_client: Client,
	options: ClientOptions,
}

/// Client for sending analytics events to Entrolytics.
///
/// Holds no per-call state; clone it freely and share it across tasks.
///
/// # Example
///
/// ```ignore
/// use entrolytics::{AnalyticsClient, Properties, TrackParams};
///
/// let client = AnalyticsClient::new("ent_xxx")?;
///
/// client.track(TrackParams {
///     data: Properties::new().insert("revenue", 99.99),
///     ..TrackParams::new("abc123", "purchase")
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
	inner: Arc<ClientInner>,
}

impl AnalyticsClient {
	/// Creates a client for the production collector with default settings.
	pub fn new(api_key: impl Into<SecretString>) -> Result<Self> {
		AnalyticsClientBuilder::new().api_key(api_key).build()
	}

	pub fn builder() -> AnalyticsClientBuilder {
		AnalyticsClientBuilder::new()
	}

	/// Collector host without trailing slash.
	pub fn host(&self) -> &str {
		&self.inner.options.host
	}

	pub fn timeout(&self) -> Duration {
		self.inner.options.timeout
	}

	pub fn options(&self) -> &ClientOptions {
		&self.inner.options
	}

	/// Tracks a custom event.
	pub async fn track(&self, params: TrackParams) -> Result<()> {
		params.validate()?;

		let headers = forwarded_headers(params.user_agent.as_deref(), params.ip_address.as_deref());
		let envelope = Envelope::track(params, now());

		self.send_to_endpoint(SEND_ENDPOINT, &envelope, headers).await
	}

	/// Tracks a page view (`$pageview` event).
	pub async fn page_view(&self, params: PageViewParams) -> Result<()> {
		params.validate()?;

		let headers = forwarded_headers(params.user_agent.as_deref(), params.ip_address.as_deref());
		let envelope = Envelope::page_view(params, now());

		self.send_to_endpoint(SEND_ENDPOINT, &envelope, headers).await
	}

	/// Identifies a user with traits.
	pub async fn identify(&self, params: IdentifyParams) -> Result<()> {
		params.validate()?;

		let envelope = Envelope::identify(params, now());

		self.send_to_endpoint(SEND_ENDPOINT, &envelope, HeaderMap::new()).await
	}

	/// Tracks a web-vital measurement.
	pub async fn track_vital(&self, params: VitalParams) -> Result<()> {
		params.validate()?;

		let report = VitalReport::from(params);

		self.send_to_endpoint(VITALS_ENDPOINT, &report, HeaderMap::new()).await
	}

	/// Tracks a form interaction.
	pub async fn track_form_event(&self, params: FormEventParams) -> Result<()> {
		params.validate()?;

		let event = FormEvent::from(params);

		self.send_to_endpoint(FORMS_ENDPOINT, &event, HeaderMap::new()).await
	}

	/// Registers a deployment for the website.
	pub async fn set_deployment(&self, params: DeploymentParams) -> Result<()> {
		params.validate()?;

		let segments = ["api", "websites", params.website_id.as_str(), "deployments"];
		let url = self.segment_url(segments);
		let record = DeploymentRecord::from(params);

		self.post_json(url, &record, HeaderMap::new()).await
	}

	/// Posts `payload` as JSON to `endpoint` on the collector host.
	///
	/// `headers` are layered over the client defaults and win on collision.
	/// Only 200 and 201 count as success; everything else is an error.
	pub async fn send_to_endpoint<T>(
		&self,
		endpoint: &str,
		payload: &T,
		headers: HeaderMap,
	) -> Result<()>
	where
		T: Serialize + ?Sized,
	{
		let url = format!("{}{}", self.inner.options.host, endpoint);
		self.post_json(url, payload, headers).await
	}

	/// Host URL with `segments` appended, each percent-encoded as a single
	/// path segment.
	fn segment_url<'a, I>(&self, segments: I) -> Url
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut url = self.inner.base_url.clone();
		// Checked at build: the host is a base URL.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}
		url
	}

	async fn post_json<U, T>(&self, url: U, payload: &T, headers: HeaderMap) -> Result<()>
	where
		U: IntoUrl + fmt::Display,
		T: Serialize + ?Sized,
	{
		let url_text = url.to_string();
		debug!(url = %url_text, "Sending request to collector");

		let response = self
			.inner
			.http_client
			.post(url)
			.headers(headers)
			.json(payload)
			.send()
			.await
			.map_err(|e| {
				warn!(url = %url_text, error = %e, "Collector request failed before a response");
				EntrolyticsError::network(e)
			})?;

		classify_response(response).await
	}
}

/// Maps a collector response to success or a typed error.
async fn classify_response(response: Response) -> Result<()> {
	let status = response.status();

	match status {
		StatusCode::OK | StatusCode::CREATED => Ok(()),
		StatusCode::UNAUTHORIZED => {
			warn!(status = status.as_u16(), "Collector rejected API key");
			Err(EntrolyticsError::authentication(AUTHENTICATION_MESSAGE))
		}
		StatusCode::BAD_REQUEST => {
			let body = response.text().await.unwrap_or_default();
			let message =
				extract_error_message(&body).unwrap_or_else(|| INVALID_REQUEST_MESSAGE.to_string());
			warn!(status = status.as_u16(), message = %message, "Collector rejected payload");
			Err(EntrolyticsError::validation(message))
		}
		StatusCode::TOO_MANY_REQUESTS => {
			let retry_after = parse_retry_after(response.headers());
			warn!(
				status = status.as_u16(),
				retry_after_secs = ?retry_after,
				"Collector rate limited request"
			);
			Err(EntrolyticsError::rate_limit(retry_after))
		}
		_ => {
			warn!(status = status.as_u16(), "Collector request failed");
			Err(EntrolyticsError::generic(status.as_u16()))
		}
	}
}

#[derive(Deserialize)]
struct ErrorBody {
	error: Option<String>,
}

/// Reads the `error` string from a JSON error body.
fn extract_error_message(body: &str) -> Option<String> {
	serde_json::from_str::<ErrorBody>(body)
		.ok()
		.and_then(|b| b.error)
		.filter(|m| !m.is_empty())
}

/// Integer seconds from `Retry-After`. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
	headers
		.get(RETRY_AFTER)
		.and_then(|v| v.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Builds the `X-Forwarded-*` headers for the end user's request.
fn forwarded_headers(user_agent: Option<&str>, ip_address: Option<&str>) -> HeaderMap {
	let mut headers = HeaderMap::new();

	for (name, value) in [
		(X_FORWARDED_USER_AGENT, user_agent),
		(X_FORWARDED_FOR, ip_address),
	] {
		let Some(value) = value.filter(|v| !v.is_empty()) else {
			continue;
		};
		match HeaderValue::from_str(value) {
			Ok(value) => {
				headers.insert(name, value);
			}
			Err(_) => warn!(header = %name, "Skipping forwarded header with invalid characters"),
		}
	}

	headers
}

fn now() -> String {
	format_timestamp(&Utc::now())
}
