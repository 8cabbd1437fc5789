// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort page view recording for server-rendered routes.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use entrolytics::{AnalyticsClient, PageViewParams};
use entrolytics_config::EntrolyticsConfig;
use tracing::{debug, warn};

use crate::error::IntegrationError;
use crate::exclusions::PathExclusions;

/// A completed request, as seen by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
	pub method: Method,
	pub status: StatusCode,
	/// Request path, used for exclusion matching.
	pub path: String,
	/// Absolute URL including the query string, sent as the page view URL.
	pub full_url: String,
	pub referrer: Option<String>,
	pub user_agent: Option<String>,
	pub ip: Option<IpAddr>,
	pub user_id: Option<String>,
}

impl PageView {
	pub fn new(
		method: Method,
		status: StatusCode,
		path: impl Into<String>,
		full_url: impl Into<String>,
	) -> Self {
		Self {
			method,
			status,
			path: path.into(),
			full_url: full_url.into(),
			referrer: None,
			user_agent: None,
			ip: None,
			user_id: None,
		}
	}
}

/// Build an [`AnalyticsClient`] from resolved configuration.
pub fn client_from_config(config: &EntrolyticsConfig) -> entrolytics::Result<AnalyticsClient> {
	config.client()
}

/// Sends page views for successful GET requests to non-excluded paths.
#[derive(Debug, Clone)]
pub struct PageViewTracker {
	client: AnalyticsClient,
	website_id: Option<String>,
	exclusions: Arc<PathExclusions>,
	enabled: bool,
}

impl PageViewTracker {
	pub fn new(
		client: AnalyticsClient,
		website_id: Option<String>,
		exclusions: PathExclusions,
	) -> Self {
		Self {
			client,
			website_id: website_id.filter(|id| !id.is_empty()),
			exclusions: Arc::new(exclusions),
			enabled: true,
		}
	}

	/// Build a tracker from configuration, honouring `auto_track`.
	pub fn from_config(config: &EntrolyticsConfig) -> Result<Self, IntegrationError> {
		let client = client_from_config(config)?;
		let exclusions = PathExclusions::new(&config.excluded_paths)?;
		let mut tracker = Self::new(client, config.website_id.clone(), exclusions);
		tracker.enabled = config.auto_track;
		Ok(tracker)
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn client(&self) -> &AnalyticsClient {
		&self.client
	}

	pub fn website_id(&self) -> Option<&str> {
		self.website_id.as_deref()
	}

	pub fn should_track(&self, view: &PageView) -> bool {
		self.enabled
			&& self.website_id.is_some()
			&& view.method == Method::GET
			&& view.status.as_u16() < 400
			&& !self.exclusions.is_excluded(&view.path)
	}

	/// Send `view` if it qualifies. Failures are logged, never returned.
	pub async fn record(&self, view: PageView) {
		if !self.should_track(&view) {
			debug!(path = %view.path, status = view.status.as_u16(), "page view not tracked");
			return;
		}
		let Some(website_id) = self.website_id.clone() else {
			return;
		};

		let params = PageViewParams {
			referrer: view.referrer,
			user_id: view.user_id,
			user_agent: view.user_agent,
			ip_address: view.ip.map(|ip| ip.to_string()),
			..PageViewParams::new(website_id, view.full_url)
		};

		if let Err(e) = self.client.page_view(params).await {
			warn!(
				path = %view.path,
				error = %e,
				kind = %e.kind(),
				"Entrolytics tracking failed"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use entrolytics_config::DEFAULT_EXCLUDED_PATHS;

	fn tracker(website_id: Option<&str>) -> PageViewTracker {
		let client = AnalyticsClient::new("ent_test").unwrap();
		PageViewTracker::new(
			client,
			website_id.map(str::to_string),
			PathExclusions::new(DEFAULT_EXCLUDED_PATHS).unwrap(),
		)
	}

	fn view(method: Method, status: u16, path: &str) -> PageView {
		PageView::new(
			method,
			StatusCode::from_u16(status).unwrap(),
			path,
			format!("https://example.com{path}"),
		)
	}

	#[test]
	fn test_tracks_successful_get() {
		let tracker = tracker(Some("w1"));
		assert!(tracker.should_track(&view(Method::GET, 200, "/pricing")));
		assert!(tracker.should_track(&view(Method::GET, 304, "/pricing")));
	}

	#[test]
	fn test_skips_non_get() {
		let tracker = tracker(Some("w1"));
		assert!(!tracker.should_track(&view(Method::POST, 200, "/pricing")));
		assert!(!tracker.should_track(&view(Method::HEAD, 200, "/pricing")));
	}

	#[test]
	fn test_skips_error_statuses() {
		let tracker = tracker(Some("w1"));
		assert!(tracker.should_track(&view(Method::GET, 399, "/pricing")));
		assert!(!tracker.should_track(&view(Method::GET, 400, "/pricing")));
		assert!(!tracker.should_track(&view(Method::GET, 500, "/pricing")));
	}

	#[test]
	fn test_skips_excluded_paths() {
		let tracker = tracker(Some("w1"));
		assert!(!tracker.should_track(&view(Method::GET, 200, "/api/users")));
	}

	#[test]
	fn test_skips_without_website_id() {
		assert!(!tracker(None).should_track(&view(Method::GET, 200, "/")));
		assert!(!tracker(Some("")).should_track(&view(Method::GET, 200, "/")));
	}

	#[test]
	fn test_disabled_tracker_skips_everything() {
		let tracker = tracker(Some("w1")).with_enabled(false);
		assert!(!tracker.should_track(&view(Method::GET, 200, "/")));
	}

	#[test]
	fn test_from_config() {
		let config = EntrolyticsConfig {
			website_id: Some("w1".to_string()),
			api_key: Some("ent_cfg".into()),
			host: "https://stats.example.com".to_string(),
			timeout_secs: 4,
			excluded_paths: vec!["admin/*".to_string()],
			auto_track: false,
		};
		let tracker = PageViewTracker::from_config(&config).unwrap();
		assert_eq!(tracker.website_id(), Some("w1"));
		assert_eq!(tracker.client().host(), "https://stats.example.com");
		assert_eq!(tracker.client().timeout().as_secs(), 4);
		assert!(!tracker.enabled);
	}

	#[test]
	fn test_from_config_requires_api_key() {
		let err = PageViewTracker::from_config(&EntrolyticsConfig::default()).unwrap_err();
		assert!(matches!(err, IntegrationError::Client(_)));
	}

	#[test]
	fn test_from_config_rejects_bad_pattern() {
		let config = EntrolyticsConfig {
			api_key: Some("ent_cfg".into()),
			excluded_paths: vec!["[".to_string()],
			..EntrolyticsConfig::default()
		};
		let err = PageViewTracker::from_config(&config).unwrap_err();
		assert!(matches!(err, IntegrationError::Pattern(_)));
	}
}
