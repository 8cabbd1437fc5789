// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use std::time::Duration;

use entrolytics::{AnalyticsClient, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS};
use entrolytics_common_secret::SecretString;
use serde::Deserialize;

/// Paths skipped by automatic page view tracking unless overridden.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
	"api/*",
	"telescope/*",
	"horizon/*",
	"_debugbar/*",
	"livewire/*",
];

fn default_excluded_paths() -> Vec<String> {
	DEFAULT_EXCLUDED_PATHS
		.iter()
		.map(|p| (*p).to_string())
		.collect()
}

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EntrolyticsConfigLayer {
	pub website_id: Option<String>,
	pub api_key: Option<SecretString>,
	pub host: Option<String>,
	#[serde(alias = "timeout")]
	pub timeout_secs: Option<u64>,
	pub excluded_paths: Option<Vec<String>>,
	pub auto_track: Option<bool>,
}

impl EntrolyticsConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: Self) {
		if other.website_id.is_some() {
			self.website_id = other.website_id;
		}
		if other.api_key.is_some() {
			self.api_key = other.api_key;
		}
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.excluded_paths.is_some() {
			self.excluded_paths = other.excluded_paths;
		}
		if other.auto_track.is_some() {
			self.auto_track = other.auto_track;
		}
	}

	/// Convert to resolved configuration with defaults applied.
	pub fn finalize(self) -> EntrolyticsConfig {
		EntrolyticsConfig {
			website_id: self.website_id.filter(|id| !id.is_empty()),
			api_key: self.api_key.filter(|key| !key.is_empty()),
			host: self
				.host
				.map(|h| h.trim_end_matches('/').to_string())
				.filter(|h| !h.is_empty())
				.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
			excluded_paths: self
				.excluded_paths
				.unwrap_or_else(default_excluded_paths),
			auto_track: self.auto_track.unwrap_or(true),
		}
	}
}

/// Resolved SDK configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrolyticsConfig {
	/// Website that page views and script tags are attributed to.
	pub website_id: Option<String>,
	pub api_key: Option<SecretString>,
	/// Collector base URL without a trailing slash.
	pub host: String,
	pub timeout_secs: u64,
	/// Glob patterns matched against the request path without its leading slash.
	pub excluded_paths: Vec<String>,
	/// Whether the page view middleware records anything.
	pub auto_track: bool,
}

impl EntrolyticsConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Build a client for the configured host, timeout and key.
	///
	/// Fails with an authentication error when no API key is configured.
	pub fn client(&self) -> entrolytics::Result<AnalyticsClient> {
		let mut builder = AnalyticsClient::builder()
			.host(self.host.clone())
			.timeout(self.timeout());
		if let Some(key) = &self.api_key {
			builder = builder.api_key(key.clone());
		}
		builder.build()
	}
}

impl Default for EntrolyticsConfig {
	fn default() -> Self {
		EntrolyticsConfigLayer::default().finalize()
	}
}
