// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller-supplied parameters for each tracking call.
//!
//! Required fields are plain `String`s and must be non-empty. Optional
//! strings are sent only when `Some` and non-empty. Optional numbers and
//! booleans are sent whenever they are `Some`, including `0` and `false`.

use std::fmt;

use crate::error::{EntrolyticsError, Result};
use crate::properties::Properties;

fn require(value: &str, message: &str) -> Result<()> {
	if value.is_empty() {
		return Err(EntrolyticsError::validation(message));
	}
	Ok(())
}

/// A custom event.
#[derive(Debug, Clone, Default)]
pub struct TrackParams {
	pub website_id: String,
	/// Event name, e.g. `purchase`.
	pub event: String,
	pub data: Properties,
	pub url: Option<String>,
	pub referrer: Option<String>,
	pub user_id: Option<String>,
	pub session_id: Option<String>,
	/// Forwarded to the collector as `X-Forwarded-User-Agent`.
	pub user_agent: Option<String>,
	/// Forwarded to the collector as `X-Forwarded-For`.
	pub ip_address: Option<String>,
}

impl TrackParams {
	pub fn new(website_id: impl Into<String>, event: impl Into<String>) -> Self {
		Self {
			website_id: website_id.into(),
			event: event.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.event, "event is required")
	}
}

/// A page view. Sent as an event named `$pageview`.
#[derive(Debug, Clone, Default)]
pub struct PageViewParams {
	pub website_id: String,
	pub url: String,
	pub referrer: Option<String>,
	pub title: Option<String>,
	pub user_id: Option<String>,
	pub session_id: Option<String>,
	pub user_agent: Option<String>,
	pub ip_address: Option<String>,
}

impl PageViewParams {
	pub fn new(website_id: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			website_id: website_id.into(),
			url: url.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.url, "url is required")
	}
}

/// Associates traits with a known user.
#[derive(Debug, Clone, Default)]
pub struct IdentifyParams {
	pub website_id: String,
	pub user_id: String,
	pub traits: Properties,
}

impl IdentifyParams {
	pub fn new(website_id: impl Into<String>, user_id: impl Into<String>) -> Self {
		Self {
			website_id: website_id.into(),
			user_id: user_id.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.user_id, "user_id is required")
	}
}

/// Core Web Vitals metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebVitalMetric {
	Lcp,
	Inp,
	Cls,
	Ttfb,
	Fcp,
}

impl WebVitalMetric {
	pub fn as_str(&self) -> &'static str {
		match self {
			WebVitalMetric::Lcp => "LCP",
			WebVitalMetric::Inp => "INP",
			WebVitalMetric::Cls => "CLS",
			WebVitalMetric::Ttfb => "TTFB",
			WebVitalMetric::Fcp => "FCP",
		}
	}
}

impl fmt::Display for WebVitalMetric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<WebVitalMetric> for String {
	fn from(metric: WebVitalMetric) -> Self {
		metric.as_str().to_string()
	}
}

/// Rating buckets reported by the web-vitals library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalRating {
	Good,
	NeedsImprovement,
	Poor,
}

impl VitalRating {
	pub fn as_str(&self) -> &'static str {
		match self {
			VitalRating::Good => "good",
			VitalRating::NeedsImprovement => "needs-improvement",
			VitalRating::Poor => "poor",
		}
	}
}

impl fmt::Display for VitalRating {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<VitalRating> for String {
	fn from(rating: VitalRating) -> Self {
		rating.as_str().to_string()
	}
}

/// A single web-vital measurement.
///
/// `metric` and `rating` accept any non-empty string; the collector decides
/// what it understands. [`WebVitalMetric`] and [`VitalRating`] convert into
/// the canonical spellings.
#[derive(Debug, Clone, Default)]
pub struct VitalParams {
	pub website_id: String,
	pub metric: String,
	pub value: f64,
	pub rating: String,
	pub delta: Option<f64>,
	pub id: Option<String>,
	pub navigation_type: Option<String>,
	pub attribution: Option<Properties>,
	pub url: Option<String>,
	pub path: Option<String>,
	pub session_id: Option<String>,
}

impl VitalParams {
	pub fn new(
		website_id: impl Into<String>,
		metric: impl Into<String>,
		value: f64,
		rating: impl Into<String>,
	) -> Self {
		Self {
			website_id: website_id.into(),
			metric: metric.into(),
			value,
			rating: rating.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.metric, "metric is required (LCP, INP, CLS, TTFB, or FCP)")?;
		require(
			&self.rating,
			"rating is required (good, needs-improvement, or poor)",
		)?;
		if !self.value.is_finite() {
			return Err(EntrolyticsError::validation("value must be a finite number"));
		}
		if self.delta.is_some_and(|d| !d.is_finite()) {
			return Err(EntrolyticsError::validation("delta must be a finite number"));
		}
		Ok(())
	}
}

/// A form interaction (focus, blur, error, submit, ...).
#[derive(Debug, Clone, Default)]
pub struct FormEventParams {
	pub website_id: String,
	pub event_type: String,
	pub form_id: String,
	pub url_path: String,
	pub form_name: Option<String>,
	pub field_name: Option<String>,
	pub field_type: Option<String>,
	pub field_index: Option<i64>,
	/// Milliseconds spent on the field.
	pub time_on_field: Option<i64>,
	/// Milliseconds since the form was first touched.
	pub time_since_start: Option<i64>,
	pub error_message: Option<String>,
	pub success: Option<bool>,
	pub session_id: Option<String>,
}

impl FormEventParams {
	pub fn new(
		website_id: impl Into<String>,
		event_type: impl Into<String>,
		form_id: impl Into<String>,
		url_path: impl Into<String>,
	) -> Self {
		Self {
			website_id: website_id.into(),
			event_type: event_type.into(),
			form_id: form_id.into(),
			url_path: url_path.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.event_type, "event_type is required")?;
		require(&self.form_id, "form_id is required")?;
		require(&self.url_path, "url_path is required")
	}
}

/// Deployment marker for correlating metrics with releases.
#[derive(Debug, Clone, Default)]
pub struct DeploymentParams {
	pub website_id: String,
	pub deploy_id: String,
	pub git_sha: Option<String>,
	pub git_branch: Option<String>,
	pub deploy_url: Option<String>,
	/// Where the deploy came from, e.g. `vercel` or `github-actions`.
	pub source: Option<String>,
}

impl DeploymentParams {
	pub fn new(website_id: impl Into<String>, deploy_id: impl Into<String>) -> Self {
		Self {
			website_id: website_id.into(),
			deploy_id: deploy_id.into(),
			..Default::default()
		}
	}

	pub(crate) fn validate(&self) -> Result<()> {
		require(&self.website_id, "website_id is required")?;
		require(&self.deploy_id, "deploy_id is required")?;
		// Dot segments would be collapsed out of the deployments URL.
		if matches!(self.website_id.as_str(), "." | "..") {
			return Err(EntrolyticsError::validation("website_id must not be '.' or '..'"));
		}
		Ok(())
	}
}
