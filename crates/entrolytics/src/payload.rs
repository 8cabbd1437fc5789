// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire payloads posted to the collector.
//!
//! Field names are camelCase on the wire. Absent optional fields are
//! omitted rather than sent as `null`.

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde::Serialize;

use crate::params::{
	DeploymentParams, FormEventParams, IdentifyParams, PageViewParams, TrackParams, VitalParams,
};
use crate::properties::Properties;

/// Event name used for page views.
pub const PAGEVIEW_EVENT: &str = "$pageview";

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}

/// ISO-8601 timestamp with an explicit offset, e.g. `2025-01-31T09:15:00+00:00`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
	Tz: TimeZone,
	Tz::Offset: std::fmt::Display,
{
	at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Envelope type for `/api/send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeType {
	Event,
	Identify,
}

/// Body of `/api/send` requests.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<P> {
	#[serde(rename = "type")]
	pub kind: EnvelopeType,
	pub payload: P,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
	pub website: String,
	pub name: String,
	pub data: Properties,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub referrer: Option<String>,
	pub timestamp: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPayload {
	pub website: String,
	pub user_id: String,
	pub traits: Properties,
	pub timestamp: String,
}

impl Envelope<EventPayload> {
	pub fn track(params: TrackParams, timestamp: String) -> Self {
		Self {
			kind: EnvelopeType::Event,
			payload: EventPayload {
				website: params.website_id,
				name: params.event,
				data: params.data,
				url: non_empty(params.url),
				referrer: non_empty(params.referrer),
				timestamp,
				user_id: non_empty(params.user_id),
				session_id: non_empty(params.session_id),
			},
		}
	}

	pub fn page_view(params: PageViewParams, timestamp: String) -> Self {
		let data = match non_empty(params.title) {
			Some(title) => Properties::new().insert("title", title),
			None => Properties::new(),
		};

		Self {
			kind: EnvelopeType::Event,
			payload: EventPayload {
				website: params.website_id,
				name: PAGEVIEW_EVENT.to_string(),
				data,
				url: Some(params.url),
				referrer: non_empty(params.referrer),
				timestamp,
				user_id: non_empty(params.user_id),
				session_id: non_empty(params.session_id),
			},
		}
	}
}

impl Envelope<IdentifyPayload> {
	pub fn identify(params: IdentifyParams, timestamp: String) -> Self {
		Self {
			kind: EnvelopeType::Identify,
			payload: IdentifyPayload {
				website: params.website_id,
				user_id: params.user_id,
				traits: params.traits,
				timestamp,
			},
		}
	}
}

/// Body of `/api/collect/vitals`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalReport {
	pub website: String,
	pub metric: String,
	pub value: f64,
	pub rating: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delta: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub navigation_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub attribution: Option<Properties>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl From<VitalParams> for VitalReport {
	fn from(params: VitalParams) -> Self {
		Self {
			website: params.website_id,
			metric: params.metric,
			value: params.value,
			rating: params.rating,
			delta: params.delta,
			id: non_empty(params.id),
			navigation_type: non_empty(params.navigation_type),
			attribution: params.attribution.filter(|a| !a.is_empty()),
			url: non_empty(params.url),
			path: non_empty(params.path),
			session_id: non_empty(params.session_id),
		}
	}
}

/// Body of `/api/collect/forms`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEvent {
	pub website: String,
	pub event_type: String,
	pub form_id: String,
	pub url_path: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub form_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field_index: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub time_on_field: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub time_since_start: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub success: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl From<FormEventParams> for FormEvent {
	fn from(params: FormEventParams) -> Self {
		Self {
			website: params.website_id,
			event_type: params.event_type,
			form_id: params.form_id,
			url_path: params.url_path,
			form_name: non_empty(params.form_name),
			field_name: non_empty(params.field_name),
			field_type: non_empty(params.field_type),
			field_index: params.field_index,
			time_on_field: params.time_on_field,
			time_since_start: params.time_since_start,
			error_message: non_empty(params.error_message),
			success: params.success,
			session_id: non_empty(params.session_id),
		}
	}
}

/// Body of `/api/websites/{id}/deployments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
	pub website: String,
	pub deploy_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub git_sha: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub git_branch: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deploy_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

impl From<DeploymentParams> for DeploymentRecord {
	fn from(params: DeploymentParams) -> Self {
		Self {
			website: params.website_id,
			deploy_id: params.deploy_id,
			git_sha: non_empty(params.git_sha),
			git_branch: non_empty(params.git_branch),
			deploy_url: non_empty(params.deploy_url),
			source: non_empty(params.source),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{FixedOffset, Utc};
	use serde_json::{json, Value};

	const TS: &str = "2025-01-31T09:15:00+00:00";

	fn to_json<T: Serialize>(value: &T) -> Value {
		serde_json::to_value(value).unwrap()
	}

	#[test]
	fn test_timestamp_has_explicit_offset() {
		let utc = Utc.with_ymd_and_hms(2025, 1, 31, 9, 15, 0).unwrap();
		assert_eq!(format_timestamp(&utc), TS);

		let cet = FixedOffset::east_opt(3600).unwrap();
		assert_eq!(
			format_timestamp(&utc.with_timezone(&cet)),
			"2025-01-31T10:15:00+01:00"
		);
	}

	#[test]
	fn test_track_envelope_minimal() {
		let envelope = Envelope::track(TrackParams::new("w1", "signup"), TS.to_string());
		assert_eq!(
			to_json(&envelope),
			json!({
				"type": "event",
				"payload": {
					"website": "w1",
					"name": "signup",
					"data": {},
					"timestamp": TS,
				}
			})
		);
	}

	#[test]
	fn test_track_envelope_drops_empty_strings() {
		let params = TrackParams {
			url: Some("https://shop.test/cart".into()),
			referrer: Some(String::new()),
			user_id: Some("u_1".into()),
			session_id: Some(String::new()),
			data: Properties::new().insert("revenue", 99.99),
			..TrackParams::new("w1", "purchase")
		};
		let body = to_json(&Envelope::track(params, TS.to_string()));

		assert_eq!(body["payload"]["url"], "https://shop.test/cart");
		assert_eq!(body["payload"]["userId"], "u_1");
		assert_eq!(body["payload"]["data"]["revenue"], 99.99);
		assert!(body["payload"].get("referrer").is_none());
		assert!(body["payload"].get("sessionId").is_none());
	}

	#[test]
	fn test_page_view_without_title_or_referrer() {
		let body = to_json(&Envelope::page_view(
			PageViewParams::new("w1", "/x"),
			TS.to_string(),
		));

		assert_eq!(body["payload"]["name"], PAGEVIEW_EVENT);
		assert_eq!(body["payload"]["data"], json!({}));
		assert_eq!(body["payload"]["url"], "/x");
		assert!(body["payload"].get("referrer").is_none());
	}

	#[test]
	fn test_page_view_with_title_and_referrer() {
		let params = PageViewParams {
			title: Some("Pricing".into()),
			referrer: Some("r".into()),
			..PageViewParams::new("w1", "/pricing")
		};
		let body = to_json(&Envelope::page_view(params, TS.to_string()));

		assert_eq!(body["payload"]["data"], json!({"title": "Pricing"}));
		assert_eq!(body["payload"]["referrer"], "r");
	}

	#[test]
	fn test_identify_envelope() {
		let params = IdentifyParams {
			traits: Properties::new().insert("plan", "pro"),
			..IdentifyParams::new("w1", "u_1")
		};
		assert_eq!(
			to_json(&Envelope::identify(params, TS.to_string())),
			json!({
				"type": "identify",
				"payload": {
					"website": "w1",
					"userId": "u_1",
					"traits": {"plan": "pro"},
					"timestamp": TS,
				}
			})
		);
	}

	#[test]
	fn test_vital_keeps_zero_delta_and_drops_empty_attribution() {
		let params = VitalParams {
			delta: Some(0.0),
			attribution: Some(Properties::new()),
			navigation_type: Some("navigate".into()),
			..VitalParams::new("w1", "CLS", 0.02, "good")
		};
		assert_eq!(
			to_json(&VitalReport::from(params)),
			json!({
				"website": "w1",
				"metric": "CLS",
				"value": 0.02,
				"rating": "good",
				"delta": 0.0,
				"navigationType": "navigate",
			})
		);
	}

	#[test]
	fn test_form_event_sends_falsy_values_when_set() {
		let params = FormEventParams {
			field_index: Some(0),
			time_on_field: Some(0),
			success: Some(false),
			field_name: Some(String::new()),
			..FormEventParams::new("w1", "submit", "signup", "/join")
		};
		assert_eq!(
			to_json(&FormEvent::from(params)),
			json!({
				"website": "w1",
				"eventType": "submit",
				"formId": "signup",
				"urlPath": "/join",
				"fieldIndex": 0,
				"timeOnField": 0,
				"success": false,
			})
		);
	}

	#[test]
	fn test_deployment_minimal_has_no_extra_keys() {
		assert_eq!(
			to_json(&DeploymentRecord::from(DeploymentParams::new("w1", "d1"))),
			json!({"website": "w1", "deployId": "d1"})
		);
	}

	#[test]
	fn test_deployment_full() {
		let params = DeploymentParams {
			git_sha: Some("abc1234".into()),
			git_branch: Some("main".into()),
			deploy_url: Some("https://preview.shop.test".into()),
			source: Some("github-actions".into()),
			..DeploymentParams::new("w1", "d1")
		};
		let body = to_json(&DeploymentRecord::from(params));
		assert_eq!(body["gitSha"], "abc1234");
		assert_eq!(body["gitBranch"], "main");
		assert_eq!(body["deployUrl"], "https://preview.shop.test");
		assert_eq!(body["source"], "github-actions");
	}
}
