// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use anyhow::{anyhow, Result};
use entrolytics::{
	DeploymentParams, EntrolyticsError, FormEventParams, IdentifyParams, PageViewParams, Properties,
	TrackParams, VitalParams, VitalRating, WebVitalMetric,
};
use entrolytics_config::EntrolyticsConfig;
use serde_json::Value;
use tracing::debug;

use crate::Command;

/// `KEY=VALUE` pair. The value is parsed as JSON when it is valid JSON,
/// otherwise kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyArg {
	key: String,
	value: Value,
}

impl FromStr for PropertyArg {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (key, raw) = s
			.split_once('=')
			.ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
		if key.is_empty() {
			return Err(format!("empty key in '{s}'"));
		}
		let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
		Ok(Self {
			key: key.to_string(),
			value,
		})
	}
}

fn properties(args: Vec<PropertyArg>) -> Properties {
	args.into_iter().map(|p| (p.key, p.value)).collect()
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum MetricArg {
	Lcp,
	Inp,
	Cls,
	Ttfb,
	Fcp,
}

impl From<MetricArg> for WebVitalMetric {
	fn from(m: MetricArg) -> Self {
		match m {
			MetricArg::Lcp => WebVitalMetric::Lcp,
			MetricArg::Inp => WebVitalMetric::Inp,
			MetricArg::Cls => WebVitalMetric::Cls,
			MetricArg::Ttfb => WebVitalMetric::Ttfb,
			MetricArg::Fcp => WebVitalMetric::Fcp,
		}
	}
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum RatingArg {
	Good,
	NeedsImprovement,
	Poor,
}

impl From<RatingArg> for VitalRating {
	fn from(r: RatingArg) -> Self {
		match r {
			RatingArg::Good => VitalRating::Good,
			RatingArg::NeedsImprovement => VitalRating::NeedsImprovement,
			RatingArg::Poor => VitalRating::Poor,
		}
	}
}

#[derive(clap::Args, Debug)]
pub struct VitalArgs {
	#[arg(value_enum)]
	metric: MetricArg,
	value: f64,
	#[arg(value_enum)]
	rating: RatingArg,
	#[arg(long, allow_negative_numbers = true)]
	delta: Option<f64>,
	/// Metric instance id
	#[arg(long)]
	id: Option<String>,
	#[arg(long)]
	navigation_type: Option<String>,
	/// Attribution entry (repeatable: -a KEY=VALUE)
	#[arg(long = "attribution", short = 'a', value_name = "KEY=VALUE")]
	attribution: Vec<PropertyArg>,
	#[arg(long)]
	url: Option<String>,
	#[arg(long)]
	path: Option<String>,
	#[arg(long)]
	session_id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FormArgs {
	/// Interaction type: start, field_focus, field_blur, field_error, submit, abandon
	event_type: String,
	#[arg(long)]
	form_id: String,
	#[arg(long)]
	url_path: String,
	#[arg(long)]
	form_name: Option<String>,
	#[arg(long)]
	field_name: Option<String>,
	#[arg(long)]
	field_type: Option<String>,
	#[arg(long)]
	field_index: Option<i64>,
	/// Milliseconds spent on the field
	#[arg(long)]
	time_on_field: Option<i64>,
	/// Milliseconds since the form was first touched
	#[arg(long)]
	time_since_start: Option<i64>,
	#[arg(long)]
	error_message: Option<String>,
	#[arg(long)]
	success: Option<bool>,
	#[arg(long)]
	session_id: Option<String>,
}

pub(crate) async fn run(command: Command, config: &EntrolyticsConfig) -> Result<()> {
	let client = config.client().map_err(describe)?;
	let website_id = config.website_id.clone().unwrap_or_default();

	let (label, result) = match command {
		Command::Track {
			event,
			data,
			url,
			referrer,
			user_id,
			session_id,
		} => {
			let params = TrackParams {
				data: properties(data),
				url,
				referrer,
				user_id,
				session_id,
				..TrackParams::new(website_id, event)
			};
			("event", client.track(params).await)
		}
		Command::PageView {
			url,
			referrer,
			title,
			user_id,
			session_id,
		} => {
			let params = PageViewParams {
				referrer,
				title,
				user_id,
				session_id,
				..PageViewParams::new(website_id, url)
			};
			("page view", client.page_view(params).await)
		}
		Command::Identify { user_id, traits } => {
			let params = IdentifyParams {
				traits: properties(traits),
				..IdentifyParams::new(website_id, user_id)
			};
			("identify", client.identify(params).await)
		}
		Command::Vital(args) => {
			let attribution = (!args.attribution.is_empty()).then(|| properties(args.attribution));
			let params = VitalParams {
				delta: args.delta,
				id: args.id,
				navigation_type: args.navigation_type,
				attribution,
				url: args.url,
				path: args.path,
				session_id: args.session_id,
				..VitalParams::new(
					website_id,
					WebVitalMetric::from(args.metric),
					args.value,
					VitalRating::from(args.rating),
				)
			};
			("vital", client.track_vital(params).await)
		}
		Command::Form(args) => {
			let params = FormEventParams {
				form_name: args.form_name,
				field_name: args.field_name,
				field_type: args.field_type,
				field_index: args.field_index,
				time_on_field: args.time_on_field,
				time_since_start: args.time_since_start,
				error_message: args.error_message,
				success: args.success,
				session_id: args.session_id,
				..FormEventParams::new(website_id, args.event_type, args.form_id, args.url_path)
			};
			("form event", client.track_form_event(params).await)
		}
		Command::Deploy {
			deploy_id,
			git_sha,
			git_branch,
			deploy_url,
			source,
		} => {
			let params = DeploymentParams {
				git_sha,
				git_branch,
				deploy_url,
				source,
				..DeploymentParams::new(website_id, deploy_id)
			};
			("deployment", client.set_deployment(params).await)
		}
	};

	result.map_err(describe)?;
	debug!(kind = label, "sent");
	println!("{label} sent");
	Ok(())
}

fn describe(err: EntrolyticsError) -> anyhow::Error {
	match err.retry_after() {
		Some(wait) => anyhow!("{err} (retry after {}s)", wait.as_secs()),
		None => anyhow!("{} error: {err}", err.kind()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_property_parses_json_values() {
		let p: PropertyArg = "seats=3".parse().unwrap();
		assert_eq!(p.value, json!(3));
		let p: PropertyArg = "beta=true".parse().unwrap();
		assert_eq!(p.value, json!(true));
		let p: PropertyArg = "tags=[\"a\",\"b\"]".parse().unwrap();
		assert_eq!(p.value, json!(["a", "b"]));
	}

	#[test]
	fn test_property_falls_back_to_string() {
		let p: PropertyArg = "plan=pro".parse().unwrap();
		assert_eq!(p.key, "plan");
		assert_eq!(p.value, json!("pro"));
		let p: PropertyArg = "expr=a=b".parse().unwrap();
		assert_eq!(p.value, json!("a=b"));
		let p: PropertyArg = "empty=".parse().unwrap();
		assert_eq!(p.value, json!(""));
	}

	#[test]
	fn test_property_rejects_missing_separator_or_key() {
		assert!("plan".parse::<PropertyArg>().is_err());
		assert!("=pro".parse::<PropertyArg>().is_err());
	}

	#[test]
	fn test_properties_later_keys_win() {
		let props = properties(vec![
			"plan=free".parse().unwrap(),
			"plan=pro".parse().unwrap(),
		]);
		assert_eq!(props.len(), 1);
		assert_eq!(props.get("plan"), Some(&json!("pro")));
	}

	#[test]
	fn test_describe_rate_limit_includes_hint() {
		let err = describe(EntrolyticsError::rate_limit(Some(30)));
		assert_eq!(err.to_string(), "Rate limit exceeded (retry after 30s)");
	}

	#[test]
	fn test_describe_prefixes_kind() {
		let err = describe(EntrolyticsError::authentication("API key is required"));
		assert_eq!(err.to_string(), "authentication error: API key is required");
	}

	#[test]
	fn test_metric_and_rating_map_to_wire_names() {
		assert_eq!(WebVitalMetric::from(MetricArg::Ttfb).as_str(), "TTFB");
		assert_eq!(
			VitalRating::from(RatingArg::NeedsImprovement).as_str(),
			"needs-improvement"
		);
	}

	proptest! {
		#[test]
		fn plain_words_stay_strings(key in "[a-z_]{1,12}", word in "[a-z]{1,12}") {
			prop_assume!(word != "true" && word != "false" && word != "null");
			let p: PropertyArg = format!("{key}={word}").parse().unwrap();
			prop_assert_eq!(p.key, key);
			prop_assert_eq!(p.value, Value::String(word));
		}
	}
}
