// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTML tag that loads the collector's browser script.

use entrolytics_config::EntrolyticsConfig;

/// Render the `<script>` tag for `website_id`, or `None` if it is empty.
///
/// ```
/// let tag = entrolytics_axum::script_tag("https://ng.entrolytics.click/", "a1b2").unwrap();
/// assert_eq!(
/// 	tag,
/// 	r#"<script src="https://ng.entrolytics.click/script.js" data-website-id="a1b2" defer></script>"#
/// );
/// ```
pub fn script_tag(host: &str, website_id: &str) -> Option<String> {
	if website_id.is_empty() {
		return None;
	}

	let host = host.trim_end_matches('/');
	Some(format!(
		r#"<script src="{}/script.js" data-website-id="{}" defer></script>"#,
		escape_attribute(host),
		escape_attribute(website_id)
	))
}

/// [`script_tag`] using the configured host and website id.
pub fn script_tag_from_config(config: &EntrolyticsConfig) -> Option<String> {
	script_tag(&config.host, config.website_id.as_deref()?)
}

fn escape_attribute(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_website_id_renders_nothing() {
		assert_eq!(script_tag("https://ng.entrolytics.click", ""), None);
	}

	#[test]
	fn test_trailing_slashes_are_trimmed() {
		let tag = script_tag("https://stats.example.com//", "w1").unwrap();
		assert!(tag.starts_with(r#"<script src="https://stats.example.com/script.js""#));
	}

	#[test]
	fn test_attributes_are_escaped() {
		let tag = script_tag("https://stats.example.com", r#""><script>alert(1)</script>"#).unwrap();
		assert!(!tag.contains("<script>alert"));
		assert!(tag.contains("data-website-id=\"&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;\""));
	}

	#[test]
	fn test_from_config() {
		let mut config = EntrolyticsConfig::default();
		assert_eq!(script_tag_from_config(&config), None);

		config.website_id = Some("w1".to_string());
		assert_eq!(
			script_tag_from_config(&config).unwrap(),
			r#"<script src="https://ng.entrolytics.click/script.js" data-website-id="w1" defer></script>"#
		);
	}
}
