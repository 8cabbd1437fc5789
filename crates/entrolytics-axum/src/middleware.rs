// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::net::SocketAddr;

use axum::{
	extract::{ConnectInfo, Request, State},
	http::{header, HeaderMap, Uri},
	middleware::Next,
	response::Response,
};

use crate::tracker::{PageView, PageViewTracker};

/// Identity of the signed-in user, inserted as a request extension by the
/// application's auth layer. That layer must run before [`track_page_views`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Records a page view once the inner service has produced its response.
///
/// ```ignore
/// let app = Router::new()
/// 	.route("/", get(home))
/// 	.layer(axum::middleware::from_fn_with_state(tracker, track_page_views));
/// ```
///
/// The response is returned unchanged whether or not tracking succeeds.
pub async fn track_page_views(
	State(tracker): State<PageViewTracker>,
	request: Request,
	next: Next,
) -> Response {
	let method = request.method().clone();
	let path = request.uri().path().to_string();
	let full_url = full_url(request.headers(), request.uri());
	let referrer = header_value(request.headers(), header::REFERER);
	let user_agent = header_value(request.headers(), header::USER_AGENT);
	let ip = request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip());
	let user_id = request
		.extensions()
		.get::<AuthenticatedUser>()
		.map(|user| user.0.clone())
		.filter(|id| !id.is_empty());

	let response = next.run(request).await;

	let view = PageView {
		method,
		status: response.status(),
		path,
		full_url,
		referrer,
		user_agent,
		ip,
		user_id,
	};
	tracker.record(view).await;

	response
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
	headers
		.get(name)
		.and_then(|v| v.to_str().ok())
		.map(str::to_string)
		.filter(|v| !v.is_empty())
}

fn full_url(headers: &HeaderMap, uri: &Uri) -> String {
	let path_and_query = uri
		.path_and_query()
		.map(|pq| pq.as_str())
		.unwrap_or("/");

	let host = header_value(headers, header::HOST)
		.or_else(|| uri.authority().map(|a| a.to_string()));
	let Some(host) = host else {
		return path_and_query.to_string();
	};

	let scheme = headers
		.get("x-forwarded-proto")
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.split(',').next())
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_string)
		.or_else(|| uri.scheme_str().map(str::to_string))
		.unwrap_or_else(|| "http".to_string());

	format!("{scheme}://{host}{path_and_query}")
}
