// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Entrolytics SDK.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Message used when the collector rejects the credential.
pub const AUTHENTICATION_MESSAGE: &str = "Invalid or missing API key";
/// Fallback message for a 400 response without a readable `error` field.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";
/// Message used for 429 responses.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// Errors returned by every [`AnalyticsClient`](crate::AnalyticsClient) call.
///
/// Callers usually branch on [`EntrolyticsError::kind`]:
///
/// ```ignore
/// match client.track(params).await {
///     Ok(()) => {}
///     Err(e) if e.kind() == ErrorKind::RateLimit => {
///         let wait = e.retry_after().unwrap_or(Duration::from_secs(60));
///         // schedule the event again after `wait`
///     }
///     Err(e) => tracing::warn!(error = %e, "tracking failed"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum EntrolyticsError {
	/// The API key is missing, malformed, or rejected by the collector (401).
	#[error("{message}")]
	Authentication { message: String },

	/// Caller input was incomplete, or the collector rejected the payload (400).
	#[error("{message}")]
	Validation { message: String },

	/// The collector throttled the request (429).
	#[error("{message}")]
	RateLimit {
		message: String,
		/// Seconds from the `Retry-After` header, when it held an integer.
		retry_after_secs: Option<u64>,
	},

	/// No response was received: connection, DNS, TLS, or timeout failure.
	#[error("{message}")]
	Network {
		message: String,
		#[source]
		source: reqwest::Error,
	},

	/// Any other non-success status.
	#[error("{message}")]
	Generic { message: String, status: u16 },
}

/// Discriminant of [`EntrolyticsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	Authentication,
	Validation,
	RateLimit,
	Network,
	Generic,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::Authentication => "authentication",
			ErrorKind::Validation => "validation",
			ErrorKind::RateLimit => "rate_limit",
			ErrorKind::Network => "network",
			ErrorKind::Generic => "generic",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl EntrolyticsError {
	pub fn authentication(message: impl Into<String>) -> Self {
		EntrolyticsError::Authentication {
			message: message.into(),
		}
	}

	pub fn validation(message: impl Into<String>) -> Self {
		EntrolyticsError::Validation {
			message: message.into(),
		}
	}

	pub fn rate_limit(retry_after_secs: Option<u64>) -> Self {
		EntrolyticsError::RateLimit {
			message: RATE_LIMIT_MESSAGE.to_string(),
			retry_after_secs,
		}
	}

	/// Wraps a transport failure that produced no response.
	pub fn network(source: reqwest::Error) -> Self {
		EntrolyticsError::Network {
			message: format!("Request failed: {source}"),
			source,
		}
	}

	/// The HTTP client could not be constructed; nothing was sent.
	pub fn client_setup(source: reqwest::Error) -> Self {
		EntrolyticsError::Network {
			message: format!("Failed to initialize HTTP client: {source}"),
			source,
		}
	}

	pub fn generic(status: u16) -> Self {
		EntrolyticsError::Generic {
			message: format!("Request failed with status {status}"),
			status,
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			EntrolyticsError::Authentication { .. } => ErrorKind::Authentication,
			EntrolyticsError::Validation { .. } => ErrorKind::Validation,
			EntrolyticsError::RateLimit { .. } => ErrorKind::RateLimit,
			EntrolyticsError::Network { .. } => ErrorKind::Network,
			EntrolyticsError::Generic { .. } => ErrorKind::Generic,
		}
	}

	/// Human-readable message, identical to the `Display` output.
	pub fn message(&self) -> &str {
		match self {
			EntrolyticsError::Authentication { message }
			| EntrolyticsError::Validation { message }
			| EntrolyticsError::RateLimit { message, .. }
			| EntrolyticsError::Network { message, .. }
			| EntrolyticsError::Generic { message, .. } => message,
		}
	}

	/// HTTP status associated with the error. Network failures have none.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			EntrolyticsError::Authentication { .. } => Some(401),
			EntrolyticsError::Validation { .. } => Some(400),
			EntrolyticsError::RateLimit { .. } => Some(429),
			EntrolyticsError::Network { .. } => None,
			EntrolyticsError::Generic { status, .. } => Some(*status),
		}
	}

	/// Minimum wait before retrying a rate-limited call, if the collector said.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			EntrolyticsError::RateLimit {
				retry_after_secs, ..
			} => retry_after_secs.map(Duration::from_secs),
			_ => None,
		}
	}

	/// Whether retrying the same call later can succeed.
	///
	/// The SDK never retries on its own; this is advice for the caller.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			EntrolyticsError::RateLimit { .. } | EntrolyticsError::Network { .. }
		)
	}
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, EntrolyticsError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_kind_matches_variant() {
		assert_eq!(
			EntrolyticsError::authentication("x").kind(),
			ErrorKind::Authentication
		);
		assert_eq!(EntrolyticsError::validation("x").kind(), ErrorKind::Validation);
		assert_eq!(EntrolyticsError::rate_limit(None).kind(), ErrorKind::RateLimit);
		assert_eq!(EntrolyticsError::generic(503).kind(), ErrorKind::Generic);
	}

	fn builder_error() -> reqwest::Error {
		reqwest::Client::new()
			.post("not a url")
			.build()
			.unwrap_err()
	}

	#[test]
	fn test_client_setup_message_does_not_claim_a_request() {
		let err = EntrolyticsError::client_setup(builder_error());
		assert!(err.to_string().starts_with("Failed to initialize HTTP client: "));
		assert_eq!(err.kind(), ErrorKind::Network);

		let err = EntrolyticsError::network(builder_error());
		assert!(err.to_string().starts_with("Request failed: "));
	}

	#[test]
	fn test_generic_message_and_status() {
		let err = EntrolyticsError::generic(503);
		assert_eq!(err.to_string(), "Request failed with status 503");
		assert_eq!(err.status_code(), Some(503));
		assert!(!err.is_retryable());
	}

	#[test]
	fn test_rate_limit_retry_after() {
		let err = EntrolyticsError::rate_limit(Some(30));
		assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
		assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
		assert_eq!(err.status_code(), Some(429));
		assert!(err.is_retryable());

		assert_eq!(EntrolyticsError::rate_limit(None).retry_after(), None);
	}

	#[test]
	fn test_validation_not_retryable() {
		let err = EntrolyticsError::validation("website_id is required");
		assert_eq!(err.message(), "website_id is required");
		assert_eq!(err.status_code(), Some(400));
		assert!(!err.is_retryable());
		assert_eq!(err.retry_after(), None);
	}

	#[test]
	fn test_authentication_not_retryable() {
		let err = EntrolyticsError::authentication(AUTHENTICATION_MESSAGE);
		assert_eq!(err.status_code(), Some(401));
		assert!(!err.is_retryable());
	}

	#[test]
	fn test_kind_display() {
		assert_eq!(ErrorKind::RateLimit.to_string(), "rate_limit");
		assert_eq!(ErrorKind::Network.as_str(), "network");
	}
}
