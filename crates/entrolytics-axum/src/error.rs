// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised while wiring the tracker at startup.
#[derive(Debug, Error)]
pub enum IntegrationError {
	#[error("failed to build Entrolytics client: {0}")]
	Client(#[from] entrolytics::EntrolyticsError),

	#[error("invalid excluded path pattern: {0}")]
	Pattern(#[from] glob::PatternError),
}
