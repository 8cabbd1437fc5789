// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Glob patterns for paths that should never be tracked.

use glob::{Pattern, PatternError};

/// Compiled set of excluded path patterns.
///
/// Patterns are matched against the request path without its leading slash,
/// so `admin/*` excludes `/admin/users`. The site root is matched as `/`.
/// `*` also spans `/`, so `api/*` excludes `/api/v1/users`.
#[derive(Debug, Clone, Default)]
pub struct PathExclusions {
	patterns: Vec<Pattern>,
}

impl PathExclusions {
	pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| Pattern::new(p.as_ref().trim_start_matches('/')))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { patterns })
	}

	pub fn is_excluded(&self, path: &str) -> bool {
		let trimmed = path.trim_start_matches('/');
		let candidate = if trimmed.is_empty() { "/" } else { trimmed };
		self.patterns.iter().any(|p| p.matches(candidate))
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}
}
