// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the Entrolytics SDK.
//!
//! Sources are merged in precedence order:
//!
//! 1. Built-in defaults
//! 2. TOML file (when a path is given and the file exists)
//! 3. `ENTROLYTICS_*` environment variables
//!
//! ```toml
//! website_id = "a1b2c3"
//! host = "https://ng.entrolytics.click"
//! timeout_secs = 10
//! excluded_paths = ["api/*", "admin/*"]
//! auto_track = true
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sources;

use std::path::Path;

use tracing::{debug, info};

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::{EntrolyticsConfig, EntrolyticsConfigLayer, DEFAULT_EXCLUDED_PATHS};
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, OverrideSource, Precedence, TomlSource,
};

/// Load configuration from defaults, an optional TOML file and the environment.
pub fn load_config(path: Option<&Path>) -> Result<EntrolyticsConfig, ConfigError> {
	load_config_with_overrides(path, EntrolyticsConfigLayer::default())
}

/// Like [`load_config`], with `overrides` applied last and validated along
/// with everything else.
pub fn load_config_with_overrides(
	path: Option<&Path>,
	overrides: EntrolyticsConfigLayer,
) -> Result<EntrolyticsConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(EnvSource::new()),
		Box::new(OverrideSource::new(overrides)),
	];
	if let Some(path) = path {
		sources.push(Box::new(TomlSource::new(path)));
	}
	load_from_sources(sources)
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<EntrolyticsConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource::new())])
}

/// Merge `sources` lowest precedence first, then finalize and validate.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<EntrolyticsConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = EntrolyticsConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let config = merged.finalize();
	validate(&config)?;

	info!(
		host = %config.host,
		website_id_set = config.website_id.is_some(),
		api_key_set = config.api_key.is_some(),
		auto_track = config.auto_track,
		"entrolytics configuration loaded"
	);
	Ok(config)
}

fn validate(config: &EntrolyticsConfig) -> Result<(), ConfigError> {
	if !(config.host.starts_with("http://") || config.host.starts_with("https://")) {
		return Err(ConfigError::Validation(format!(
			"host must start with http:// or https://, got '{}'",
			config.host
		)));
	}
	if config.timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"timeout_secs must be greater than zero".to_string(),
		));
	}
	Ok(())
}
