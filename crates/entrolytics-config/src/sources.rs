// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::load_secret_with;
use crate::error::ConfigError;
use crate::layer::EntrolyticsConfigLayer;

pub const ENV_WEBSITE_ID: &str = "ENTROLYTICS_WEBSITE_ID";
pub const ENV_API_KEY: &str = "ENTROLYTICS_API_KEY";
pub const ENV_HOST: &str = "ENTROLYTICS_HOST";
pub const ENV_TIMEOUT: &str = "ENTROLYTICS_TIMEOUT";
pub const ENV_EXCLUDED_PATHS: &str = "ENTROLYTICS_EXCLUDED_PATHS";
pub const ENV_AUTO_TRACK: &str = "ENTROLYTICS_AUTO_TRACK";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<EntrolyticsConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<EntrolyticsConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied in finalize.
		Ok(EntrolyticsConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<EntrolyticsConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(EntrolyticsConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: EntrolyticsConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Reads the `ENTROLYTICS_*` variables from the process environment, or from
/// a fixed map when built with [`EnvSource::from_vars`]. Empty values count
/// as unset.
#[derive(Debug, Default)]
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn bool_var(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		match self.var(name) {
			Some(v) => match v.trim().to_ascii_lowercase().as_str() {
				"true" | "1" | "yes" | "on" => Ok(Some(true)),
				"false" | "0" | "no" | "off" => Ok(Some(false)),
				_ => Err(ConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid boolean value '{v}'"),
				}),
			},
			None => Ok(None),
		}
	}

	fn u64_var(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		match self.var(name) {
			Some(v) => v
				.trim()
				.parse()
				.map(Some)
				.map_err(|_| ConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid u64 value '{v}'"),
				}),
			None => Ok(None),
		}
	}

	fn list_var(&self, name: &str) -> Option<Vec<String>> {
		self.var(name).map(|v| {
			v.split(',')
				.map(str::trim)
				.filter(|p| !p.is_empty())
				.map(str::to_string)
				.collect()
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<EntrolyticsConfigLayer, ConfigError> {
		debug!("loading environment variables");

		let api_key = load_secret_with(ENV_API_KEY, |name| self.var(name))?;
		if api_key.is_some() {
			trace!("loaded API key from environment");
		}

		Ok(EntrolyticsConfigLayer {
			website_id: self.var(ENV_WEBSITE_ID),
			api_key,
			host: self.var(ENV_HOST),
			timeout_secs: self.u64_var(ENV_TIMEOUT)?,
			excluded_paths: self.list_var(ENV_EXCLUDED_PATHS),
			auto_track: self.bool_var(ENV_AUTO_TRACK)?,
		})
	}
}

/// Explicit overrides, e.g. command-line flags. Wins over every other source.
#[derive(Debug, Default)]
pub struct OverrideSource {
	layer: EntrolyticsConfigLayer,
}

impl OverrideSource {
	pub fn new(layer: EntrolyticsConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for OverrideSource {
	fn name(&self) -> &'static str {
		"overrides"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<EntrolyticsConfigLayer, ConfigError> {
		debug!("applying configuration overrides");
		Ok(self.layer.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, EntrolyticsConfigLayer::default());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/entrolytics.toml");
		assert_eq!(source.load().unwrap(), EntrolyticsConfigLayer::default());
	}

	#[test]
	fn test_toml_source_parses_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
website_id = "w1"
api_key = "ent_file"
host = "https://stats.example.com"
timeout_secs = 5
excluded_paths = ["admin/*"]
auto_track = false
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.website_id.as_deref(), Some("w1"));
		assert_eq!(layer.api_key.as_ref().unwrap().expose(), "ent_file");
		assert_eq!(layer.host.as_deref(), Some("https://stats.example.com"));
		assert_eq!(layer.timeout_secs, Some(5));
		assert_eq!(layer.excluded_paths, Some(vec!["admin/*".to_string()]));
		assert_eq!(layer.auto_track, Some(false));
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "timeout_secs = \"soon\"").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_source_reads_all_variables() {
		let source = EnvSource::from_vars([
			(ENV_WEBSITE_ID, "w1"),
			(ENV_API_KEY, "ent_env"),
			(ENV_HOST, "https://stats.example.com/"),
			(ENV_TIMEOUT, "7"),
			(ENV_EXCLUDED_PATHS, "admin/*, health ,,"),
			(ENV_AUTO_TRACK, "1"),
		]);
		let layer = source.load().unwrap();
		assert_eq!(layer.website_id.as_deref(), Some("w1"));
		assert_eq!(layer.api_key.as_ref().unwrap().expose(), "ent_env");
		assert_eq!(layer.host.as_deref(), Some("https://stats.example.com/"));
		assert_eq!(layer.timeout_secs, Some(7));
		assert_eq!(
			layer.excluded_paths,
			Some(vec!["admin/*".to_string(), "health".to_string()])
		);
		assert_eq!(layer.auto_track, Some(true));
	}

	#[test]
	fn test_env_source_ignores_empty_values() {
		let source = EnvSource::from_vars([(ENV_WEBSITE_ID, ""), (ENV_API_KEY, "")]);
		let layer = source.load().unwrap();
		assert!(layer.website_id.is_none());
		assert!(layer.api_key.is_none());
	}

	#[test]
	fn test_env_source_reads_key_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "ent_mounted").unwrap();

		let path = file.path().display().to_string();
		let source = EnvSource::from_vars([("ENTROLYTICS_API_KEY_FILE", path.as_str())]);
		let layer = source.load().unwrap();
		assert_eq!(layer.api_key.unwrap().expose(), "ent_mounted");
	}

	#[test]
	fn test_env_source_rejects_bad_timeout() {
		let err = EnvSource::from_vars([(ENV_TIMEOUT, "ten")])
			.load()
			.unwrap_err();
		assert!(
			matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_TIMEOUT)
		);
	}

	#[test]
	fn test_env_source_rejects_bad_bool() {
		let err = EnvSource::from_vars([(ENV_AUTO_TRACK, "maybe")])
			.load()
			.unwrap_err();
		assert!(
			matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_AUTO_TRACK)
		);
	}

	proptest! {
		#[test]
		fn env_timeout_round_trips_any_u64(secs in any::<u64>()) {
			let value = secs.to_string();
			let layer = EnvSource::from_vars([(ENV_TIMEOUT, value.as_str())]).load().unwrap();
			prop_assert_eq!(layer.timeout_secs, Some(secs));
		}
	}
}
