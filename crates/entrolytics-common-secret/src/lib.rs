// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials such as the Entrolytics API key.
//!
//! [`Secret<T>`] keeps the wrapped value out of `Debug`, `Display` and
//! serialized output, zeroizes it on drop, and only hands it out through an
//! explicit [`Secret::expose`] call.
//!
//! ```
//! use entrolytics_common_secret::SecretString;
//!
//! let api_key = SecretString::new("ent_live_abc123".to_string());
//!
//! assert_eq!(format!("{api_key}"), "[REDACTED]");
//! assert_eq!(format!("{api_key:?}"), "Secret(\"[REDACTED]\")");
//! assert_eq!(api_key.expose(), "ent_live_abc123");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be logged.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// Secret strings (API keys, tokens).
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// True when the wrapped string is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Secret::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	// Config dumps must never contain the key.
	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let key = SecretString::from("ent_live_super_secret");

		assert_eq!(format!("{key}"), REDACTED);
		assert!(!format!("{key:?}").contains("ent_live_super_secret"));
		assert!(!format!("{:?}", Some(key.clone())).contains("ent_live_super_secret"));
	}

	#[test]
	fn expose_returns_inner_value() {
		let key = SecretString::from("ent_live_abc");
		assert_eq!(key.expose(), "ent_live_abc");
		assert!(!key.is_empty());
		assert!(SecretString::from("").is_empty());
	}

	#[test]
	fn equality_compares_inner_values() {
		assert_eq!(SecretString::from("a"), SecretString::from("a"));
		assert_ne!(SecretString::from("a"), SecretString::from("b"));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serialize_is_redacted_and_deserialize_keeps_value() {
		let json = serde_json::to_string(&SecretString::from("ent_live_abc")).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));

		let parsed: SecretString = serde_json::from_str("\"ent_live_abc\"").unwrap();
		assert_eq!(parsed.expose(), "ent_live_abc");
	}

	proptest! {
		#[test]
		fn formatted_output_never_contains_key(suffix in "[a-z0-9]{8,40}") {
			let raw = format!("ent_{suffix}");
			let key = SecretString::new(raw.clone());
			prop_assert!(!format!("{key}").contains(&raw), "Display leaked raw key");
			prop_assert!(!format!("{key:?}").contains(&raw), "Debug leaked raw key");
		}
	}
}
