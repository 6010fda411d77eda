// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host configuration for the guard and its translator.

use std::path::PathBuf;

use tracemap_symbolicate::{TraceTranslator, DEFAULT_BUNDLE_SENTINEL, DEFAULT_MAP_FILE};

use crate::error::{ConfigError, Result};

pub const MAP_PATH_ENV: &str = "TRACEMAP_MAP_PATH";
pub const BUNDLE_SENTINEL_ENV: &str = "TRACEMAP_BUNDLE_SENTINEL";
pub const RESTRICTED_ENV: &str = "TRACEMAP_RESTRICTED";

const DEFAULT_COLOR: &str = "red";

/// How a [`LoopGuard`](crate::LoopGuard) reports contained failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
	/// Set when the host runs in a mode where source maps cannot work; the
	/// raw trace is logged instead of a translated one.
	pub restricted: bool,
	/// CSS color of the logged span.
	pub color: String,
}

impl Default for GuardOptions {
	fn default() -> Self {
		Self {
			restricted: false,
			color: DEFAULT_COLOR.to_string(),
		}
	}
}

impl GuardOptions {
	pub fn restricted(mut self, restricted: bool) -> Self {
		self.restricted = restricted;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracemapConfig {
	pub map_path: PathBuf,
	pub bundle_sentinel: String,
	pub restricted: bool,
}

impl Default for TracemapConfig {
	fn default() -> Self {
		Self {
			map_path: PathBuf::from(DEFAULT_MAP_FILE),
			bundle_sentinel: DEFAULT_BUNDLE_SENTINEL.to_string(),
			restricted: false,
		}
	}
}

impl TracemapConfig {
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Build the config from an arbitrary variable source; unset variables
	/// keep their defaults.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let mut config = Self::default();

		if let Some(path) = lookup(MAP_PATH_ENV) {
			config.map_path = PathBuf::from(path);
		}

		if let Some(sentinel) = lookup(BUNDLE_SENTINEL_ENV) {
			if sentinel.trim().is_empty() {
				return Err(ConfigError::InvalidValue {
					name: BUNDLE_SENTINEL_ENV.into(),
					message: "must not be empty".into(),
				});
			}
			config.bundle_sentinel = sentinel;
		}

		if let Some(value) = lookup(RESTRICTED_ENV) {
			config.restricted = parse_flag(RESTRICTED_ENV, &value)?;
		}

		Ok(config)
	}

	pub fn guard_options(&self) -> GuardOptions {
		GuardOptions::default().restricted(self.restricted)
	}

	pub fn translator(&self) -> TraceTranslator {
		TraceTranslator::from_map_path(&self.map_path, self.bundle_sentinel.clone())
	}
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Ok(true),
		"false" | "0" | "no" | "" => Ok(false),
		other => Err(ConfigError::InvalidValue {
			name: name.to_string(),
			message: format!("expected a boolean, got {other:?}"),
		}),
	}
}
