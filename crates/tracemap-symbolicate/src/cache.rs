// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Memoization of translated traces.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

/// Translated traces keyed by the byte-exact raw trace.
///
/// Entries live as long as the cache; there is no eviction. The set of
/// distinct failures in a run is expected to stay small.
#[derive(Debug, Default)]
pub struct TranslationCache {
	entries: RefCell<HashMap<String, String>>,
}

impl TranslationCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, raw: &str) -> Option<String> {
		self.entries.borrow().get(raw).cloned()
	}

	pub fn insert(&self, raw: &str, translated: String) {
		self.entries.borrow_mut().insert(raw.to_string(), translated);
	}

	/// Return the cached translation, or compute, store and return it.
	///
	/// `compute` is not called on a hit. Errors are returned without being
	/// stored, so a later call retries.
	pub fn get_or_try_insert_with<E>(
		&self,
		raw: &str,
		compute: impl FnOnce() -> Result<String, E>,
	) -> Result<String, E> {
		if let Some(hit) = self.get(raw) {
			debug!(len = raw.len(), "Translation cache hit");
			return Ok(hit);
		}

		let translated = compute()?;
		self.insert(raw, translated.clone());
		debug!(entries = self.len(), "Translation cache miss stored");
		Ok(translated)
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_hit_skips_compute() {
		let cache = TranslationCache::new();
		cache.insert("raw", "translated".to_string());

		let out: Result<String, ()> =
			cache.get_or_try_insert_with("raw", || panic!("compute must not run on a hit"));

		assert_eq!(out.unwrap(), "translated");
	}

	#[test]
	fn test_keys_are_not_normalized() {
		let cache = TranslationCache::new();
		cache.insert("Error: boom\n", "a".to_string());

		assert!(cache.get("Error: boom").is_none());
		assert!(cache.get("Error: boom \n").is_none());
		assert_eq!(cache.get("Error: boom\n").as_deref(), Some("a"));
	}

	#[test]
	fn test_errors_are_not_cached() {
		let cache = TranslationCache::new();

		let first: Result<String, &str> = cache.get_or_try_insert_with("raw", || Err("no map"));
		assert!(first.is_err());
		assert!(cache.is_empty());

		let second: Result<String, &str> =
			cache.get_or_try_insert_with("raw", || Ok("mapped".to_string()));
		assert_eq!(second.unwrap(), "mapped");
		assert_eq!(cache.len(), 1);
	}

	proptest! {
		#[test]
		fn test_repeated_lookups_compute_once(raw in ".{0,40}", value in ".{0,40}") {
			let cache = TranslationCache::new();
			let mut computed = 0;

			for _ in 0..3 {
				let out: Result<String, ()> = cache.get_or_try_insert_with(&raw, || {
					computed += 1;
					Ok(value.clone())
				});
				prop_assert_eq!(out.unwrap(), value.clone());
			}

			prop_assert_eq!(computed, 1);
			prop_assert_eq!(cache.len(), 1);
		}
	}
}
