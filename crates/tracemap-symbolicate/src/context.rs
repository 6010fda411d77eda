// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The translation context a host builds once and shares by reference.

use std::path::Path;

use tracing::instrument;

use crate::cache::TranslationCache;
use crate::error::Result;
use crate::store::MapStore;
use crate::translate::{PositionLookup, Translator, DEFAULT_BUNDLE_SENTINEL};

/// A translator paired with its output cache.
///
/// Construct one per process (or per thread) and pass `&TraceTranslator` to
/// everything that needs translated traces. The map is loaded on the first
/// cache miss that reaches a bundle frame.
#[derive(Debug)]
pub struct TraceTranslator<L = MapStore> {
	translator: Translator<L>,
	cache: TranslationCache,
}

impl TraceTranslator<MapStore> {
	/// Translator backed by the map file at `path`.
	pub fn from_map_path(path: impl AsRef<Path>, sentinel: impl Into<String>) -> Self {
		Self::new(MapStore::from_path(path), sentinel)
	}
}

impl<L: PositionLookup> TraceTranslator<L> {
	pub fn new(lookup: L, sentinel: impl Into<String>) -> Self {
		Self {
			translator: Translator::new(lookup, sentinel),
			cache: TranslationCache::new(),
		}
	}

	pub fn with_default_sentinel(lookup: L) -> Self {
		Self::new(lookup, DEFAULT_BUNDLE_SENTINEL)
	}

	/// Translate `raw`, reusing an earlier result for the identical text.
	#[instrument(skip_all, fields(len = raw.len()))]
	pub fn source_mapped_stack_trace(&self, raw: &str) -> Result<String> {
		self.cache
			.get_or_try_insert_with(raw, || self.translator.translate(raw))
	}

	pub fn translator(&self) -> &Translator<L> {
		&self.translator
	}

	pub fn cache(&self) -> &TranslationCache {
		&self.cache
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sourcemap::Position;
	use std::cell::Cell;

	struct CountingLookup {
		calls: Cell<usize>,
	}

	impl PositionLookup for CountingLookup {
		fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>> {
			self.calls.set(self.calls.get() + 1);
			Ok(Some(Position {
				line,
				column,
				source: "app.ts".to_string(),
				name: None,
			}))
		}
	}

	const RAW: &str = "Error: boom\n    at run (main:10:5)\n    at tick (main:11:2)";

	#[test]
	fn test_second_call_is_served_from_cache() {
		let ctx = TraceTranslator::with_default_sentinel(CountingLookup {
			calls: Cell::new(0),
		});

		let first = ctx.source_mapped_stack_trace(RAW).unwrap();
		let lookups_after_first = ctx.translator().lookup().calls.get();
		let second = ctx.source_mapped_stack_trace(RAW).unwrap();

		assert_eq!(first, second);
		assert_eq!(lookups_after_first, 2);
		assert_eq!(ctx.translator().lookup().calls.get(), 2);
		assert_eq!(ctx.cache().len(), 1);
	}

	#[test]
	fn test_distinct_traces_get_distinct_entries() {
		let ctx = TraceTranslator::with_default_sentinel(CountingLookup {
			calls: Cell::new(0),
		});

		ctx.source_mapped_stack_trace(RAW).unwrap();
		ctx.source_mapped_stack_trace(&format!("{RAW}\n")).unwrap();

		assert_eq!(ctx.cache().len(), 2);
	}

	#[test]
	fn test_load_failure_is_reported_and_not_cached() {
		let dir = tempfile::tempdir().unwrap();
		let ctx = TraceTranslator::from_map_path(dir.path().join("main.js.map"), "main");

		assert!(ctx.source_mapped_stack_trace(RAW).is_err());
		assert!(ctx.cache().is_empty());
	}
}
