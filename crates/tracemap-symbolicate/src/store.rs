// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lazily loaded source map.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use once_cell::unsync::OnceCell;
use tracing::info;

use crate::error::{Result, SymbolicateError};
use crate::sourcemap::{ParsedSourceMap, Position};
use crate::translate::PositionLookup;

/// File name the build step gives the map next to the bundle.
pub const DEFAULT_MAP_FILE: &str = "main.js.map";

/// Where the map artifact is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
	File(PathBuf),
	Bytes(Vec<u8>),
}

/// Holds the source map, parsing it on first use.
///
/// The first [`get_consumer`](Self::get_consumer) call pays the full parse
/// cost, which for a large bundle dwarfs every later lookup. Once loaded the
/// map is never replaced. A failed load is not remembered and is attempted
/// again on the next call.
///
/// Storage is a [`OnceCell`], so the store is `!Sync`; a multi-threaded host
/// needs one store per thread.
#[derive(Debug)]
pub struct MapStore {
	source: MapSource,
	map: OnceCell<ParsedSourceMap>,
}

impl MapStore {
	pub fn new(source: MapSource) -> Self {
		Self {
			source,
			map: OnceCell::new(),
		}
	}

	pub fn from_path(path: impl AsRef<Path>) -> Self {
		Self::new(MapSource::File(path.as_ref().to_path_buf()))
	}

	pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
		Self::new(MapSource::Bytes(data.into()))
	}

	pub fn source(&self) -> &MapSource {
		&self.source
	}

	pub fn is_loaded(&self) -> bool {
		self.map.get().is_some()
	}

	/// Return the parsed map, loading it first if needed.
	pub fn get_consumer(&self) -> Result<&ParsedSourceMap> {
		if let Some(map) = self.map.get() {
			return Ok(map);
		}

		let started = Instant::now();
		let parsed = self.load()?;
		let stats = parsed.stats();
		info!(
			elapsed_ms = started.elapsed().as_millis() as u64,
			sources = stats.sources,
			segments = stats.segments,
			"Loaded source map"
		);

		Ok(self.map.get_or_init(|| parsed))
	}

	fn load(&self) -> Result<ParsedSourceMap> {
		match &self.source {
			MapSource::File(path) => {
				let data = fs::read(path).map_err(|source| SymbolicateError::MapLoad {
					path: path.clone(),
					source,
				})?;
				ParsedSourceMap::from_slice(&data)
			}
			MapSource::Bytes(data) => ParsedSourceMap::from_slice(data),
		}
	}
}

impl Default for MapStore {
	fn default() -> Self {
		Self::from_path(DEFAULT_MAP_FILE)
	}
}

impl PositionLookup for MapStore {
	fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>> {
		self.get_consumer()?.lookup(line, column)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const MAP: &str = r#"{"version": 3, "sources": ["app.ts"], "names": [], "mappings": "AAAA"}"#;

	#[test]
	fn test_loads_on_first_use_only() {
		let store = MapStore::from_bytes(MAP);
		assert!(!store.is_loaded());

		let first = store.get_consumer().unwrap() as *const ParsedSourceMap;
		assert!(store.is_loaded());
		let second = store.get_consumer().unwrap() as *const ParsedSourceMap;

		assert_eq!(first, second);
	}

	#[test]
	fn test_loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(MAP.as_bytes()).unwrap();

		let store = MapStore::from_path(file.path());
		let pos = store.original_position_for(1, 0).unwrap().unwrap();

		assert_eq!(pos.source, "app.ts");
	}

	#[test]
	fn test_failed_load_is_retried() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(DEFAULT_MAP_FILE);
		let store = MapStore::from_path(&path);

		assert!(matches!(
			store.get_consumer(),
			Err(SymbolicateError::MapLoad { .. })
		));
		assert!(!store.is_loaded());

		fs::write(&path, MAP).unwrap();
		assert!(store.get_consumer().is_ok());
		assert!(store.is_loaded());
	}

	#[test]
	fn test_default_points_at_bundle_map() {
		assert_eq!(
			MapStore::default().source(),
			&MapSource::File(PathBuf::from("main.js.map"))
		);
	}
}
