// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source Map v3 parsing and generated-to-original position lookup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymbolicateError};
use crate::translate::PositionLookup;
use crate::vlq::{decode_mappings, DecodedMappings};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	#[serde(default)]
	sources_content: Option<Vec<Option<String>>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// A parsed source map, read-only after construction.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	file: Option<String>,
	/// Source paths with `sourceRoot` already applied.
	sources: Vec<String>,
	sources_content: Vec<Option<String>>,
	names: Vec<String>,
	mappings: DecodedMappings,
}

/// An original source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
	/// 1-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub source: String,
	pub name: Option<String>,
}

/// Summary of a loaded map, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapStats {
	pub file: Option<String>,
	pub sources: usize,
	pub names: usize,
	pub segments: usize,
	pub mapped_segments: usize,
	pub has_sources_content: bool,
}

impl ParsedSourceMap {
	pub fn from_slice(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		if raw.version != 3 {
			return Err(SymbolicateError::InvalidSourceMapVersion(raw.version));
		}

		let mappings = decode_mappings(&raw.mappings)?;
		let root = raw.source_root.as_deref().unwrap_or_default();
		let sources = raw
			.sources
			.into_iter()
			.map(|source| join_source_root(root, source.as_deref().unwrap_or_default()))
			.collect();

		Ok(Self {
			file: raw.file,
			sources,
			sources_content: raw.sources_content.unwrap_or_default(),
			names: raw.names,
			mappings,
		})
	}

	/// Look up the original position of a generated location.
	///
	/// `line` is 1-indexed and `column` 0-indexed, matching what the
	/// `source-map` family of libraries accept. Returns `Ok(None)` when no
	/// segment covers the location or the covering segment has no original.
	pub fn lookup(&self, line: u32, column: u32) -> Result<Option<Position>> {
		let Some(generated_line) = line.checked_sub(1) else {
			return Ok(None);
		};

		let Some(original) = self
			.mappings
			.find(generated_line, column)
			.and_then(|segment| segment.original)
		else {
			return Ok(None);
		};

		let source = self
			.sources
			.get(original.source_index as usize)
			.ok_or(SymbolicateError::InvalidSourceIndex(original.source_index))?
			.clone();

		let name = original
			.name_index
			.map(|idx| {
				self.names
					.get(idx as usize)
					.cloned()
					.ok_or(SymbolicateError::InvalidNameIndex(idx))
			})
			.transpose()?;

		Ok(Some(Position {
			line: original.line + 1,
			column: original.column,
			source,
			name,
		}))
	}

	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn has_sources_content(&self) -> bool {
		self.sources_content.iter().any(Option::is_some)
	}

	pub fn stats(&self) -> MapStats {
		MapStats {
			file: self.file.clone(),
			sources: self.sources.len(),
			names: self.names.len(),
			segments: self.mappings.len(),
			mapped_segments: self.mappings.mapped_len(),
			has_sources_content: self.has_sources_content(),
		}
	}
}

impl FromStr for ParsedSourceMap {
	type Err = SymbolicateError;

	fn from_str(s: &str) -> Result<Self> {
		Self::from_slice(s.as_bytes())
	}
}

impl PositionLookup for ParsedSourceMap {
	fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>> {
		self.lookup(line, column)
	}
}

fn join_source_root(root: &str, source: &str) -> String {
	if root.is_empty() {
		return source.to_string();
	}
	format!("{}/{}", root.trim_end_matches('/'), source)
}
