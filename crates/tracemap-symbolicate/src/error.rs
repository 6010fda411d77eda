// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for map loading and trace translation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a source map or translating a trace.
///
/// An unmapped frame or a frame outside the bundle is not an error; both end
/// translation normally.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character: {0:?}")]
	InvalidVlqChar(char),

	#[error("VLQ value overflows in segment {0:?}")]
	VlqOverflow(String),

	#[error("VLQ segment {0:?} ends with a continuation digit")]
	TruncatedVlq(String),

	#[error("Invalid mapping on generated line {line}: {reason}")]
	InvalidMapping { line: u32, reason: &'static str },

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Invalid name index: {0}")]
	InvalidNameIndex(u32),

	#[error("Failed to read source map {path}: {source}")]
	MapLoad {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
