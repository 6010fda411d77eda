// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of V8-style `at` lines in a raw stack trace.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading whitespace, `at`, an optional label ending in whitespace, then
/// `file:line:column` optionally wrapped in parentheses. The file token is
/// limited to the ASCII range `0`..=`z` plus `.`, `_`, `-`, `\` and `/`.
static FRAME_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^\s+at\s+(.+?\s+)?\(?([0-z._\-\\/]+):([0-9]+):([0-9]+)\)?$")
		.expect("frame pattern is valid")
});

/// One call site parsed out of a raw trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
	pub label: Option<String>,
	pub file: String,
	pub line: u32,
	pub column: u32,
}

/// Parse a single trace line, returning `None` if it is not a frame line.
pub fn parse_frame(line: &str) -> Option<StackFrame> {
	let caps = FRAME_RE.captures(line)?;

	let label = caps
		.get(1)
		.map(|m| m.as_str().trim())
		.filter(|label| !label.is_empty())
		.map(str::to_string);

	Some(StackFrame {
		label,
		file: caps[2].to_string(),
		line: parse_position(&caps[3]),
		column: parse_position(&caps[4]),
	})
}

/// Digits only reach here, so the sole failure is overflow. A saturated value
/// never matches a real mapping and ends translation like any unmapped frame.
fn parse_position(digits: &str) -> u32 {
	digits.parse().unwrap_or(u32::MAX)
}
