// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rewriting of raw stack traces into original source locations.

use std::ops::ControlFlow;

use tracing::debug;

use crate::error::Result;
use crate::frame::{parse_frame, StackFrame};
use crate::sourcemap::Position;

/// File token that identifies frames from the bundled module.
pub const DEFAULT_BUNDLE_SENTINEL: &str = "main";

/// Position lookup against a source map.
///
/// Implemented by [`ParsedSourceMap`](crate::ParsedSourceMap) and
/// [`MapStore`](crate::MapStore).
pub trait PositionLookup {
	/// `line` is 1-indexed, `column` is passed through as it appeared in the
	/// trace. `Ok(None)` means no original position is known.
	fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>>;
}

impl<L: PositionLookup + ?Sized> PositionLookup for &L {
	fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>> {
		(**self).original_position_for(line, column)
	}
}

/// Why translation stopped before the end of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
	OutOfBundle,
	Unmapped,
}

/// Translates raw traces frame by frame, stopping at the first frame it
/// cannot map.
#[derive(Debug)]
pub struct Translator<L> {
	lookup: L,
	sentinel: String,
}

impl<L: PositionLookup> Translator<L> {
	pub fn new(lookup: L, sentinel: impl Into<String>) -> Self {
		Self {
			lookup,
			sentinel: sentinel.into(),
		}
	}

	pub fn sentinel(&self) -> &str {
		&self.sentinel
	}

	pub fn lookup(&self) -> &L {
		&self.lookup
	}

	/// Translate a raw trace.
	///
	/// The output starts with every line before the first frame, byte for
	/// byte including any `\r`, followed by one `\n`-prefixed line per
	/// translated frame. Scanning ends at the first frame outside the bundle
	/// or without a mapping; lines already produced are kept.
	pub fn translate(&self, raw: &str) -> Result<String> {
		let mut out = String::with_capacity(raw.len());
		let mut in_header = true;

		for (idx, line) in raw.split('\n').enumerate() {
			let Some(frame) = parse_frame(line.strip_suffix('\r').unwrap_or(line)) else {
				if in_header {
					if idx > 0 {
						out.push('\n');
					}
					out.push_str(line);
				}
				continue;
			};
			in_header = false;

			if let ControlFlow::Break(stop) = self.translate_frame(&mut out, &frame)? {
				debug!(
					reason = ?stop,
					file = %frame.file,
					line = frame.line,
					column = frame.column,
					"Stopped translating trace"
				);
				break;
			}
		}

		Ok(out)
	}

	fn translate_frame(&self, out: &mut String, frame: &StackFrame) -> Result<ControlFlow<Stop>> {
		if frame.file != self.sentinel {
			return Ok(ControlFlow::Break(Stop::OutOfBundle));
		}

		let Some(position) = self.lookup.original_position_for(frame.line, frame.column)? else {
			return Ok(ControlFlow::Break(Stop::Unmapped));
		};

		out.push('\n');
		out.push_str(&format_frame(&position, frame.label.as_deref()));
		Ok(ControlFlow::Continue(()))
	}
}

/// Render a translated frame. The original symbol name wins over the label
/// from the trace.
fn format_frame(position: &Position, label: Option<&str>) -> String {
	let location = format!("{}:{}:{}", position.source, position.line, position.column);
	let name = position.name.as_deref().filter(|name| !name.is_empty());

	match name.or(label) {
		Some(symbol) => format!("    at {symbol} ({location})"),
		None => format!("    at {location}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::collections::HashMap;

	/// Canned positions keyed by generated (line, column).
	#[derive(Default)]
	struct FakeLookup {
		positions: HashMap<(u32, u32), Position>,
		calls: Cell<usize>,
	}

	impl FakeLookup {
		fn with(mut self, line: u32, column: u32, position: Position) -> Self {
			self.positions.insert((line, column), position);
			self
		}
	}

	impl PositionLookup for FakeLookup {
		fn original_position_for(&self, line: u32, column: u32) -> Result<Option<Position>> {
			self.calls.set(self.calls.get() + 1);
			Ok(self.positions.get(&(line, column)).cloned())
		}
	}

	fn app_ts(name: Option<&str>) -> Position {
		Position {
			line: 3,
			column: 1,
			source: "app.ts".to_string(),
			name: name.map(str::to_string),
		}
	}

	fn translator(lookup: FakeLookup) -> Translator<FakeLookup> {
		Translator::new(lookup, DEFAULT_BUNDLE_SENTINEL)
	}

	fn translated_lines(out: &str) -> Vec<&str> {
		out.lines().skip(1).map(str::trim).collect()
	}

	#[test]
	fn test_name_takes_precedence_over_label() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(Some("run"))));

		let out = t.translate("Error: boom\n    at Object.foo (main:10:5)").unwrap();

		assert_eq!(out, "Error: boom\n    at run (app.ts:3:1)");
	}

	#[test]
	fn test_label_used_when_name_missing() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(None)));

		let out = t.translate("Error: boom\n    at Object.foo (main:10:5)").unwrap();

		assert_eq!(translated_lines(&out), vec!["at Object.foo (app.ts:3:1)"]);
	}

	#[test]
	fn test_bare_location_when_no_name_or_label() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(None)));

		let out = t.translate("Error: boom\n    at main:10:5").unwrap();

		assert_eq!(translated_lines(&out), vec!["at app.ts:3:1"]);
	}

	#[test]
	fn test_empty_name_falls_back_to_label() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(Some(""))));

		let out = t.translate("Error: boom\n    at tick (main:10:5)").unwrap();

		assert_eq!(translated_lines(&out), vec!["at tick (app.ts:3:1)"]);
	}

	#[test]
	fn test_stops_at_first_frame_outside_bundle() {
		let lookup = FakeLookup::default()
			.with(10, 5, app_ts(Some("run")))
			.with(20, 1, app_ts(Some("later")));
		let t = translator(lookup);

		let raw = "Error: boom\n    at run (main:10:5)\n    at tick (host:1:1)\n    at later (main:20:1)";
		let out = t.translate(raw).unwrap();

		assert_eq!(translated_lines(&out), vec!["at run (app.ts:3:1)"]);
		assert_eq!(t.lookup().calls.get(), 1);
	}

	#[test]
	fn test_stops_at_first_unmapped_frame() {
		let lookup = FakeLookup::default()
			.with(10, 5, app_ts(Some("run")))
			.with(30, 2, app_ts(Some("after")));
		let t = translator(lookup);

		let raw = "TypeError: x is undefined\n    at run (main:10:5)\n    at gap (main:11:1)\n    at after (main:30:2)";
		let out = t.translate(raw).unwrap();

		assert_eq!(out, "TypeError: x is undefined\n    at run (app.ts:3:1)");
		assert_eq!(t.lookup().calls.get(), 2);
	}

	#[test]
	fn test_unmapped_first_frame_leaves_header_only() {
		let t = translator(FakeLookup::default());

		let out = t.translate("Error: boom\n    at run (main:1:1)").unwrap();

		assert_eq!(out, "Error: boom");
	}

	#[test]
	fn test_multi_line_message_is_kept_whole() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(Some("run"))));

		let out = t
			.translate("Error: first\nsecond line\n    at run (main:10:5)")
			.unwrap();

		assert_eq!(out, "Error: first\nsecond line\n    at run (app.ts:3:1)");
	}

	#[test]
	fn test_noise_between_frames_is_skipped() {
		let lookup = FakeLookup::default()
			.with(10, 5, app_ts(Some("run")))
			.with(12, 1, app_ts(Some("next")));
		let t = translator(lookup);

		let raw = "Error: boom\n    at run (main:10:5)\n    at <anonymous>\n    at next (main:12:1)";
		let out = t.translate(raw).unwrap();

		assert_eq!(
			translated_lines(&out),
			vec!["at run (app.ts:3:1)", "at next (app.ts:3:1)"]
		);
	}

	#[test]
	fn test_custom_sentinel_selects_bundle() {
		let t = Translator::new(
			FakeLookup::default().with(10, 5, app_ts(Some("run"))),
			"bundle.min.js",
		);

		let out = t
			.translate("Error: boom\n    at x (bundle.min.js:10:5)\n    at main:10:5")
			.unwrap();

		assert_eq!(translated_lines(&out), vec!["at run (app.ts:3:1)"]);
	}

	#[test]
	fn test_frames_are_always_newline_prefixed() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(Some("run"))));

		let out = t.translate("    at run (main:10:5)").unwrap();

		assert_eq!(out, "\n    at run (app.ts:3:1)");
	}

	#[test]
	fn test_crlf_header_is_kept_byte_for_byte() {
		let t = translator(FakeLookup::default().with(10, 5, app_ts(Some("run"))));

		let out = t
			.translate("Error: first\r\nsecond\r\n    at x (main:10:5)\r\n")
			.unwrap();

		assert_eq!(out, "Error: first\r\nsecond\r\n    at run (app.ts:3:1)");
	}

	#[test]
	fn test_trace_without_frames_is_returned_as_is() {
		let t = translator(FakeLookup::default());
		assert_eq!(t.translate("Error: boom").unwrap(), "Error: boom");
		assert_eq!(t.translate("Error: boom\n").unwrap(), "Error: boom\n");
		assert_eq!(t.translate("").unwrap(), "");
	}
}
