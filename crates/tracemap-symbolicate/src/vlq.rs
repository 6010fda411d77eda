// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding for the `mappings` field of a source map.
//!
//! The mappings string is a `;`-separated list of generated lines, each a
//! `,`-separated list of segments. Every field except the generated column is
//! delta-encoded against the previous segment anywhere in the file; the
//! generated column resets at the start of each line.

use crate::error::{Result, SymbolicateError};

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_CONTINUATION_BIT: i64 = 1 << VLQ_BASE_SHIFT;
const VLQ_VALUE_MASK: i64 = VLQ_CONTINUATION_BIT - 1;
/// Highest shift that still leaves room for a full digit in an `i64`.
const VLQ_MAX_SHIFT: u32 = 55;

fn base64_value(byte: u8) -> Result<i64> {
	let value = match byte {
		b'A'..=b'Z' => byte - b'A',
		b'a'..=b'z' => byte - b'a' + 26,
		b'0'..=b'9' => byte - b'0' + 52,
		b'+' => 62,
		b'/' => 63,
		_ => return Err(SymbolicateError::InvalidVlqChar(byte as char)),
	};
	Ok(i64::from(value))
}

/// Decode one VLQ segment into its signed field values.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::with_capacity(5);
	let mut accum = 0i64;
	let mut shift = 0u32;

	for byte in segment.bytes() {
		let digit = base64_value(byte)?;
		if shift > VLQ_MAX_SHIFT {
			return Err(SymbolicateError::VlqOverflow(segment.to_string()));
		}

		accum |= (digit & VLQ_VALUE_MASK) << shift;

		if digit & VLQ_CONTINUATION_BIT != 0 {
			shift += VLQ_BASE_SHIFT;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = accum >> 1;
		values.push(if accum & 1 == 1 { -magnitude } else { magnitude });
		accum = 0;
		shift = 0;
	}

	if shift != 0 {
		return Err(SymbolicateError::TruncatedVlq(segment.to_string()));
	}

	Ok(values)
}

/// Where a generated segment came from in the original sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalRef {
	pub source_index: u32,
	/// 0-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name_index: Option<u32>,
}

/// One decoded segment of generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
	/// 0-indexed.
	pub generated_line: u32,
	/// 0-indexed.
	pub generated_column: u32,
	/// `None` for single-field segments, which mark generated code with no
	/// original counterpart.
	pub original: Option<OriginalRef>,
}

/// Decoded segments sorted by generated line, then generated column.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	segments: Vec<Segment>,
}

impl DecodedMappings {
	/// Find the segment covering a generated position: the closest segment on
	/// the same line at or before `column`.
	pub fn find(&self, line: u32, column: u32) -> Option<&Segment> {
		let line_start = self.segments.partition_point(|s| s.generated_line < line);
		let line_end = self.segments.partition_point(|s| s.generated_line <= line);
		let on_line = &self.segments[line_start..line_end];

		match on_line.partition_point(|s| s.generated_column <= column) {
			0 => None,
			idx => Some(&on_line[idx - 1]),
		}
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Number of segments that point back into an original source.
	pub fn mapped_len(&self) -> usize {
		self.segments.iter().filter(|s| s.original.is_some()).count()
	}
}

#[derive(Default)]
struct DeltaState {
	source: i64,
	line: i64,
	column: i64,
	name: i64,
}

fn to_u32(value: i64, line: u32, reason: &'static str) -> Result<u32> {
	u32::try_from(value).map_err(|_| SymbolicateError::InvalidMapping { line, reason })
}

/// Decode a full `mappings` string.
pub fn decode_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut segments = Vec::new();
	let mut state = DeltaState::default();

	for (line_idx, line) in mappings.split(';').enumerate() {
		let generated_line = to_u32(line_idx as i64, u32::MAX, "too many generated lines")?;
		let mut generated_column = 0i64;

		for raw in line.split(',').filter(|s| !s.is_empty()) {
			let values = decode_segment(raw)?;

			let original = match values.len() {
				1 => None,
				4 | 5 => {
					state.source += values[1];
					state.line += values[2];
					state.column += values[3];
					let name_index = match values.get(4) {
						Some(delta) => {
							state.name += delta;
							Some(to_u32(state.name, generated_line, "negative name index")?)
						}
						None => None,
					};
					Some(OriginalRef {
						source_index: to_u32(state.source, generated_line, "negative source index")?,
						line: to_u32(state.line, generated_line, "negative original line")?,
						column: to_u32(state.column, generated_line, "negative original column")?,
						name_index,
					})
				}
				_ => {
					return Err(SymbolicateError::InvalidMapping {
						line: generated_line,
						reason: "segment must have 1, 4 or 5 fields",
					})
				}
			};

			generated_column += values[0];
			segments.push(Segment {
				generated_line,
				generated_column: to_u32(generated_column, generated_line, "negative generated column")?,
				original,
			});
		}
	}

	// Generators are not required to emit segments in column order.
	segments.sort_by_key(|s| (s.generated_line, s.generated_column));

	Ok(DecodedMappings { segments })
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_decodes_single_digit_values() {
		assert_eq!(decode_segment("A").unwrap(), vec![0]);
		assert_eq!(decode_segment("C").unwrap(), vec![1]);
		assert_eq!(decode_segment("D").unwrap(), vec![-1]);
		assert_eq!(decode_segment("K").unwrap(), vec![5]);
	}

	#[test]
	fn test_decodes_continuation_digits() {
		// 'g' carries the continuation bit, 'B' adds 1 << 5.
		assert_eq!(decode_segment("gB").unwrap(), vec![16]);
		assert_eq!(decode_segment("KAECA").unwrap(), vec![5, 0, 2, 1, 0]);
	}

	#[test]
	fn test_rejects_bad_characters_and_truncation() {
		assert!(matches!(
			decode_segment("A!"),
			Err(SymbolicateError::InvalidVlqChar('!'))
		));
		assert!(matches!(
			decode_segment("Ag"),
			Err(SymbolicateError::TruncatedVlq(_))
		));
	}

	#[test]
	fn test_rejects_overlong_values() {
		let segment = "g".repeat(14) + "B";
		assert!(matches!(
			decode_segment(&segment),
			Err(SymbolicateError::VlqOverflow(_))
		));
	}

	#[test]
	fn test_original_fields_carry_across_lines() {
		let decoded = decode_mappings("AAAA;AACA").unwrap();
		assert_eq!(decoded.len(), 2);

		let second = decoded.find(1, 0).unwrap();
		assert_eq!(second.generated_line, 1);
		assert_eq!(second.original.unwrap().line, 1);
	}

	#[test]
	fn test_find_picks_closest_segment_at_or_before_column() {
		// Columns 0, 10 and 20 on the first line.
		let decoded = decode_mappings("AAAA,UACK,UACK").unwrap();

		assert_eq!(decoded.find(0, 5).unwrap().generated_column, 0);
		assert_eq!(decoded.find(0, 15).unwrap().generated_column, 10);
		assert_eq!(decoded.find(0, 25).unwrap().generated_column, 20);
		assert!(decoded.find(1, 0).is_none());
	}

	#[test]
	fn test_find_before_first_segment_is_none() {
		let decoded = decode_mappings("KAAA").unwrap();
		assert!(decoded.find(0, 4).is_none());
		assert!(decoded.find(0, 5).is_some());
	}

	#[test]
	fn test_single_field_segments_are_unmapped() {
		let decoded = decode_mappings("AAAA,K").unwrap();
		assert_eq!(decoded.len(), 2);
		assert_eq!(decoded.mapped_len(), 1);
		assert!(decoded.find(0, 7).unwrap().original.is_none());
	}

	#[test]
	fn test_segments_are_sorted_within_a_line() {
		// Second segment steps back from column 10 to column 2.
		let decoded = decode_mappings("UAAA,RAAC").unwrap();
		assert_eq!(decoded.find(0, 3).unwrap().generated_column, 2);
	}

	#[test]
	fn test_rejects_two_field_segments() {
		assert!(matches!(
			decode_mappings("AA"),
			Err(SymbolicateError::InvalidMapping { line: 0, .. })
		));
	}

	#[test]
	fn test_rejects_negative_original_line() {
		assert!(matches!(
			decode_mappings("AADA"),
			Err(SymbolicateError::InvalidMapping { .. })
		));
	}

	proptest! {
		#[test]
		fn test_decoding_arbitrary_input_never_panics(input in "[A-Za-z0-9+/,;!]{0,64}") {
			let _ = decode_mappings(&input);
		}

		#[test]
		fn test_single_digit_roundtrip(value in -15i64..=15) {
			let encoded = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
			let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdef";
			let segment = (alphabet[encoded as usize] as char).to_string();
			prop_assert_eq!(decode_segment(&segment).unwrap(), vec![value]);
		}
	}
}
