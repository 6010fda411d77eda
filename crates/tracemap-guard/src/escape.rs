// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::borrow::Cow;

/// Escape the five HTML-significant characters so a trace can sit inside a
/// console `<span>`.
pub fn escape_html(input: &str) -> Cow<'_, str> {
	if !input.contains(['&', '<', '>', '"', '\'']) {
		return Cow::Borrowed(input);
	}

	let mut out = String::with_capacity(input.len() + 16);
	for ch in input.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}
	Cow::Owned(out)
}
