// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Destinations for the single line logged per contained failure.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives one finished, already escaped line per contained failure.
pub trait LogSink {
	fn emit(&self, line: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
	fn emit(&self, line: &str) {
		(**self).emit(line)
	}
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
	fn emit(&self, line: &str) {
		(**self).emit(line)
	}
}

/// Writes lines to stdout, the host console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
	fn emit(&self, line: &str) {
		println!("{line}");
	}
}

/// Forwards lines to the `tracing` subscriber at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
	fn emit(&self, line: &str) {
		tracing::error!(target: "tracemap::guard", line = %line, "Contained loop failure");
	}
}

/// Keeps lines in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
	lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn lines(&self) -> Vec<String> {
		self.lines.borrow().clone()
	}

	pub fn len(&self) -> usize {
		self.lines.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.borrow().is_empty()
	}

	pub fn clear(&self) {
		self.lines.borrow_mut().clear();
	}
}

impl LogSink for MemorySink {
	fn emit(&self, line: &str) {
		self.lines.borrow_mut().push(line.to_string());
	}
}
