// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracemap_guard::{CycleOutcome, LogSink, LoopGuard, ScriptError, Thrown, TracemapConfig};
use tracemap_symbolicate::MapStore;
use tracing::debug;

/// Read a trace from `path`, or from stdin when there is none.
pub fn read_input(path: Option<&Path>) -> Result<String> {
	match path {
		Some(path) => fs::read_to_string(path)
			.with_context(|| format!("failed to read trace from {}", path.display())),
		None => io::read_to_string(io::stdin()).context("failed to read trace from stdin"),
	}
}

pub fn translate(config: &TracemapConfig, raw: &str) -> Result<String> {
	config
		.translator()
		.source_mapped_stack_trace(raw.trim_end())
		.with_context(|| format!("failed to translate against {}", config.map_path.display()))
}

/// Map statistics as pretty-printed JSON.
pub fn inspect(map_path: &Path) -> Result<String> {
	let store = MapStore::from_path(map_path);
	let map = store
		.get_consumer()
		.with_context(|| format!("failed to load {}", map_path.display()))?;
	serde_json::to_string_pretty(&map.stats()).context("failed to serialize map statistics")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
	pub cycles: u32,
	pub handled: u32,
	pub cached_traces: usize,
}

/// Run a routine `cycles` times under a [`LoopGuard`], failing each time with
/// the error described by `raw`.
pub fn guard_demo<S: LogSink>(
	config: &TracemapConfig,
	raw: &str,
	cycles: u32,
	sink: S,
) -> Result<DemoSummary> {
	let ctx = config.translator();
	let guard = LoopGuard::new(&ctx, config.guard_options(), sink);
	let error = ScriptError::from_stack(raw.trim_end());
	let mut handled = 0;

	for cycle in 0..cycles {
		let outcome = guard.run_cycle(|| Err(Thrown::from(error.clone())));
		debug!(cycle, outcome = ?outcome, "Cycle finished");
		if let CycleOutcome::Handled = outcome {
			handled += 1;
		}
	}

	Ok(DemoSummary {
		cycles,
		handled,
		cached_traces: ctx.cache().len(),
	})
}
