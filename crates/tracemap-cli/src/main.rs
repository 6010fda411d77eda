// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tracemap_guard::{ConsoleSink, TracemapConfig};

mod commands;

/// Translate stack traces from a bundled program back to original sources
#[derive(Parser, Debug)]
#[command(name = "tracemap", version, about, long_about = None)]
struct Args {
	/// Log level used when RUST_LOG is not set
	#[arg(long, env = "TRACEMAP_LOG_LEVEL", default_value = "info", global = true)]
	log_level: String,

	/// Diagnostic log format (written to stderr)
	#[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
	log_format: LogFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Translate a raw stack trace read from FILE or stdin
	Translate {
		/// Source map to translate against (overrides TRACEMAP_MAP_PATH)
		#[arg(long)]
		map: Option<PathBuf>,
		/// File name that marks frames from the bundle (overrides TRACEMAP_BUNDLE_SENTINEL)
		#[arg(long)]
		sentinel: Option<String>,
		/// Trace file; stdin when omitted
		file: Option<PathBuf>,
	},
	/// Print statistics about a source map as JSON
	Inspect {
		/// Source map to inspect (overrides TRACEMAP_MAP_PATH)
		#[arg(long)]
		map: Option<PathBuf>,
	},
	/// Run a guarded routine that fails every cycle with the given trace
	GuardDemo {
		/// Source map to translate against (overrides TRACEMAP_MAP_PATH)
		#[arg(long)]
		map: Option<PathBuf>,
		/// Log untranslated traces, as a host without source map support would
		#[arg(long)]
		restricted: bool,
		/// Number of cycles to run
		#[arg(long, default_value_t = 3)]
		cycles: u32,
		/// Trace file; stdin when omitted
		file: Option<PathBuf>,
	},
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
	Compact,
	Json,
	Pretty,
}

fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(&args.log_level, args.log_format);

	let mut config = TracemapConfig::from_env().context("invalid TRACEMAP_* environment")?;

	match args.command {
		Command::Translate {
			map,
			sentinel,
			file,
		} => {
			apply_overrides(&mut config, map, sentinel)?;
			let raw = commands::read_input(file.as_deref())?;
			println!("{}", commands::translate(&config, &raw)?);
		}
		Command::Inspect { map } => {
			apply_overrides(&mut config, map, None)?;
			println!("{}", commands::inspect(&config.map_path)?);
		}
		Command::GuardDemo {
			map,
			restricted,
			cycles,
			file,
		} => {
			apply_overrides(&mut config, map, None)?;
			config.restricted |= restricted;
			let raw = commands::read_input(file.as_deref())?;
			let summary = commands::guard_demo(&config, &raw, cycles, ConsoleSink)?;
			info!(
				cycles = summary.cycles,
				handled = summary.handled,
				cached_traces = summary.cached_traces,
				"Guard demo finished"
			);
		}
	}

	Ok(())
}

fn apply_overrides(
	config: &mut TracemapConfig,
	map: Option<PathBuf>,
	sentinel: Option<String>,
) -> Result<()> {
	if let Some(map) = map {
		config.map_path = map;
	}
	if let Some(sentinel) = sentinel {
		anyhow::ensure!(!sentinel.trim().is_empty(), "--sentinel must not be empty");
		config.bundle_sentinel = sentinel;
	}
	Ok(())
}

fn init_tracing(level: &str, format: LogFormat) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("tracemap={level}")));

	match format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}
