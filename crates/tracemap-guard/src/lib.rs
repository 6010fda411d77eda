// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Failure containment for a routine invoked once per host cycle.
//!
//! A [`LoopGuard`] runs the routine, and when it fails with an error-like
//! value logs one red `<span>` line carrying the source-mapped trace, then
//! lets the host carry on with the next cycle. Non-error failures pass
//! through untouched.
//!
//! # Example
//!
//! ```
//! use tracemap_guard::{CycleOutcome, GuardOptions, LoopGuard, MemorySink, ScriptError};
//! use tracemap_symbolicate::{MapStore, TraceTranslator};
//!
//! let map = r#"{"version":3,"sources":["src/app.ts"],"names":["run"],"mappings":"AAAAA"}"#;
//! let ctx = TraceTranslator::with_default_sentinel(MapStore::from_bytes(map));
//! let guard = LoopGuard::new(&ctx, GuardOptions::default(), MemorySink::new());
//!
//! let outcome = guard.run_cycle(|| {
//!     Err(ScriptError::from_stack("Error: boom\n    at r (main:1:0)").into())
//! });
//!
//! assert!(matches!(outcome, CycleOutcome::Handled));
//! assert_eq!(
//!     guard.sink().lines(),
//!     vec!["<span style='color:red'>Error: boom\n    at run (src/app.ts:1:0)</span>"]
//! );
//! ```

pub mod config;
pub mod error;
pub mod escape;
pub mod guard;
pub mod panic_hook;
pub mod sink;
pub mod thrown;

pub use config::{
	GuardOptions, TracemapConfig, BUNDLE_SENTINEL_ENV, MAP_PATH_ENV, RESTRICTED_ENV,
};
pub use error::{ConfigError, Result};
pub use escape::escape_html;
pub use guard::{CycleOutcome, LoopGuard, RESTRICTED_NOTICE, TRANSLATION_FAILED_NOTICE};
pub use panic_hook::install_panic_hook;
pub use sink::{ConsoleSink, LogSink, MemorySink, TracingSink};
pub use thrown::{ScriptError, Thrown};
