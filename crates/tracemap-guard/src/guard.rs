// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Containment of failures in a periodically invoked routine.

use std::panic::{self, AssertUnwindSafe};

use tracemap_symbolicate::{MapStore, PositionLookup, TraceTranslator};
use tracing::{debug, warn};

use crate::config::GuardOptions;
use crate::escape::escape_html;
use crate::panic_hook::install_panic_hook;
use crate::sink::{ConsoleSink, LogSink};
use crate::thrown::{ScriptError, Thrown};

/// Logged ahead of the raw trace when the host cannot use source maps.
pub const RESTRICTED_NOTICE: &str =
	"Source maps don't work in the simulator - displaying the original error";

/// Logged ahead of the raw trace when the map could not be used.
pub const TRANSLATION_FAILED_NOTICE: &str = "Source map translation failed";

/// What happened during one guarded invocation.
#[derive(Debug)]
pub enum CycleOutcome {
	Succeeded,
	/// An error-like failure was logged and swallowed.
	Handled,
	/// A non-error value was returned by the routine; it is handed back as is.
	Rethrown(Thrown),
}

/// Runs a routine so that error-like failures are logged instead of
/// propagating to the host scheduler.
///
/// Returned `Err(Thrown::Error(..))` values and panics carrying a
/// [`ScriptError`] payload are contained: exactly one line goes to the sink
/// and the call returns normally. Anything else escapes unchanged, a returned
/// value as the same `Thrown::Value` box and a foreign panic by resuming it
/// with its original payload.
pub struct LoopGuard<'t, L = MapStore, S = ConsoleSink> {
	translator: &'t TraceTranslator<L>,
	options: GuardOptions,
	sink: S,
}

impl<'t, L: PositionLookup, S: LogSink> LoopGuard<'t, L, S> {
	/// Also installs the process panic hook that silences contained
	/// [`ScriptError`] panics; see [`install_panic_hook`].
	pub fn new(translator: &'t TraceTranslator<L>, options: GuardOptions, sink: S) -> Self {
		install_panic_hook();
		Self {
			translator,
			options,
			sink,
		}
	}

	pub fn options(&self) -> &GuardOptions {
		&self.options
	}

	pub fn sink(&self) -> &S {
		&self.sink
	}

	/// Wrap `routine` into a closure of the same shape for the host scheduler.
	pub fn wrap<'g, F>(&'g self, mut routine: F) -> Box<dyn FnMut() -> Result<(), Thrown> + 'g>
	where
		F: FnMut() -> Result<(), Thrown> + 'g,
	{
		Box::new(move || match self.run_cycle(&mut routine) {
			CycleOutcome::Rethrown(thrown) => Err(thrown),
			CycleOutcome::Succeeded | CycleOutcome::Handled => Ok(()),
		})
	}

	/// Run `routine` once under the guard.
	pub fn run_cycle<F>(&self, routine: F) -> CycleOutcome
	where
		F: FnOnce() -> Result<(), Thrown>,
	{
		let thrown = match panic::catch_unwind(AssertUnwindSafe(routine)) {
			Ok(Ok(())) => return CycleOutcome::Succeeded,
			Ok(Err(thrown)) => thrown,
			Err(payload) => match Thrown::from_panic(payload) {
				Thrown::Value(payload) => {
					warn!("Routine panicked with a non-error payload, resuming unwind");
					panic::resume_unwind(payload)
				}
				err => err,
			},
		};

		match thrown {
			Thrown::Error(err) => {
				self.report(&err);
				CycleOutcome::Handled
			}
			value => {
				warn!(thrown = ?value, "Routine failed with a non-error value, passing it through");
				CycleOutcome::Rethrown(value)
			}
		}
	}

	fn report(&self, err: &ScriptError) {
		let trace = err.trace();

		if self.options.restricted {
			debug!(error = %err, "Restricted mode, logging untranslated trace");
			self.emit(&format!("{RESTRICTED_NOTICE}<br>{}", escape_html(&trace)));
			return;
		}

		match self.translator.source_mapped_stack_trace(&trace) {
			Ok(translated) => self.emit(&escape_html(&translated)),
			Err(e) => {
				warn!(error = %e, "Source map translation failed, logging untranslated trace");
				let notice = format!("{TRANSLATION_FAILED_NOTICE}: {e}");
				self.emit(&format!(
					"{}<br>{}",
					escape_html(&notice),
					escape_html(&trace)
				));
			}
		}
	}

	fn emit(&self, body: &str) {
		self.sink.emit(&format!(
			"<span style='color:{}'>{body}</span>",
			escape_html(&self.options.color)
		));
	}
}
