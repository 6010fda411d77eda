// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook that keeps contained failures off stderr.

use std::any::Any;
use std::sync::Once;

use crate::thrown::ScriptError;

static INSTALL: Once = Once::new();

/// Install a panic hook that stays silent for [`ScriptError`] payloads.
///
/// Wraps the hook in place at the time of the first call; every other payload
/// is passed on to it. A [`LoopGuard`](crate::LoopGuard) installs it when
/// constructed, so a contained failure produces only the guard's log line.
/// Later calls do nothing.
pub fn install_panic_hook() {
	INSTALL.call_once(|| {
		let previous_hook = std::panic::take_hook();

		std::panic::set_hook(Box::new(move |info| {
			if is_contained_payload(info.payload()) {
				return;
			}
			previous_hook(info);
		}));
	});
}

/// Whether a panic payload is one the guard contains and logs itself.
pub fn is_contained_payload(payload: &(dyn Any + Send)) -> bool {
	payload.is::<ScriptError>()
}
