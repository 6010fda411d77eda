// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Values a guarded routine can fail with.

use std::any::Any;
use std::fmt;

/// An error-like failure: a kind, a message and the raw stack trace text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
	pub name: String,
	pub message: String,
	/// Raw trace as produced by the bundled program, header line included.
	pub stack: String,
}

impl ScriptError {
	pub fn new(name: impl Into<String>, message: impl Into<String>, stack: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			stack: stack.into(),
		}
	}

	/// Build an error from a raw trace, taking kind and message from its
	/// `Kind: message` header line.
	pub fn from_stack(stack: impl Into<String>) -> Self {
		let stack = stack.into();
		let header = stack.lines().next().unwrap_or_default();
		let (name, message) = match header.split_once(": ") {
			Some((name, message)) => (name.to_string(), message.to_string()),
			None => (header.to_string(), String::new()),
		};
		Self {
			name,
			message,
			stack,
		}
	}

	/// The text to translate: the stack, or the summary when there is none.
	pub fn trace(&self) -> String {
		if self.stack.is_empty() {
			self.to_string()
		} else {
			self.stack.clone()
		}
	}
}

impl fmt::Display for ScriptError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (self.name.is_empty(), self.message.is_empty()) {
			(_, true) => write!(f, "{}", self.name),
			(true, false) => write!(f, "{}", self.message),
			(false, false) => write!(f, "{}: {}", self.name, self.message),
		}
	}
}

impl std::error::Error for ScriptError {}

/// A failure raised by a guarded routine.
pub enum Thrown {
	/// Recognized error; the guard logs it and carries on.
	Error(ScriptError),
	/// Anything else. The guard hands it back untouched.
	Value(Box<dyn Any + Send>),
}

impl Thrown {
	pub fn value<T: Any + Send>(value: T) -> Self {
		Self::Value(Box::new(value))
	}

	pub fn is_error_like(&self) -> bool {
		matches!(self, Self::Error(_))
	}

	/// Borrow a non-error payload as `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Value(value) => value.downcast_ref::<T>(),
			Self::Error(_) => None,
		}
	}

	/// Classify a panic payload. Only a [`ScriptError`] payload is error-like.
	pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
		match payload.downcast::<ScriptError>() {
			Ok(err) => Self::Error(*err),
			Err(payload) => Self::Value(payload),
		}
	}
}

impl From<ScriptError> for Thrown {
	fn from(err: ScriptError) -> Self {
		Self::Error(err)
	}
}

impl fmt::Debug for Thrown {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
			Self::Value(value) => {
				let mut tuple = f.debug_tuple("Value");
				if let Some(s) = value.downcast_ref::<&str>() {
					tuple.field(s);
				} else if let Some(s) = value.downcast_ref::<String>() {
					tuple.field(s);
				} else {
					tuple.field(&"Box<dyn Any>");
				}
				tuple.finish()
			}
		}
	}
}
