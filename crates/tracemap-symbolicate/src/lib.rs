// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map backed translation of stack traces from a bundled program.
//!
//! This crate provides:
//! - Source Map v3 parsing and Base64 VLQ decoding
//! - A [`MapStore`] that parses the map once, on first use
//! - A [`Translator`] that rewrites the leading run of bundle frames in a
//!   raw trace into original source locations
//! - A [`TranslationCache`] that memoizes translated traces
//! - [`TraceTranslator`], the context object tying the three together
//!
//! # Example
//!
//! ```
//! use tracemap_symbolicate::{MapStore, TraceTranslator};
//!
//! let map = r#"{
//!     "version": 3,
//!     "sources": ["src/app.ts"],
//!     "names": ["run"],
//!     "mappings": "AAAAA"
//! }"#;
//!
//! let ctx = TraceTranslator::with_default_sentinel(MapStore::from_bytes(map));
//! let out = ctx
//!     .source_mapped_stack_trace("Error: boom\n    at r (main:1:0)")
//!     .unwrap();
//!
//! assert_eq!(out, "Error: boom\n    at run (src/app.ts:1:0)");
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod frame;
pub mod sourcemap;
pub mod store;
pub mod translate;
pub mod vlq;

pub use cache::TranslationCache;
pub use context::TraceTranslator;
pub use error::{Result, SymbolicateError};
pub use frame::{parse_frame, StackFrame};
pub use sourcemap::{MapStats, ParsedSourceMap, Position};
pub use store::{MapSource, MapStore, DEFAULT_MAP_FILE};
pub use translate::{PositionLookup, Translator, DEFAULT_BUNDLE_SENTINEL};
