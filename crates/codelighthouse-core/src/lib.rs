// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for CodeLighthouse error reporting.
//!
//! This crate holds everything that is pure data and pure transformation:
//! - Stack trace parsing into structured frames (V8, Gecko and Rust formats)
//! - The `RaisedError` captured from errors and panics
//! - The immutable `ErrorEnvelope` and its wire payload
//! - The `Environment` tag that selects a collector endpoint
//!
//! Nothing here performs I/O. The `codelighthouse` crate owns transport and
//! process-wide failure hooks.

pub mod envelope;
pub mod environment;
pub mod error;
pub mod parser;
pub mod raised;

pub use envelope::{ErrorEnvelope, ErrorPayload, ResourceIdentity};
pub use environment::Environment;
pub use error::{CoreError, Result};
pub use parser::{parse_stack_trace, StackFrame};
pub use raised::{capture_stack, RaisedError, STACK_TRACE_LIMIT};
