// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The error value handed to the envelope builder.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::Location;

use crate::parser::rust_frame_header;

/// Maximum number of frames kept when capturing a backtrace.
pub const STACK_TRACE_LIMIT: usize = 20;

/// A captured failure: classification name, message and raw stack trace.
///
/// Any of the three may be empty; the envelope builder tolerates that.
/// `RaisedError` can also be used as a panic payload with
/// [`std::panic::panic_any`] to control the reported `error_type`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RaisedError {
	pub name: String,
	pub message: String,
	pub stack: String,
}

impl RaisedError {
	pub fn new(name: impl Into<String>, message: impl Into<String>, stack: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			stack: stack.into(),
		}
	}

	/// Captures a Rust error together with a backtrace of the current thread.
	///
	/// The message includes the `source()` chain, joined with `": "`.
	pub fn from_error<E>(error: &E) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		let mut message = error.to_string();
		let mut source = error.source();
		while let Some(cause) = source {
			message.push_str(": ");
			message.push_str(&cause.to_string());
			source = cause.source();
		}

		Self {
			name: short_type_name(std::any::type_name::<E>()).to_string(),
			message,
			stack: capture_stack(),
		}
	}

	/// Captures a panic payload.
	///
	/// A `RaisedError` payload is reported as-is (a backtrace is attached if
	/// it has none). String payloads are reported with the name `panic`.
	pub fn from_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> Self {
		if let Some(raised) = payload.downcast_ref::<RaisedError>() {
			let mut raised = raised.clone();
			if raised.stack.is_empty() {
				raised.stack = capture_stack();
			}
			return raised;
		}

		let mut message = if let Some(s) = payload.downcast_ref::<&str>() {
			(*s).to_string()
		} else if let Some(s) = payload.downcast_ref::<String>() {
			s.clone()
		} else {
			"Box<dyn Any>".to_string()
		};

		if let Some(location) = location {
			message = format!(
				"{message} at {}:{}:{}",
				location.file(),
				location.line(),
				location.column()
			);
		}

		Self {
			name: "panic".to_string(),
			message,
			stack: capture_stack(),
		}
	}
}

/// Captures the current thread's backtrace, limited to [`STACK_TRACE_LIMIT`] frames.
pub fn capture_stack() -> String {
	limit_frames(&Backtrace::force_capture().to_string(), STACK_TRACE_LIMIT)
}

/// Keeps the lines of a Rust backtrace up to (not including) frame `max`.
fn limit_frames(trace: &str, max: usize) -> String {
	let mut seen = 0;
	let mut kept = Vec::new();

	for line in trace.lines() {
		if rust_frame_header(line).is_some() {
			seen += 1;
			if seen > max {
				break;
			}
		}
		kept.push(line);
	}

	kept.join("\n")
}

/// `std::io::error::Error` -> `Error`, `my_app::Wrapper<u8>` -> `Wrapper`.
fn short_type_name(full: &str) -> &str {
	let full = full.strip_prefix("dyn ").unwrap_or(full);
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}
