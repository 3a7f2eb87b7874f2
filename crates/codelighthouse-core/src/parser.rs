// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack trace parsing into structured frames.
//!
//! Three textual formats are understood:
//!
//! - V8: `at function (file:line:column)` and `at file:line:column`
//! - Gecko / JavaScriptCore: `function@file:line:column`
//! - Rust `std::backtrace::Backtrace` output, where a numbered `N: symbol`
//!   header is followed by an `at file:line:column` location line
//!
//! Parsing never fails. Lines that match none of these shapes (the error
//! message header, `note:` footers, garbage) are skipped. Rust headers are
//! only recognized in traces without JavaScript frames.

use rustc_demangle::demangle;
use serde::{Deserialize, Serialize};

/// Location tokens V8 prints in place of a `file:line:column` triple.
const OPAQUE_LOCATIONS: &[&str] = &["native", "<anonymous>", "unknown location"];

/// One call site of a parsed stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackFrame {
	pub file: Option<String>,
	/// Source text of the line. Always empty: traces do not carry source.
	pub line_content: String,
	pub line_number: Option<u32>,
	pub column_number: Option<u32>,
	pub function_name: Option<String>,
	/// Call arguments, when the runtime embeds them in the trace.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub arguments: Vec<String>,
}

/// Parse a raw stack trace into frames, innermost call first.
pub fn parse_stack_trace(trace: &str) -> Vec<StackFrame> {
	// A JavaScript trace never contains Rust frames, so numbered message
	// lines such as `1: timeout` are not mistaken for backtrace headers.
	let rust_frames_allowed = !trace.lines().any(|line| is_js_frame_line(line.trim()));

	let mut frames = Vec::new();
	// Index of a Rust frame still waiting for its `at file:line:col` line.
	let mut awaiting_location: Option<usize> = None;
	// Inlined symbols only follow the location line of a Rust frame.
	let mut after_rust_location = false;

	for line in trace.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if rust_frames_allowed {
			if let Some(symbol) = rust_frame_header(line) {
				frames.push(rust_frame(symbol));
				awaiting_location = Some(frames.len() - 1);
				after_rust_location = false;
				continue;
			}
		}

		if let Some(rest) = line.strip_prefix("at ") {
			if let Some(idx) = awaiting_location.take() {
				if let Some(location) = parse_rust_location(rest) {
					location.apply(&mut frames[idx]);
					after_rust_location = true;
					continue;
				}
			}
			after_rust_location = false;
			if let Some(frame) = parse_v8_line(rest) {
				frames.push(frame);
			}
			continue;
		}

		awaiting_location = None;

		if let Some(frame) = parse_gecko_line(line) {
			frames.push(frame);
			after_rust_location = false;
			continue;
		}

		// Inlined symbols in a Rust backtrace are printed without a frame number.
		if after_rust_location && is_inlined_rust_symbol(line) {
			frames.push(rust_frame(line));
			awaiting_location = Some(frames.len() - 1);
		}
		after_rust_location = false;
	}

	frames
}

/// V8 `at fn (location)` or Gecko `fn@location` lines carrying a line number.
fn is_js_frame_line(line: &str) -> bool {
	match line.strip_prefix("at ") {
		Some(rest) => {
			let rest = rest.trim();
			location_group_start(rest).is_some() && parse_v8_line(rest).is_some()
		}
		None => parse_gecko_line(line).is_some(),
	}
}

/// Parse the location line of a Rust frame. Only a bare `file:line[:col]`
/// qualifies; anything else is left for the V8 parser.
fn parse_rust_location(rest: &str) -> Option<Location> {
	let rest = rest.trim();
	if rest.ends_with(')') {
		return None;
	}
	parse_location(rest).filter(|location| location.line.is_some())
}

/// Returns the symbol of a numbered Rust backtrace header (`  3: my_app::run`).
pub(crate) fn rust_frame_header(line: &str) -> Option<&str> {
	let (index, rest) = line.trim().split_once(':')?;
	if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	let mut symbol = rest.trim();
	// Older `backtrace` crate output: `0x55d0c1a2b3c4 - my_app::run`
	if symbol.starts_with("0x") {
		symbol = symbol.split_once(" - ").map(|(_, name)| name.trim())?;
	}

	if symbol.is_empty() || !is_plausible_rust_symbol(symbol) {
		return None;
	}
	Some(symbol)
}

fn is_plausible_rust_symbol(symbol: &str) -> bool {
	// Trait impls (`<T as Trait>::f`) are the only symbols containing spaces.
	!symbol.contains(char::is_whitespace) || symbol.starts_with('<')
}

fn is_inlined_rust_symbol(line: &str) -> bool {
	(line.contains("::") || line.starts_with('<'))
		&& !line.contains(": ")
		&& is_plausible_rust_symbol(line)
}

fn rust_frame(symbol: &str) -> StackFrame {
	StackFrame {
		function_name: Some(format!("{:#}", demangle(symbol))),
		..Default::default()
	}
}

/// Parse the remainder of a V8 `at ...` line.
fn parse_v8_line(rest: &str) -> Option<StackFrame> {
	let rest = rest.trim();
	let rest = rest.strip_prefix("async ").unwrap_or(rest);

	if let Some(open) = location_group_start(rest) {
		let function = rest[..open].trim();
		let location = parse_location(eval_origin(&rest[open + 1..rest.len() - 1]))?;
		if location.line.is_none() && !OPAQUE_LOCATIONS.contains(&location.file.as_str()) {
			return None;
		}
		let mut frame = js_frame(function);
		location.apply(&mut frame);
		return Some(frame);
	}

	// Anonymous frame: the whole remainder is the location.
	let location = parse_location(rest).filter(|l| l.line.is_some())?;
	let mut frame = StackFrame::default();
	location.apply(&mut frame);
	Some(frame)
}

/// Finds the `(` matching the trailing `)` of a V8 frame line.
fn location_group_start(rest: &str) -> Option<usize> {
	if !rest.ends_with(')') {
		return None;
	}
	let mut depth = 0usize;
	for (idx, ch) in rest.char_indices().rev() {
		match ch {
			')' => depth += 1,
			'(' => {
				depth -= 1;
				if depth == 0 {
					return (idx > 0).then_some(idx);
				}
			}
			_ => {}
		}
	}
	None
}

/// `eval at fn (file.js:1:2), <anonymous>:3:4` reports the origin of the eval.
fn eval_origin(location: &str) -> &str {
	if !location.starts_with("eval at ") {
		return location;
	}
	match (location.find('('), location.find(')')) {
		(Some(open), Some(close)) if open < close => &location[open + 1..close],
		_ => location,
	}
}

/// Parse a Gecko / JavaScriptCore `function@file:line:column` line.
fn parse_gecko_line(line: &str) -> Option<StackFrame> {
	let (function, location) = line.split_once('@')?;
	let name = function.split('(').next().unwrap_or(function);
	if name.contains(char::is_whitespace) {
		return None;
	}
	let location = parse_location(location).filter(|l| l.line.is_some())?;
	let mut frame = js_frame(function);
	location.apply(&mut frame);
	Some(frame)
}

/// Builds a frame from a JavaScript function token, splitting out `(args)`.
fn js_frame(function: &str) -> StackFrame {
	let function = function.trim();
	let (name, arguments) = match function.find('(') {
		Some(open) if function.ends_with(')') => {
			let arguments = function[open + 1..function.len() - 1]
				.split(',')
				.map(str::trim)
				.filter(|arg| !arg.is_empty())
				.map(str::to_string)
				.collect();
			(function[..open].trim(), arguments)
		}
		_ => (function, Vec::new()),
	};

	StackFrame {
		function_name: (!name.is_empty()).then(|| name.to_string()),
		arguments,
		..Default::default()
	}
}

struct Location {
	file: String,
	line: Option<u32>,
	column: Option<u32>,
}

impl Location {
	fn apply(self, frame: &mut StackFrame) {
		frame.file = Some(self.file);
		frame.line_number = self.line;
		frame.column_number = self.column;
	}
}

/// Splits `file:line:column` (or `file:line`, or a bare file) from the right.
fn parse_location(location: &str) -> Option<Location> {
	let mut file = location.trim();
	let mut numbers = Vec::with_capacity(2);

	while numbers.len() < 2 {
		let Some((head, tail)) = file.rsplit_once(':') else {
			break;
		};
		let Ok(n) = tail.parse::<u32>() else {
			break;
		};
		numbers.push(n);
		file = head;
	}

	if file.is_empty() {
		return None;
	}

	let (line, column) = match numbers.as_slice() {
		[column, line] => (Some(*line), Some(*column)),
		[line] => (Some(*line), None),
		_ => (None, None),
	};

	Some(Location {
		file: file.to_string(),
		line,
		column,
	})
}
