// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error envelopes: one captured error plus its reporting context.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::{parse_stack_trace, StackFrame};
use crate::raised::RaisedError;

/// Optional identifiers of the resource that reports errors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceIdentity {
	pub resource_group: Option<String>,
	pub resource_name: Option<String>,
	pub github_repo: Option<String>,
}

/// A normalized, immutable error report.
///
/// `frames` is derived solely from `stack_trace`; `top_function` and
/// `top_arguments` come from the innermost frame and are `None` when the
/// trace yields no frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	pub error_type: String,
	pub description: String,
	pub email: String,
	pub github_repo: Option<String>,
	pub resource_group: Option<String>,
	pub resource_name: Option<String>,
	pub user_data: Option<serde_json::Value>,
	pub stack_trace: String,
	pub frames: Vec<StackFrame>,
	pub top_function: Option<String>,
	pub top_arguments: Option<Vec<String>>,
}

impl ErrorEnvelope {
	/// Builds an envelope. Pure and infallible.
	pub fn build(
		error: &RaisedError,
		email: impl Into<String>,
		identity: &ResourceIdentity,
		user_data: Option<serde_json::Value>,
	) -> Self {
		let frames = parse_stack_trace(&error.stack);
		let top = frames.first();

		Self {
			error_type: error.name.clone(),
			description: error.message.clone(),
			email: email.into(),
			github_repo: identity.github_repo.clone(),
			resource_group: identity.resource_group.clone(),
			resource_name: identity.resource_name.clone(),
			user_data,
			stack_trace: error.stack.clone(),
			top_function: top.and_then(|frame| frame.function_name.clone()),
			top_arguments: top.map(|frame| frame.arguments.clone()),
			frames,
		}
	}

	/// The flat shape sent to the collector.
	pub fn to_payload(&self) -> ErrorPayload {
		ErrorPayload {
			error_type: self.error_type.clone(),
			description: self.description.clone(),
			email: self.email.clone(),
			github_repo: self.github_repo.clone(),
			resource_group: self.resource_group.clone(),
			resource_name: self.resource_name.clone(),
			user_data: self.user_data.clone(),
			stack_trace: self.stack_trace.clone(),
			function: self.top_function.clone(),
			arguments: self.top_arguments.clone(),
		}
	}

	/// Serializes the wire payload to JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(&self.to_payload())?)
	}
}

/// Request body of `POST /v1/error`.
///
/// Parsed frames are not sent; the collector re-parses `stack_trace`.
/// Absent values are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub error_type: String,
	pub description: String,
	pub email: String,
	pub github_repo: Option<String>,
	pub resource_group: Option<String>,
	pub resource_name: Option<String>,
	pub user_data: Option<serde_json::Value>,
	pub stack_trace: String,
	pub function: Option<String>,
	pub arguments: Option<Vec<String>>,
}
