// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the reporting SDK.

use codelighthouse_core::CoreError;
use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, LighthouseError>;

/// Errors surfaced to the host application.
///
/// Remote submission failures are never reported through this type; they
/// are logged and returned as a [`crate::SubmitOutcome`].
#[derive(Debug, Error)]
pub enum LighthouseError {
	/// The reporter was used before `initialize`.
	#[error("CodeLighthouse reporter is not configured; call initialize first")]
	NotConfigured,

	/// Missing or blank organization name.
	#[error("organization is required")]
	MissingOrganization,

	/// Missing or blank API key.
	#[error("API key is required")]
	MissingApiKey,

	/// Missing or blank default email.
	#[error("default email is required")]
	MissingDefaultEmail,

	/// The organization or API key cannot be sent as a header.
	#[error("invalid header value: {0}")]
	InvalidHeader(#[from] InvalidHeaderValue),

	/// The HTTP client could not be built.
	#[error("HTTP client setup failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// A background task was requested outside of any tokio runtime.
	#[error("no tokio runtime available")]
	NoRuntime,

	/// Invalid configuration value.
	#[error(transparent)]
	Core(#[from] CoreError),
}
