// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core envelope types.

use thiserror::Error;

/// Errors that can occur while handling core types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid environment: {0}")]
	InvalidEnvironment(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
