// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with the collector's User-Agent header.

use reqwest::{Client, ClientBuilder};

/// User-Agent the collector uses to identify this SDK.
pub const USER_AGENT: &str = "CodeLighthouse";

/// Creates a new HTTP client with the standard CodeLighthouse User-Agent.
pub fn new_client() -> reqwest::Result<Client> {
	builder().build()
}

/// Creates a new HTTP client builder with the standard User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = codelighthouse_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(USER_AGENT)
}
