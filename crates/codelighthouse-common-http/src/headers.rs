// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Headers attached to every collector request.

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, CONTENT_TYPE, USER_AGENT};

use crate::client;

/// Header carrying the organization name.
pub const ORGANIZATION_HEADER: &str = "organization";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Builds the header set for collector requests.
///
/// Fails if the organization or API key contain characters that are not
/// valid in a header value.
pub fn collector_headers(organization: &str, api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
	let mut headers = HeaderMap::new();
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	headers.insert(USER_AGENT, HeaderValue::from_static(client::USER_AGENT));
	headers.insert(ORGANIZATION_HEADER, HeaderValue::from_str(organization)?);

	let mut api_key = HeaderValue::from_str(api_key)?;
	api_key.set_sensitive(true);
	headers.insert(API_KEY_HEADER, api_key);

	Ok(headers)
}
