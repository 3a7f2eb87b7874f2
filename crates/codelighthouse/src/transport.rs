// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transport to the CodeLighthouse collector.
//!
//! Every submission is a single POST. The response is classified into a
//! [`SubmitOutcome`] and logged; nothing is retried and nothing is
//! propagated to the caller as an error.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use codelighthouse_common_http::collector_headers;
use codelighthouse_core::ErrorPayload;
use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// API version segment of the collector URL.
pub const API_VERSION: &str = "v1";
/// Path of the error submission endpoint, relative to the versioned base.
pub const ERROR_PATH: &str = "/error";

/// Logged when the collector answers 429.
pub const RATE_LIMIT_MESSAGE: &str =
	"CODELIGHTHOUSE: you have reached your rate limit of errors for the month. Please upgrade your plan for more.";
/// Logged after any unexpected collector status.
pub const SUPPORT_MESSAGE: &str =
	"Please contact CodeLighthouse support for help - hello@codelighthouse.io";

/// A POST request handed to an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
	pub url: String,
	pub headers: HeaderMap,
	pub body: String,
}

/// Status and body of a collector response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub body: String,
}

/// A failure to obtain any response.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("{0}")]
	Other(String),
}

/// The HTTP seam of the SDK. Implemented over `reqwest` by
/// [`ReqwestTransport`]; tests substitute their own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
	/// Sends one POST and returns whatever the server answered.
	async fn post(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Creates a transport with the standard CodeLighthouse client.
	pub fn new() -> Result<Self> {
		Ok(Self {
			client: codelighthouse_common_http::new_client()?,
		})
	}

	/// Wraps an existing client, e.g. one with a custom timeout.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn post(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
		let response = self
			.client
			.post(&request.url)
			.headers(request.headers)
			.body(request.body)
			.send()
			.await?;

		let status = response.status().as_u16();
		let body = read_body(status, response.text().await);
		Ok(HttpResponse { status, body })
	}
}

/// The response body, or a description of why it could not be read.
fn read_body<E: fmt::Display>(status: u16, body: std::result::Result<String, E>) -> String {
	match body {
		Ok(body) => body,
		Err(e) => {
			debug!(status, error = %e, "CODELIGHTHOUSE: failed to read response body");
			format!("<unreadable response body: {e}>")
		}
	}
}

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// 200 or 201. Carries the server-assigned id when the body has one.
	Accepted { error_guid: Option<String> },
	/// 429: the organization's plan limit is exhausted.
	RateLimited,
	/// Any other status.
	ServerRejected { status: u16, body: String },
	/// No response was received.
	TransportFailure { description: String },
}

impl SubmitOutcome {
	/// Classifies a collector response.
	pub fn classify(response: HttpResponse) -> Self {
		match response.status {
			200 | 201 => Self::Accepted {
				error_guid: extract_error_guid(&response.body),
			},
			429 => Self::RateLimited,
			status => Self::ServerRejected {
				status,
				body: response.body,
			},
		}
	}

	pub fn is_accepted(&self) -> bool {
		matches!(self, Self::Accepted { .. })
	}
}

fn extract_error_guid(body: &str) -> Option<String> {
	let value: serde_json::Value = serde_json::from_str(body).ok()?;
	match value.get("error_guid")? {
		serde_json::Value::String(guid) => Some(guid.clone()),
		serde_json::Value::Null => None,
		other => Some(other.to_string()),
	}
}

/// Client for the collector's error endpoint.
///
/// Cheap to clone; the configuration is read-only after construction and
/// may be shared by any number of concurrent submissions.
#[derive(Clone)]
pub struct TransportClient {
	endpoint: String,
	headers: HeaderMap,
	debug: bool,
	http: Arc<dyn HttpTransport>,
}

impl TransportClient {
	/// Creates a client for `{base_url}/v1/error`.
	pub fn new(
		base_url: &str,
		organization: &str,
		api_key: &str,
		debug: bool,
		http: Arc<dyn HttpTransport>,
	) -> Result<Self> {
		let base_url = base_url.trim_end_matches('/');
		Ok(Self {
			endpoint: format!("{base_url}/{API_VERSION}{ERROR_PATH}"),
			headers: collector_headers(organization, api_key)?,
			debug,
			http,
		})
	}

	/// Full URL submissions are posted to.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn is_debug(&self) -> bool {
		self.debug
	}

	/// Posts the payload once and logs the classified outcome.
	pub async fn submit(&self, payload: &ErrorPayload) -> SubmitOutcome {
		let body = match serde_json::to_string(payload) {
			Ok(body) => body,
			Err(e) => {
				let outcome = SubmitOutcome::TransportFailure {
					description: e.to_string(),
				};
				log_outcome(&outcome);
				return outcome;
			}
		};

		if self.debug {
			debug!(url = %self.endpoint, payload = %body, "CODELIGHTHOUSE: sending error");
		}

		let request = HttpRequest {
			url: self.endpoint.clone(),
			headers: self.headers.clone(),
			body,
		};

		let outcome = match self.http.post(request).await {
			Ok(response) => {
				debug!(status = response.status, "CODELIGHTHOUSE: returned status code");
				SubmitOutcome::classify(response)
			}
			Err(e) => SubmitOutcome::TransportFailure {
				description: e.to_string(),
			},
		};

		log_outcome(&outcome);
		outcome
	}
}

impl fmt::Debug for TransportClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TransportClient")
			.field("endpoint", &self.endpoint)
			.field("debug", &self.debug)
			.finish_non_exhaustive()
	}
}

fn log_outcome(outcome: &SubmitOutcome) {
	match outcome {
		SubmitOutcome::Accepted { error_guid } => {
			info!(
				error_guid = error_guid.as_deref().unwrap_or("unknown"),
				"CODELIGHTHOUSE: error accepted"
			);
		}
		SubmitOutcome::RateLimited => warn!("{RATE_LIMIT_MESSAGE}"),
		SubmitOutcome::ServerRejected { status, body } => {
			warn!(status, "CODELIGHTHOUSE: returned message {body}");
			warn!("{SUPPORT_MESSAGE}");
		}
		SubmitOutcome::TransportFailure { description } => {
			error!(
				error = %description,
				"CODELIGHTHOUSE: An error occurred when trying to send an error to CodeLighthouse"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{LogCapture, RecordingTransport};
	use codelighthouse_core::{ErrorEnvelope, RaisedError, ResourceIdentity};

	fn payload() -> ErrorPayload {
		let error = RaisedError::new("TypeError", "boom", "TypeError: boom\n    at f (/app/f.js:1:2)");
		ErrorEnvelope::build(&error, "ops@acme.io", &ResourceIdentity::default(), None).to_payload()
	}

	fn client(http: Arc<dyn HttpTransport>) -> TransportClient {
		TransportClient::new("https://dev.codelighthouse.io", "acme", "key123", true, http).unwrap()
	}

	#[test]
	fn endpoint_is_versioned_error_path() {
		let client = client(RecordingTransport::responding(200, "{}"));
		assert_eq!(client.endpoint(), "https://dev.codelighthouse.io/v1/error");
		assert!(client.is_debug());
	}

	#[test]
	fn normalizes_trailing_slash() {
		let client =
			TransportClient::new("http://localhost:5000/", "acme", "key123", false, RecordingTransport::responding(200, "{}"))
				.unwrap();
		assert_eq!(client.endpoint(), "http://localhost:5000/v1/error");
	}

	#[test]
	fn rejects_invalid_header_values() {
		let result =
			TransportClient::new("https://codelighthouse.io", "acme\n", "key123", false, RecordingTransport::responding(200, "{}"));
		assert!(matches!(result, Err(crate::LighthouseError::InvalidHeader(_))));
	}

	#[test]
	fn classify_statuses() {
		let accepted = SubmitOutcome::classify(HttpResponse {
			status: 201,
			body: r#"{"error_guid": "abc123"}"#.to_string(),
		});
		assert_eq!(
			accepted,
			SubmitOutcome::Accepted {
				error_guid: Some("abc123".to_string())
			}
		);
		assert!(accepted.is_accepted());

		let no_guid = SubmitOutcome::classify(HttpResponse {
			status: 200,
			body: "not json".to_string(),
		});
		assert_eq!(no_guid, SubmitOutcome::Accepted { error_guid: None });

		let limited = SubmitOutcome::classify(HttpResponse {
			status: 429,
			body: String::new(),
		});
		assert_eq!(limited, SubmitOutcome::RateLimited);

		let rejected = SubmitOutcome::classify(HttpResponse {
			status: 404,
			body: "nope".to_string(),
		});
		assert_eq!(
			rejected,
			SubmitOutcome::ServerRejected {
				status: 404,
				body: "nope".to_string()
			}
		);
	}

	#[test]
	fn numeric_error_guid_is_stringified() {
		assert_eq!(extract_error_guid(r#"{"error_guid": 42}"#), Some("42".to_string()));
		assert_eq!(extract_error_guid(r#"{"error_guid": null}"#), None);
		assert_eq!(extract_error_guid(r#"{}"#), None);
	}

	#[tokio::test]
	async fn submit_posts_payload_with_collector_headers() {
		let http = RecordingTransport::responding(200, r#"{"error_guid": "abc123"}"#);
		client(http.clone()).submit(&payload()).await;

		let requests = http.requests();
		assert_eq!(requests.len(), 1);
		let request = &requests[0];
		assert_eq!(request.url, "https://dev.codelighthouse.io/v1/error");
		assert_eq!(request.headers["organization"], "acme");
		assert_eq!(request.headers["x-api-key"], "key123");
		assert_eq!(request.headers["user-agent"], "CodeLighthouse");
		assert_eq!(request.headers["content-type"], "application/json");

		let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
		assert_eq!(body["error_type"], "TypeError");
		assert_eq!(body["description"], "boom");
		assert_eq!(body["email"], "ops@acme.io");
		assert_eq!(body["function"], "f");
	}

	#[tokio::test]
	async fn accepted_logs_error_guid_once() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		let outcome = client(RecordingTransport::responding(200, r#"{"error_guid": "abc123"}"#))
			.submit(&payload())
			.await;

		assert_eq!(
			outcome,
			SubmitOutcome::Accepted {
				error_guid: Some("abc123".to_string())
			}
		);
		assert_eq!(logs.lines_containing("error accepted"), 1);
		assert_eq!(logs.lines_containing("abc123"), 1);
	}

	#[tokio::test]
	async fn rate_limited_logs_advisory() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		let outcome = client(RecordingTransport::responding(429, "")).submit(&payload()).await;

		assert_eq!(outcome, SubmitOutcome::RateLimited);
		assert_eq!(logs.lines_containing("rate limit of errors for the month"), 1);
	}

	#[tokio::test]
	async fn server_error_logs_body_and_support_message() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		let outcome = client(RecordingTransport::responding(500, "internal explosion"))
			.submit(&payload())
			.await;

		assert_eq!(
			outcome,
			SubmitOutcome::ServerRejected {
				status: 500,
				body: "internal explosion".to_string()
			}
		);
		assert_eq!(logs.lines_containing("returned message internal explosion"), 1);
		assert_eq!(logs.lines_containing("hello@codelighthouse.io"), 1);
	}

	#[test]
	fn unreadable_body_is_described_not_blanked() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		let body = read_body(502, Err::<String, _>("connection reset mid-body"));

		assert_eq!(body, "<unreadable response body: connection reset mid-body>");
		assert_eq!(logs.lines_containing("failed to read response body"), 1);
		assert_eq!(read_body(200, Ok::<_, String>("ok".to_string())), "ok");
	}

	#[tokio::test]
	async fn network_failure_logs_description() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		let outcome = client(RecordingTransport::failing("connection refused"))
			.submit(&payload())
			.await;

		assert_eq!(
			outcome,
			SubmitOutcome::TransportFailure {
				description: "connection refused".to_string()
			}
		);
		assert_eq!(logs.lines_containing("connection refused"), 1);
	}

	#[tokio::test]
	async fn debug_mode_logs_status_and_payload() {
		let logs = LogCapture::default();
		let _guard = logs.install();

		client(RecordingTransport::responding(201, "{}")).submit(&payload()).await;

		assert_eq!(logs.lines_containing("sending error"), 1);
		assert_eq!(logs.lines_containing("returned status code"), 1);
	}
}
