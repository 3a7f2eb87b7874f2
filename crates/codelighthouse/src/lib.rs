// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! CodeLighthouse error reporting SDK for Rust applications.
//!
//! Captures panics, failed background tasks and manually reported errors,
//! normalizes them into envelopes and posts them to the CodeLighthouse
//! collector. Delivery is best-effort: every report is attempted once, and
//! a failure to report never surfaces in the host application.
//!
//! # Example
//!
//! ```ignore
//! use codelighthouse::{Environment, ReporterConfig};
//!
//! codelighthouse::init(
//!     "acme",
//!     "api_key",
//!     "ops@acme.io",
//!     ReporterConfig::default().environment(Environment::Prod),
//! )?;
//!
//! if let Err(e) = run() {
//!     codelighthouse::global().report(&e)?;
//! }
//! ```

mod adapters;
mod config;
mod error;
mod panic_hook;
mod registry;
mod reporter;
mod transport;

#[cfg(test)]
mod testing;

use std::sync::OnceLock;

pub use adapters::{FailureObserver, ReportExt};
pub use codelighthouse_core::{
	capture_stack, parse_stack_trace, Environment, ErrorEnvelope, ErrorPayload, RaisedError,
	ResourceIdentity, StackFrame,
};
pub use config::ReporterConfig;
pub use error::{LighthouseError, Result};
pub use registry::{FailureClass, FailureHandler, HandlerRegistry};
pub use reporter::{ReportHandle, Reporter};
pub use transport::{
	HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, SubmitOutcome, TransportClient,
	TransportError, RATE_LIMIT_MESSAGE, SUPPORT_MESSAGE,
};

static GLOBAL: OnceLock<Reporter> = OnceLock::new();

/// The process-wide reporter. Unconfigured until [`init`] succeeds.
pub fn global() -> &'static Reporter {
	GLOBAL.get_or_init(Reporter::new)
}

/// Initializes the process-wide reporter.
pub fn init(
	organization: impl Into<String>,
	api_key: impl Into<String>,
	default_email: impl Into<String>,
	config: ReporterConfig,
) -> Result<()> {
	global().initialize(organization, api_key, default_email, config)
}

/// Reports an error through the process-wide reporter.
///
/// Fails with [`LighthouseError::NotConfigured`] before [`init`].
pub fn report_error(
	error: &RaisedError,
	email: Option<&str>,
	data: Option<serde_json::Value>,
) -> Result<ReportHandle> {
	global().report_error(error, email, data)
}
