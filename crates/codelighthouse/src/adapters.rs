// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration adapters for host frameworks.
//!
//! A framework shim only needs a [`FailureObserver`]: it calls
//! `on_failure` once per failure and then lets the failure continue along
//! its normal path.

use codelighthouse_core::RaisedError;
use tracing::warn;

use crate::reporter::Reporter;

/// Observes failures without taking ownership of them.
pub trait FailureObserver: Send + Sync {
	/// Called exactly once per failure.
	fn on_failure(&self, error: &RaisedError);
}

impl FailureObserver for Reporter {
	fn on_failure(&self, error: &RaisedError) {
		if let Err(e) = self.report_error(error, None, None) {
			warn!(error = %e, "CODELIGHTHOUSE: failed to report error from adapter");
		}
	}
}

/// Reports the error of a `Result` and passes the `Result` through unchanged.
///
/// ```ignore
/// let user = load_user(id).report_err(&reporter)?;
/// ```
pub trait ReportExt<T, E> {
	fn report_err(self, observer: &dyn FailureObserver) -> Result<T, E>;
}

impl<T, E> ReportExt<T, E> for Result<T, E>
where
	E: std::error::Error,
{
	fn report_err(self, observer: &dyn FailureObserver) -> Result<T, E> {
		if let Err(ref e) = self {
			observer.on_failure(&RaisedError::from_error(e));
		}
		self
	}
}
