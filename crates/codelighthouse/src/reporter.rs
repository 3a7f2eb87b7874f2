// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The reporting facade: configuration, global handlers and manual reports.

use std::future::Future;
use std::sync::{mpsc, Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use codelighthouse_core::{Environment, ErrorEnvelope, ErrorPayload, RaisedError, ResourceIdentity};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ReporterConfig;
use crate::error::{LighthouseError, Result};
use crate::registry::{FailureClass, HandlerRegistry};
use crate::transport::{HttpTransport, ReqwestTransport, SubmitOutcome, TransportClient};

/// How long the panic hook waits for its report before letting the panic continue.
const PANIC_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a submission in flight.
///
/// Dropping it does not cancel the submission.
#[derive(Debug)]
pub struct ReportHandle {
	outcome: oneshot::Receiver<SubmitOutcome>,
	detached: bool,
}

impl ReportHandle {
	/// Waits for the submission to finish.
	///
	/// Returns `None` if the submission was abandoned, e.g. because its
	/// runtime shut down first.
	pub async fn outcome(self) -> Option<SubmitOutcome> {
		self.outcome.await.ok()
	}

	/// Blocks the current thread until the submission finishes.
	///
	/// Must not be called from within an async context; use
	/// [`ReportHandle::outcome`] there.
	pub fn wait(self) -> Option<SubmitOutcome> {
		self.outcome.blocking_recv().ok()
	}

	/// Whether the submission runs on a dedicated thread rather than the
	/// caller's tokio runtime.
	pub fn is_detached(&self) -> bool {
		self.detached
	}
}

struct Configured {
	organization: String,
	default_email: String,
	environment: Environment,
	identity: ResourceIdentity,
	client: TransportClient,
}

impl Configured {
	fn payload(&self, error: &RaisedError, email: Option<&str>, data: Option<serde_json::Value>) -> ErrorPayload {
		let email = email.unwrap_or(&self.default_email);
		let envelope = ErrorEnvelope::build(error, email, &self.identity, data);

		debug!(error_type = %envelope.error_type, frames = envelope.frames.len(), "Reporting error");

		envelope.to_payload()
	}

	/// Spawns the submission on the caller's runtime, or on a dedicated
	/// thread when the caller is not inside one.
	fn dispatch(&self, payload: ErrorPayload) -> ReportHandle {
		let (tx, rx) = oneshot::channel();
		let client = self.client.clone();
		let task = async move {
			let outcome = client.submit(&payload).await;
			let _ = tx.send(outcome);
		};

		let detached = match Handle::try_current() {
			Ok(runtime) => {
				runtime.spawn(task);
				false
			}
			Err(_) => {
				spawn_detached(task);
				true
			}
		};

		ReportHandle { outcome: rx, detached }
	}

	/// Submits on a dedicated thread and blocks until it finishes or
	/// `timeout` elapses.
	///
	/// Safe to call from a runtime worker: the wait uses a std channel and
	/// the submission never depends on the caller's runtime staying alive.
	fn submit_blocking(&self, payload: ErrorPayload, timeout: Duration) -> Option<SubmitOutcome> {
		let (tx, rx) = mpsc::channel();
		let client = self.client.clone();
		spawn_detached(async move {
			let outcome = client.submit(&payload).await;
			let _ = tx.send(outcome);
		});
		rx.recv_timeout(timeout).ok()
	}
}

/// Runs a submission on its own thread with a single-threaded runtime.
fn spawn_detached(task: impl Future<Output = ()> + Send + 'static) {
	let spawned = std::thread::Builder::new()
		.name("codelighthouse-report".to_string())
		.spawn(move || {
			match tokio::runtime::Builder::new_current_thread()
				.enable_all()
				.build()
			{
				Ok(runtime) => runtime.block_on(task),
				Err(e) => error!(error = %e, "CODELIGHTHOUSE: failed to start report runtime"),
			}
		});

	if let Err(e) = spawned {
		error!(error = %e, "CODELIGHTHOUSE: failed to spawn report thread");
	}
}

struct ReporterInner {
	transport_override: Option<Arc<dyn HttpTransport>>,
	state: RwLock<Option<Arc<Configured>>>,
	registry: HandlerRegistry,
}

/// Entry point for reporting errors to CodeLighthouse.
///
/// # Example
///
/// ```ignore
/// use codelighthouse::{Environment, RaisedError, Reporter, ReporterConfig};
///
/// let reporter = Reporter::new();
/// reporter.initialize(
///     "acme",
///     "api_key",
///     "ops@acme.io",
///     ReporterConfig::default().environment(Environment::Dev),
/// )?;
///
/// // Panics and failed monitored tasks are now reported automatically.
///
/// // Manual capture
/// if let Err(e) = do_something() {
///     reporter.report(&e)?;
/// }
/// ```
#[derive(Clone)]
pub struct Reporter {
	inner: Arc<ReporterInner>,
}

impl Reporter {
	/// Creates an unconfigured reporter that talks HTTP through `reqwest`.
	pub fn new() -> Self {
		Self::build(None)
	}

	/// Creates an unconfigured reporter that uses `transport` for every
	/// submission.
	pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
		Self::build(Some(transport))
	}

	fn build(transport_override: Option<Arc<dyn HttpTransport>>) -> Self {
		Self {
			inner: Arc::new(ReporterInner {
				transport_override,
				state: RwLock::new(None),
				registry: HandlerRegistry::new(),
			}),
		}
	}

	/// Configures the reporter and, if enabled, installs the global handlers.
	///
	/// Calling this again replaces the configuration; stale handlers are
	/// removed before new ones are registered.
	pub fn initialize(
		&self,
		organization: impl Into<String>,
		api_key: impl Into<String>,
		default_email: impl Into<String>,
		config: ReporterConfig,
	) -> Result<()> {
		let organization = required(organization.into(), LighthouseError::MissingOrganization)?;
		let api_key = required(api_key.into(), LighthouseError::MissingApiKey)?;
		let default_email = required(default_email.into(), LighthouseError::MissingDefaultEmail)?;

		let http: Arc<dyn HttpTransport> = match &self.inner.transport_override {
			Some(transport) => transport.clone(),
			None => Arc::new(ReqwestTransport::new()?),
		};

		let environment = config.environment;
		let client = TransportClient::new(
			environment.base_url(),
			&organization,
			&api_key,
			environment.debug(),
			http,
		)?;

		let configured = Arc::new(Configured {
			organization,
			default_email,
			environment,
			identity: config.identity(),
			client,
		});

		info!(
			organization = %configured.organization,
			environment = %configured.environment,
			endpoint = %configured.client.endpoint(),
			global_handler = config.enable_global_handler,
			"CodeLighthouse reporter initialized"
		);

		*self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = Some(configured);

		if config.enable_global_handler {
			self.install_global_handlers();
		} else {
			self.inner.registry.clear();
		}

		Ok(())
	}

	/// Returns true once `initialize` has succeeded.
	pub fn is_configured(&self) -> bool {
		self.configured().is_ok()
	}

	/// The registry holding this reporter's global handlers.
	pub fn handlers(&self) -> &HandlerRegistry {
		&self.inner.registry
	}

	/// Builds an envelope for `error` and submits it in the background.
	///
	/// `email` defaults to the configured default email. Returns as soon as
	/// the submission is spawned.
	pub fn report_error(
		&self,
		error: &RaisedError,
		email: Option<&str>,
		data: Option<serde_json::Value>,
	) -> Result<ReportHandle> {
		let configured = self.configured()?;
		Ok(configured.dispatch(configured.payload(error, email, data)))
	}

	/// Reports `error` and blocks until the collector answers or `timeout`
	/// elapses. Returns `Ok(None)` on timeout.
	///
	/// Used where the process may be about to die, e.g. from the panic hook.
	pub fn report_error_blocking(
		&self,
		error: &RaisedError,
		email: Option<&str>,
		data: Option<serde_json::Value>,
		timeout: Duration,
	) -> Result<Option<SubmitOutcome>> {
		let configured = self.configured()?;
		Ok(configured.submit_blocking(configured.payload(error, email, data), timeout))
	}

	/// Reports a Rust error with the default email and no extra data.
	pub fn report<E>(&self, error: &E) -> Result<ReportHandle>
	where
		E: std::error::Error + ?Sized,
	{
		self.report_error(&RaisedError::from_error(error), None, None)
	}

	/// Spawns a fallible future on the current runtime; nobody else observes
	/// its failure.
	///
	/// If it resolves to `Err`, the error goes to the unhandled task failure
	/// handler (when global handlers are enabled) and the task yields `None`.
	pub fn spawn_monitored<F, T, E>(&self, future: F) -> Result<JoinHandle<Option<T>>>
	where
		F: Future<Output = std::result::Result<T, E>> + Send + 'static,
		T: Send + 'static,
		E: std::error::Error + Send + 'static,
	{
		let runtime = Handle::try_current().map_err(|_| LighthouseError::NoRuntime)?;

		let inner = Arc::downgrade(&self.inner);
		Ok(runtime.spawn(async move {
			match future.await {
				Ok(value) => Some(value),
				Err(e) => {
					let error = RaisedError::from_error(&e);
					let handler = inner
						.upgrade()
						.and_then(|inner| inner.registry.handler(FailureClass::UnhandledTaskFailure));
					match handler {
						Some(handler) => handler(&error),
						None => debug!(error = %e, "Monitored task failed with no failure handler registered"),
					}
					None
				}
			}
		}))
	}

	/// Removes the global handlers and returns to the unconfigured state.
	pub fn shutdown(&self) {
		self.inner.registry.clear();
		let previous = self.inner.state.write().unwrap_or_else(PoisonError::into_inner).take();
		if previous.is_some() {
			info!("CodeLighthouse reporter shut down");
		}
	}

	fn configured(&self) -> Result<Arc<Configured>> {
		self.inner
			.state
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
			.ok_or(LighthouseError::NotConfigured)
	}

	fn install_global_handlers(&self) {
		for class in FailureClass::ALL {
			let inner = Arc::downgrade(&self.inner);
			self.inner.registry.register(
				class,
				Arc::new(move |error: &RaisedError| report_unhandled(&inner, class, error)),
			);
		}
		info!("CodeLighthouse global handlers installed");
	}
}

impl Default for Reporter {
	fn default() -> Self {
		Self::new()
	}
}

fn report_unhandled(inner: &Weak<ReporterInner>, class: FailureClass, error: &RaisedError) {
	let Some(inner) = inner.upgrade() else {
		return;
	};
	let reporter = Reporter { inner };

	let result = match class {
		// The panic may unwind out of `block_on` and tear down the runtime
		// that would otherwise run the submission.
		FailureClass::UncaughtPanic => reporter
			.report_error_blocking(error, None, None, PANIC_REPORT_TIMEOUT)
			.map(|outcome| {
				if outcome.is_none() {
					warn!(failure_class = %class, "CODELIGHTHOUSE: timed out reporting panic");
				}
			}),
		FailureClass::UnhandledTaskFailure => reporter.report_error(error, None, None).map(drop),
	};

	if let Err(e) = result {
		warn!(error = %e, failure_class = %class, "CODELIGHTHOUSE: failed to report unhandled failure");
	}
}

fn required(value: String, missing: LighthouseError) -> Result<String> {
	if value.trim().is_empty() {
		return Err(missing);
	}
	Ok(value)
}
