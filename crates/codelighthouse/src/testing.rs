// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test doubles shared by the unit tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Serializes tests that install global handlers or panic on purpose.
pub(crate) static HOOK_TEST_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

enum Scripted {
	Respond(HttpResponse),
	Fail(String),
}

/// Records every request and answers with a fixed response.
pub(crate) struct RecordingTransport {
	requests: Mutex<Vec<HttpRequest>>,
	scripted: Scripted,
	notify: Notify,
}

impl RecordingTransport {
	pub(crate) fn responding(status: u16, body: &str) -> Arc<Self> {
		Arc::new(Self::new(Scripted::Respond(HttpResponse {
			status,
			body: body.to_string(),
		})))
	}

	pub(crate) fn failing(description: &str) -> Arc<Self> {
		Arc::new(Self::new(Scripted::Fail(description.to_string())))
	}

	fn new(scripted: Scripted) -> Self {
		Self {
			requests: Mutex::new(Vec::new()),
			scripted,
			notify: Notify::new(),
		}
	}

	pub(crate) fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().unwrap().clone()
	}

	pub(crate) fn call_count(&self) -> usize {
		self.requests.lock().unwrap().len()
	}

	/// Waits until at least `n` requests were made.
	pub(crate) async fn wait_for(&self, n: usize) {
		loop {
			let notified = self.notify.notified();
			if self.call_count() >= n {
				return;
			}
			notified.await;
		}
	}
}

#[async_trait]
impl HttpTransport for RecordingTransport {
	async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		self.requests.lock().unwrap().push(request);
		self.notify.notify_waiters();
		match &self.scripted {
			Scripted::Respond(response) => Ok(response.clone()),
			Scripted::Fail(description) => Err(TransportError::Other(description.clone())),
		}
	}
}

/// Captures formatted `tracing` output of the current thread.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
	output: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
	pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
		let subscriber = tracing_subscriber::fmt()
			.with_writer(self.clone())
			.with_ansi(false)
			.with_max_level(Level::DEBUG)
			.finish();
		tracing::subscriber::set_default(subscriber)
	}

	pub(crate) fn contents(&self) -> String {
		String::from_utf8_lossy(&self.output.lock().unwrap()).into_owned()
	}

	pub(crate) fn lines_containing(&self, needle: &str) -> usize {
		self.contents().lines().filter(|line| line.contains(needle)).count()
	}
}

impl<'a> MakeWriter<'a> for LogCapture {
	type Writer = CaptureWriter;

	fn make_writer(&'a self) -> Self::Writer {
		CaptureWriter {
			output: self.output.clone(),
		}
	}
}

pub(crate) struct CaptureWriter {
	output: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.output.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}
