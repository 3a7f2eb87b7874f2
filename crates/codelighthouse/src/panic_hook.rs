// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process panic hook that fans out to registered failure handlers.
//!
//! `std::panic::set_hook` is process-global, so the hook itself is installed
//! once and chains to whatever hook was installed before it. Reporters add
//! and remove callbacks through [`register`]; dropping the returned
//! [`PanicRegistration`] removes the callback again.

use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

use codelighthouse_core::RaisedError;

use crate::registry::FailureHandler;

static INSTALL: Once = Once::new();
static CALLBACKS: Mutex<Vec<(u64, FailureHandler)>> = Mutex::new(Vec::new());
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Live registration of a panic callback.
pub(crate) struct PanicRegistration {
	id: u64,
}

impl Drop for PanicRegistration {
	fn drop(&mut self) {
		callbacks().retain(|(id, _)| *id != self.id);
	}
}

/// Adds a callback invoked for every panic in the process.
pub(crate) fn register(handler: FailureHandler) -> PanicRegistration {
	install_once();
	let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
	callbacks().push((id, handler));
	PanicRegistration { id }
}

/// Number of callbacks currently registered across the process.
pub(crate) fn live_count() -> usize {
	callbacks().len()
}

fn callbacks() -> MutexGuard<'static, Vec<(u64, FailureHandler)>> {
	CALLBACKS.lock().unwrap_or_else(PoisonError::into_inner)
}

fn install_once() {
	INSTALL.call_once(|| {
		let previous = panic::take_hook();
		panic::set_hook(Box::new(move |info| {
			dispatch(info);
			previous(info);
		}));
	});
}

fn dispatch(info: &PanicHookInfo<'_>) {
	// Handlers run outside the lock so they may register or deregister.
	let handlers: Vec<FailureHandler> = callbacks().iter().map(|(_, h)| h.clone()).collect();
	if handlers.is_empty() {
		return;
	}

	let error = RaisedError::from_panic(info.payload(), info.location());
	for handler in handlers {
		handler(&error);
	}
}
