// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-reporter registry of global failure handlers.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use codelighthouse_core::RaisedError;

use crate::panic_hook::{self, PanicRegistration};

/// Callback invoked with a captured failure.
pub type FailureHandler = Arc<dyn Fn(&RaisedError) + Send + Sync>;

/// Classes of failures that escape application error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
	/// A panic, wherever it happens in the process.
	UncaughtPanic,
	/// A monitored background task that resolved to `Err`.
	UnhandledTaskFailure,
}

impl FailureClass {
	pub const ALL: [FailureClass; 2] = [Self::UncaughtPanic, Self::UnhandledTaskFailure];
}

impl fmt::Display for FailureClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UncaughtPanic => write!(f, "uncaught_panic"),
			Self::UnhandledTaskFailure => write!(f, "unhandled_task_failure"),
		}
	}
}

#[derive(Default)]
struct Slots {
	panic: Option<(FailureHandler, PanicRegistration)>,
	task: Option<FailureHandler>,
}

/// Holds at most one handler per [`FailureClass`].
///
/// Registering a class that already has a handler replaces it, so repeated
/// initialization never stacks duplicate handlers. Dropping the registry
/// removes its panic callback from the process hook.
#[derive(Default)]
pub struct HandlerRegistry {
	slots: Mutex<Slots>,
}

impl HandlerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `class`, removing any previous handler first.
	pub fn register(&self, class: FailureClass, handler: FailureHandler) {
		let mut slots = self.slots();
		match class {
			FailureClass::UncaughtPanic => {
				// Drop the stale registration before adding the new one.
				slots.panic = None;
				let registration = panic_hook::register(handler.clone());
				slots.panic = Some((handler, registration));
			}
			FailureClass::UnhandledTaskFailure => slots.task = Some(handler),
		}
	}

	/// Removes the handler for `class`. Returns whether one was registered.
	pub fn deregister(&self, class: FailureClass) -> bool {
		let mut slots = self.slots();
		match class {
			FailureClass::UncaughtPanic => slots.panic.take().is_some(),
			FailureClass::UnhandledTaskFailure => slots.task.take().is_some(),
		}
	}

	/// Removes every handler.
	pub fn clear(&self) {
		for class in FailureClass::ALL {
			self.deregister(class);
		}
	}

	/// Returns the handler registered for `class`.
	pub fn handler(&self, class: FailureClass) -> Option<FailureHandler> {
		let slots = self.slots();
		match class {
			FailureClass::UncaughtPanic => slots.panic.as_ref().map(|(handler, _)| handler.clone()),
			FailureClass::UnhandledTaskFailure => slots.task.clone(),
		}
	}

	pub fn is_registered(&self, class: FailureClass) -> bool {
		self.handler(class).is_some()
	}

	/// Number of handlers registered for `class` (zero or one).
	pub fn registered_count(&self, class: FailureClass) -> usize {
		usize::from(self.is_registered(class))
	}

	fn slots(&self) -> MutexGuard<'_, Slots> {
		self.slots.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerRegistry")
			.field("uncaught_panic", &self.is_registered(FailureClass::UncaughtPanic))
			.field(
				"unhandled_task_failure",
				&self.is_registered(FailureClass::UnhandledTaskFailure),
			)
			.finish()
	}
}
