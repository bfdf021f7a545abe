//! # Assertion hook indirection
//!
//! A single process-wide slot holding the active assertion handler. Library
//! code reports internal consistency failures through [`invoke`] (usually via
//! [`assay_assert!`](crate::assay_assert)); whichever handler is installed at
//! that moment receives the report. Outside of a test run that is the
//! application handler, which emits a `tracing` error event. During a run it is
//! the engine's handler, which records the report into the test log.
//!
//! ## Lifecycle
//!
//! [`install`] swaps a handler in and returns an [`AssertionHandlerSetup`]
//! holding the replaced one. The setup restores the previous handler exactly
//! once: on [`AssertionHandlerSetup::restore`] or, failing that, on drop. Drop
//! also runs during panic unwinding, so a test that faults cannot leave the
//! engine's handler behind.
//!
//! Installs and restores must nest strictly (LIFO). A restore that finds a
//! different handler in the slot than the one its setup installed is a caller
//! error; it is reported as an error event and the saved handler is written
//! back anyway.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Receiver of library assertion reports.
///
/// The handler carries its own context. Implementations must not panic.
pub trait AssertionHandler: Send + Sync {
    fn on_assertion(&self, file: &str, line: u32, message: &str);
}

impl<F> AssertionHandler for F
where
    F: Fn(&str, u32, &str) + Send + Sync,
{
    fn on_assertion(&self, file: &str, line: u32, message: &str) {
        self(file, line, message)
    }
}

/// Shared, type-erased handler as stored in the slot.
pub type SharedHandler = Arc<dyn AssertionHandler>;

/// Application default: report through `tracing` and carry on.
struct ApplicationHandler;

impl AssertionHandler for ApplicationHandler {
    fn on_assertion(&self, file: &str, line: u32, message: &str) {
        tracing::error!(target: "assay::assert", file, line, "{}", message);
    }
}

static SLOT: Lazy<RwLock<SharedHandler>> = Lazy::new(|| RwLock::new(Arc::new(ApplicationHandler)));

fn same_handler(a: &SharedHandler, b: &SharedHandler) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Saved state of the slot, created by [`install`].
#[must_use = "dropping the setup immediately restores the previous handler"]
pub struct AssertionHandlerSetup {
    previous: Option<SharedHandler>,
    installed: SharedHandler,
}

impl AssertionHandlerSetup {
    /// Writes the saved handler back into the slot.
    pub fn restore(mut self) {
        self.restore_previous();
    }

    /// The handler this setup put into the slot.
    pub fn installed(&self) -> &SharedHandler {
        &self.installed
    }

    fn restore_previous(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let replaced = {
            let mut slot = SLOT.write();
            if !same_handler(&slot, &self.installed) {
                tracing::error!(
                    target: "assay::hook",
                    "assertion handler restored out of order; the slot holds a handler this setup did not install"
                );
            }
            std::mem::replace(&mut *slot, previous)
        };
        tracing::trace!(target: "assay::hook", "assertion handler restored");
        drop(replaced);
    }
}

impl Drop for AssertionHandlerSetup {
    fn drop(&mut self) {
        self.restore_previous();
    }
}

impl std::fmt::Debug for AssertionHandlerSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionHandlerSetup")
            .field("restored", &self.previous.is_none())
            .finish()
    }
}

/// Installs `handler` and returns the setup that will restore the replaced one.
pub fn install(handler: SharedHandler) -> AssertionHandlerSetup {
    let previous = std::mem::replace(&mut *SLOT.write(), Arc::clone(&handler));
    tracing::trace!(target: "assay::hook", "assertion handler installed");
    AssertionHandlerSetup {
        previous: Some(previous),
        installed: handler,
    }
}

/// Reports an assertion to the currently installed handler.
///
/// The slot lock is released before the handler runs.
pub fn invoke(file: &str, line: u32, message: &str) {
    let handler = current();
    handler.on_assertion(file, line, message);
}

/// Returns the currently installed handler.
pub fn current() -> SharedHandler {
    Arc::clone(&SLOT.read())
}

/// Returns true if `handler` is the one currently installed.
pub fn is_current(handler: &SharedHandler) -> bool {
    same_handler(&SLOT.read(), handler)
}

/// Replaces the application-level handler and returns the old one.
///
/// Meant for process start-up. Calling this while a setup is outstanding breaks
/// the LIFO discipline of that setup.
pub fn set_application_handler(handler: SharedHandler) -> SharedHandler {
    std::mem::replace(&mut *SLOT.write(), handler)
}

/// Reports a library assertion when `cond` is false.
///
/// ```
/// fn checked_div(a: u32, b: u32) -> u32 {
///     assay::assay_assert!(b != 0, "division by zero: {} / {}", a, b);
///     a.checked_div(b).unwrap_or(0)
/// }
/// assert_eq!(checked_div(6, 3), 2);
/// ```
#[macro_export]
macro_rules! assay_assert {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::hook::invoke(
                file!(),
                line!(),
                concat!("assertion failed: ", stringify!($cond)),
            );
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::hook::invoke(file!(), line!(), &format!($($arg)+));
        }
    };
}

/// Unconditionally reports a library assertion.
#[macro_export]
macro_rules! assay_fail {
    ($($arg:tt)+) => {
        $crate::hook::invoke(file!(), line!(), &format!($($arg)+))
    };
}

/// Serializes unit tests that touch the process-wide slot.
#[cfg(test)]
pub(crate) static HOOK_TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
