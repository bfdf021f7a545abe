//! Shared helpers for the integration tests.
//!
//! Every test that runs a manager touches the process-wide assertion hook, so
//! tests in one binary serialize on [`serial`].

#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use assay::hook::SharedHandler;
use parking_lot::{const_mutex, Mutex, MutexGuard};

static SERIAL: Mutex<()> = const_mutex(());
static EXECUTED: Mutex<Vec<&'static str>> = const_mutex(Vec::new());

/// Holds the hook for the duration of a test and clears the execution trail.
pub fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    EXECUTED.lock().clear();
    guard
}

/// Notes that the named test body ran.
pub fn mark(name: &'static str) {
    EXECUTED.lock().push(name);
}

/// Test bodies that ran since [`serial`], in order.
pub fn executed() -> Vec<&'static str> {
    EXECUTED.lock().clone()
}

/// A handler that remembers every message it receives.
pub fn recording_handler() -> (SharedHandler, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler: SharedHandler = Arc::new(move |_file: &str, _line: u32, message: &str| {
        sink.lock().push(message.to_string());
    });
    (handler, seen)
}

/// Declares a test type and its descriptor. The body records its own name and,
/// for `fails`, reports one library assertion.
macro_rules! recorded_test {
    ($ty:ident, $descriptor:ident, $tags:expr) => {
        #[derive(Default)]
        pub struct $ty;

        impl assay::UnitTest for $ty {
            fn execute(&mut self) {
                $crate::common::mark(stringify!($ty));
            }
        }

        assay::unit_test!(pub $descriptor, $ty, $tags);
    };
    ($ty:ident, $descriptor:ident, $tags:expr, fails) => {
        #[derive(Default)]
        pub struct $ty;

        impl assay::UnitTest for $ty {
            fn execute(&mut self) {
                $crate::common::mark(stringify!($ty));
                assay::assay_fail!("{} failed on purpose", stringify!($ty));
            }
        }

        assay::unit_test!(pub $descriptor, $ty, $tags);
    };
}
