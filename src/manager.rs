//! # Test manager
//!
//! Owns the registry, the shared test log and the breakpoint flags, and drives
//! runs. Every selected test goes through the same sequence:
//!
//! 1. **Idle**: header logged, assertion counter sampled.
//! 2. **HookInstalled**: the engine's handler replaces whatever handler was
//!    active, bound to this manager's log.
//! 3. **Running**: the factory builds the test and `execute` runs inside
//!    `catch_unwind`. Factory errors and panics are recorded as assertions.
//! 4. **HookRestored**: the install guard goes out of scope, on every path.
//! 5. **Scored**: the test passed iff the assertion counter did not move.
//!
//! Tests run sequentially, in registration order, and a failing test never
//! stops the run. Only one run may be in flight per process because the
//! assertion hook is process-wide; a nested run is rejected.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::descriptor::{self, UnitTestDescriptor};
use crate::diagnostics::AssayError;
use crate::filter::TagFilter;
use crate::hook::{self, AssertionHandler, SharedHandler};
use crate::log::TestLog;
use crate::registry::TestRegistry;

/// Side effect fired when a breakpoint flag is enabled.
pub type BreakpointTrap = fn();

/// Default trap: a software breakpoint instruction in debug builds, a warning
/// event otherwise. Without an attached debugger the instruction terminates the
/// process.
pub fn software_breakpoint() {
    tracing::warn!(target: "assay::manager", "software breakpoint");
    #[cfg(all(debug_assertions, any(target_arch = "x86", target_arch = "x86_64")))]
    // SAFETY: raises a trap, touches no memory or stack.
    unsafe {
        std::arch::asm!("int3", options(nomem, nostack));
    };
    #[cfg(all(debug_assertions, target_arch = "aarch64"))]
    // SAFETY: raises a trap, touches no memory or stack.
    unsafe {
        std::arch::asm!("brk #0xf000", options(nomem, nostack));
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionState {
    Idle,
    HookInstalled,
    Running,
    HookRestored,
    Scored,
}

/// Handler installed for the duration of one test.
struct EngineHandler {
    log: Arc<Mutex<TestLog>>,
    breakpoint: bool,
    trap: BreakpointTrap,
}

impl AssertionHandler for EngineHandler {
    fn on_assertion(&self, file: &str, line: u32, message: &str) {
        tracing::debug!(target: "assay::assert", file, line, "{}", message);
        self.log
            .lock()
            .record_assertion(format!("{}:{}: {}", file, line, message));
        if self.breakpoint {
            (self.trap)();
        }
    }
}

static RUN_IN_FLIGHT: AtomicBool = AtomicBool::new(false);

/// Marks a run as in flight until dropped.
struct RunGuard;

impl RunGuard {
    fn acquire() -> Option<Self> {
        RUN_IN_FLIGHT
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        RUN_IN_FLIGHT.store(false, Ordering::Release);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub struct TestManager {
    registry: TestRegistry,
    log: Arc<Mutex<TestLog>>,
    assertion_breakpoint_enabled: bool,
    incident_breakpoint_enabled: bool,
    trap: BreakpointTrap,
}

impl Default for TestManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestManager")
            .field("registry", &self.registry)
            .field("assertion_breakpoint_enabled", &self.assertion_breakpoint_enabled)
            .field("incident_breakpoint_enabled", &self.incident_breakpoint_enabled)
            .finish()
    }
}

impl TestManager {
    // ------------------------------------------------------------------------
    // Instantiation
    // ------------------------------------------------------------------------

    /// Creates a manager with no tests registered.
    pub fn new() -> Self {
        Self {
            registry: TestRegistry::new(),
            log: Arc::new(Mutex::new(TestLog::new())),
            assertion_breakpoint_enabled: false,
            incident_breakpoint_enabled: false,
            trap: software_breakpoint,
        }
    }

    /// Creates a manager loaded with the process-wide default test list.
    pub fn with_default_tests() -> Self {
        let mut manager = Self::new();
        manager.add_unit_test_list(descriptor::default_tests());
        manager
    }

    // ------------------------------------------------------------------------
    // Breakpoints
    // ------------------------------------------------------------------------

    /// Fire the trap on every library assertion captured during a run.
    pub fn set_assertion_breakpoint_enabled(&mut self, enabled: bool) {
        self.assertion_breakpoint_enabled = enabled;
    }

    pub fn assertion_breakpoint_enabled(&self) -> bool {
        self.assertion_breakpoint_enabled
    }

    /// Fire the trap whenever a test is scored as failed.
    pub fn set_incident_breakpoint_enabled(&mut self, enabled: bool) {
        self.incident_breakpoint_enabled = enabled;
    }

    pub fn incident_breakpoint_enabled(&self) -> bool {
        self.incident_breakpoint_enabled
    }

    /// Replaces the breakpoint side effect.
    pub fn set_breakpoint_trap(&mut self, trap: BreakpointTrap) {
        self.trap = trap;
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn add_unit_test(&mut self, descriptor: &'static UnitTestDescriptor) {
        self.registry.add(descriptor);
    }

    pub fn add_unit_test_list<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = &'static UnitTestDescriptor>,
    {
        self.registry.add_all(descriptors);
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Registered tests admitted by the given filter strings, in run order.
    pub fn selected_tests(&self, included: &str, excluded: &str) -> Vec<&'static UnitTestDescriptor> {
        self.select(&TagFilter::parse(included, excluded))
    }

    fn select(&self, filter: &TagFilter) -> Vec<&'static UnitTestDescriptor> {
        self.registry
            .iter()
            .filter(|descriptor| filter.should_run(descriptor.tags()))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    pub fn run_all_tests(&self) -> bool {
        self.run_tests_with_filter("", "")
    }

    /// Runs every registered test admitted by the include/exclude tag lists.
    ///
    /// Returns `true` iff no executed test recorded an assertion. A run that
    /// selects nothing returns `true` and says so in the log.
    pub fn run_tests_with_filter(&self, included: &str, excluded: &str) -> bool {
        let filter = TagFilter::parse(included, excluded);

        let Some(_run) = RunGuard::acquire() else {
            tracing::error!(
                target: "assay::manager",
                "a test run is already in flight; nested runs are not supported"
            );
            self.log_message("Rejected nested test run: another run is already in flight.");
            return false;
        };

        let span = tracing::info_span!("assay_run", filter = %filter);
        let _enter = span.enter();

        let selected = self.select(&filter);
        if selected.is_empty() {
            tracing::warn!(target: "assay::manager", "no tests matched the filter");
            self.log_message(format!("No tests selected ({}).", filter));
            return true;
        }

        tracing::info!(
            target: "assay::manager",
            selected = selected.len(),
            registered = self.registry.len(),
            "starting test run"
        );
        let before = self.tl().summary();

        let mut all_passed = true;
        for descriptor in selected {
            all_passed &= self.execute_test(descriptor);
        }

        let after = self.tl().summary();
        let ran = after.ran - before.ran;
        let failed = after.failed - before.failed;
        self.log_message(format!("Executed {} test(s), {} failed.", ran, failed));
        tracing::info!(target: "assay::manager", ran, failed, "test run finished");
        all_passed
    }

    fn execute_test(&self, descriptor: &'static UnitTestDescriptor) -> bool {
        let name = descriptor.name();
        let transition = |state: ExecutionState| {
            tracing::trace!(target: "assay::manager", test = name, ?state);
        };

        transition(ExecutionState::Idle);
        self.log_header(descriptor.full_description());
        let before = self.tl().assertion_count();

        {
            let handler: SharedHandler = Arc::new(EngineHandler {
                log: Arc::clone(&self.log),
                breakpoint: self.assertion_breakpoint_enabled,
                trap: self.trap,
            });
            let _setup = hook::install(handler);
            transition(ExecutionState::HookInstalled);

            transition(ExecutionState::Running);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut test = descriptor.instantiate()?;
                test.execute();
                Ok::<(), AssayError>(())
            }));

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    let err = match err {
                        err @ AssayError::TestCreation { .. } => err,
                        other => AssayError::creation(name, other.to_string()),
                    };
                    tracing::error!(target: "assay::manager", test = name, error = %err);
                    self.tl().record_assertion(err.to_string());
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(target: "assay::manager", test = name, panic = %message, "test panicked");
                    self.tl()
                        .record_assertion(format!("{} panicked: {}", name, message));
                }
            }
        }
        transition(ExecutionState::HookRestored);

        let recorded = self.tl().assertion_count() - before;
        let passed = recorded == 0;
        {
            let mut log = self.tl();
            log.record_test_result(name, passed);
            if !passed {
                log.message(format!("FAILED: {} ({} assertion(s))", name, recorded));
            }
            log.separator();
        }
        transition(ExecutionState::Scored);

        if !passed && self.incident_breakpoint_enabled {
            (self.trap)();
        }
        tracing::debug!(target: "assay::manager", test = name, passed, assertions = recorded);
        passed
    }

    // ------------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------------

    /// Locks and returns the test log.
    ///
    /// The engine's handler appends to the same log, so do not hold the guard
    /// while a run is in progress on this thread.
    pub fn tl(&self) -> MutexGuard<'_, TestLog> {
        self.log.lock()
    }

    pub fn log_header(&self, text: impl Into<String>) {
        self.tl().header(text);
    }

    pub fn log_message(&self, text: impl Into<String>) {
        self.tl().message(text);
    }

    pub fn log_separator(&self) {
        self.tl().separator();
    }
}
