//! # Assay
//!
//! A minimal, embeddable unit-test engine for low-level libraries. Tests are
//! registered as static descriptors, selected by tag, and executed one at a
//! time while a process-wide assertion hook routes library assertions into the
//! engine's log instead of aborting.
//!
//! ```
//! use assay::descriptor::UnitTest;
//! use assay::TestManager;
//!
//! #[derive(Default)]
//! struct ParserTests;
//!
//! impl UnitTest for ParserTests {
//!     fn execute(&mut self) {
//!         assay::assay_assert!("1,2".split(',').count() == 2);
//!     }
//! }
//!
//! assay::unit_test!(PARSER_TESTS, ParserTests, "parser");
//!
//! let mut manager = TestManager::new();
//! manager.add_unit_test(&PARSER_TESTS);
//! assert!(manager.run_tests_with_filter("parser", ""));
//! ```

pub use crate::descriptor::{UnitTest, UnitTestDescriptor};
pub use crate::diagnostics::{AssayError, AssayResult, ErrorType};
pub use crate::filter::{should_run, TagFilter, TagSet};
pub use crate::hook::{AssertionHandler, AssertionHandlerSetup};
pub use crate::log::{LogEntry, LogEntryKind, LogSummary, TestLog};
pub use crate::manager::TestManager;
pub use crate::registry::TestRegistry;
pub use crate::resource::TestResource;

pub mod cli;
pub mod descriptor;
pub mod diagnostics;
pub mod filter;
pub mod hook;
pub mod log;
pub mod manager;
pub mod registry;
pub mod resource;
