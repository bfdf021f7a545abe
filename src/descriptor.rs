//! Test descriptors and the executable test capability.
//!
//! A [`UnitTestDescriptor`] is an immutable `static` record: a display name, a
//! raw tag string and a factory producing a fresh [`UnitTest`]. Descriptors
//! outlive every engine; registries and managers only hold `&'static`
//! references to them.
//!
//! ```
//! use assay::descriptor::UnitTest;
//!
//! #[derive(Default)]
//! struct ChecksumTests;
//!
//! impl UnitTest for ChecksumTests {
//!     fn execute(&mut self) {
//!         assay::assay_assert!(1 + 1 == 2);
//!     }
//! }
//!
//! assay::unit_test!(CHECKSUM_TESTS, ChecksumTests, "core fast");
//!
//! assert_eq!(CHECKSUM_TESTS.name(), "ChecksumTests");
//! assert!(CHECKSUM_TESTS.tags().contains("fast"));
//! ```

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;

use crate::diagnostics::AssayResult;
use crate::filter::TagSet;

/// A runnable test instance.
///
/// `execute` has no result: failures are reported exclusively through the
/// assertion hook while it runs.
pub trait UnitTest {
    fn execute(&mut self);
}

/// Builds a fresh test instance. Identity of the function is the identity of
/// the test.
pub type UnitTestFactory = fn() -> AssayResult<Box<dyn UnitTest>>;

pub struct UnitTestDescriptor {
    name: &'static str,
    raw_tags: &'static str,
    factory: UnitTestFactory,
    tags: OnceCell<TagSet>,
}

impl UnitTestDescriptor {
    pub const fn new(name: &'static str, tags: &'static str, factory: UnitTestFactory) -> Self {
        Self {
            name,
            raw_tags: tags,
            factory,
            tags: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parsed tags, computed on first access.
    pub fn tags(&self) -> &TagSet {
        self.tags.get_or_init(|| TagSet::parse(self.raw_tags))
    }

    pub fn factory(&self) -> UnitTestFactory {
        self.factory
    }

    /// True when both descriptors build their tests with the same factory.
    pub fn same_factory(&self, other: &UnitTestDescriptor) -> bool {
        self.factory as usize == other.factory as usize
    }

    pub fn instantiate(&self) -> AssayResult<Box<dyn UnitTest>> {
        (self.factory)()
    }

    /// Name followed by the tag list, as shown in log headers.
    pub fn full_description(&self) -> String {
        let tags = self.tags();
        if tags.is_empty() {
            self.name.to_string()
        } else {
            format!("{} [{}]", self.name, tags)
        }
    }
}

impl std::fmt::Debug for UnitTestDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitTestDescriptor")
            .field("name", &self.name)
            .field("tags", &self.raw_tags)
            .field("factory", &(self.factory as usize as *const ()))
            .finish()
    }
}

/// Declares a `static` [`UnitTestDescriptor`] for a `Default` test type.
///
/// `unit_test!(NAME, Type, "tags")` names the test after the type;
/// `unit_test!(NAME, Type, "tags", "display name")` names it explicitly.
#[macro_export]
macro_rules! unit_test {
    ($(#[$meta:meta])* $vis:vis $name:ident, $test:ty, $tags:expr) => {
        $crate::unit_test!($(#[$meta])* $vis $name, $test, $tags, stringify!($test));
    };
    ($(#[$meta:meta])* $vis:vis $name:ident, $test:ty, $tags:expr, $display:expr) => {
        $(#[$meta])*
        $vis static $name: $crate::descriptor::UnitTestDescriptor = {
            fn factory() -> $crate::AssayResult<::std::boxed::Box<dyn $crate::descriptor::UnitTest>> {
                ::std::result::Result::Ok(::std::boxed::Box::new(
                    <$test as ::std::default::Default>::default(),
                ))
            }
            $crate::descriptor::UnitTestDescriptor::new($display, $tags, factory)
        };
    };
}

/// Declares a `static` descriptor for a [`TestFixture`], wrapped in [`FixtureTest`].
#[macro_export]
macro_rules! fixture_test {
    ($(#[$meta:meta])* $vis:vis $name:ident, $fixture:ty, $tags:expr) => {
        $crate::unit_test!(
            $(#[$meta])* $vis $name,
            $crate::descriptor::FixtureTest<$fixture>,
            $tags,
            stringify!($fixture)
        );
    };
}

/// Builds the method list of a [`TestFixture`] from method names.
#[macro_export]
macro_rules! test_methods {
    ($fixture:ty; $($method:ident),* $(,)?) => {
        vec![$($crate::descriptor::TestMethod::<$fixture>::new(
            stringify!($method),
            <$fixture>::$method,
        )),*]
    };
}

// ============================================================================
// Fixtures
// ============================================================================

/// One named method of a fixture.
pub struct TestMethod<T> {
    pub name: &'static str,
    pub run: fn(&mut T),
}

impl<T> TestMethod<T> {
    pub const fn new(name: &'static str, run: fn(&mut T)) -> Self {
        Self { name, run }
    }
}

/// A test made of several methods sharing set-up and tear-down.
pub trait TestFixture: Default + 'static {
    fn set_up(&mut self) {}

    fn tear_down(&mut self) {}

    fn methods() -> Vec<TestMethod<Self>>;
}

/// Adapts a [`TestFixture`] into a [`UnitTest`].
#[derive(Debug, Default)]
pub struct FixtureTest<T>(T);

impl<T> FixtureTest<T> {
    pub fn new(fixture: T) -> Self {
        Self(fixture)
    }

    pub fn fixture(&self) -> &T {
        &self.0
    }
}

impl<T: TestFixture> UnitTest for FixtureTest<T> {
    fn execute(&mut self) {
        for method in T::methods() {
            tracing::debug!(target: "assay::fixture", method = method.name, "running test method");
            self.0.set_up();
            (method.run)(&mut self.0);
            self.0.tear_down();
        }
    }
}

// ============================================================================
// Default test list
// ============================================================================

static DEFAULT_TESTS: Lazy<Mutex<Vec<&'static UnitTestDescriptor>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Appends a descriptor to the process-wide default list.
pub fn register_default_test(descriptor: &'static UnitTestDescriptor) {
    DEFAULT_TESTS.lock().push(descriptor);
}

pub fn register_default_tests(descriptors: &[&'static UnitTestDescriptor]) {
    DEFAULT_TESTS.lock().extend_from_slice(descriptors);
}

/// Snapshot of the default list, in registration order.
pub fn default_tests() -> Vec<&'static UnitTestDescriptor> {
    DEFAULT_TESTS.lock().clone()
}
