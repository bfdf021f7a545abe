//! Named, read-only binary fixtures for tests.

/// A named byte blob, typically built from `include_bytes!`.
///
/// ```
/// use assay::resource::TestResource;
///
/// static KEY: TestResource = TestResource::new(&[0u8; 16], "aes-128-zero-key");
/// assert_eq!(KEY.size(), 16);
/// assert_eq!(KEY.name(), "aes-128-zero-key");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestResource {
    data: &'static [u8],
    name: &'static str,
}

impl TestResource {
    pub const fn new(data: &'static [u8], name: &'static str) -> Self {
        Self { data, name }
    }

    pub fn data(&self) -> &'static [u8] {
        self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Byte view over the whole resource.
    pub fn range(&self) -> &'static [u8] {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for TestResource {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}
