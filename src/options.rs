//! Reader configuration.

/// Default size of the header region scanned for attributes.
pub const DEFAULT_HEADER_LIMIT: usize = 10_000;

/// Options controlling how a file is opened.
///
/// ```
/// use minexr::ReadOptions;
///
/// let options = ReadOptions::default()
///     .with_header_limit(64 * 1024)
///     .with_verify_scan_lines(true)
///     .with_max_image_bytes(512 * 1024 * 1024);
/// assert!(options.verify_scan_lines);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    /// Bytes read from the start of the file to parse the header and the
    /// first chunk offset. Headers larger than this fail to parse.
    pub header_limit: usize,
    /// Check every scan line's y-coordinate and data size after reading.
    pub verify_scan_lines: bool,
    /// Reject images whose scan line block is larger than this.
    pub max_image_bytes: Option<u64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header_limit: DEFAULT_HEADER_LIMIT,
            verify_scan_lines: false,
            max_image_bytes: None,
        }
    }
}

impl ReadOptions {
    pub fn with_header_limit(mut self, bytes: usize) -> Self {
        self.header_limit = bytes;
        self
    }

    pub fn with_verify_scan_lines(mut self, verify: bool) -> Self {
        self.verify_scan_lines = verify;
        self
    }

    pub fn with_max_image_bytes(mut self, bytes: u64) -> Self {
        self.max_image_bytes = Some(bytes);
        self
    }
}
