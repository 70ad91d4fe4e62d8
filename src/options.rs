//! Export configuration.

/// Default gzip level for volume containers.
pub const DEFAULT_COMPRESSION: u32 = 6;

/// Options shared by the volume and mesh pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Process images / organs on the rayon thread pool.
    pub parallel: bool,
    /// Gzip level (0-9) for `.nii.gz` output.
    pub compression: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            compression: DEFAULT_COMPRESSION,
        }
    }
}

impl ExportOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel iteration.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the gzip level, clamped to 0-9.
    pub fn compression(mut self, level: u32) -> Self {
        self.compression = level.min(9);
        self
    }
}
