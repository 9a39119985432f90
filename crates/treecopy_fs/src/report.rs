//! Copy report models and mutable report builder.

use std::fmt;

/// Aggregate counters for one copy run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportCopy {
    /// Sum of the sizes of copied files. May under-count when a size query fails.
    pub byte_count: u64,
    /// Number of directories whose contents were fully processed.
    pub directory_count: u64,
    /// Number of files copied.
    pub file_count: u64,
    /// Number of files skipped by filter or by the skip-denied policy.
    pub skip_count: u64,
}

impl ReportCopy {
    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} Copied {} files ({} bytes), {} directories, skipped {}",
            self.file_count, self.byte_count, self.directory_count, self.skip_count
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
///
/// Counters only ever grow.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    byte_count: u64,
    directory_count: u64,
    file_count: u64,
    skip_count: u64,
}

impl ReportCopyBuilder {
    pub fn add_bytes(&mut self, n_bytes: u64) {
        self.byte_count = self.byte_count.saturating_add(n_bytes);
    }

    pub fn add_directory(&mut self) {
        self.directory_count += 1;
    }

    pub fn add_file(&mut self) {
        self.file_count += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skip_count += 1;
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn directory_count(&self) -> u64 {
        self.directory_count
    }

    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    /// Snapshot of the current counters.
    pub fn build(&self) -> ReportCopy {
        ReportCopy {
            byte_count: self.byte_count,
            directory_count: self.directory_count,
            file_count: self.file_count,
            skip_count: self.skip_count,
        }
    }
}
