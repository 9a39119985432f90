//! Copy specification models, visit outcomes and top-level error types.

use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::report::ReportCopy;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude file masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// Output threshold attached to every log line.
///
/// Lower variants are shown at lower verbosity settings; `Always` survives
/// even the quietest setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumVerbosity {
    /// Always written.
    Always,
    /// Written unless output is silenced.
    UnlessSilent,
    /// Default output level.
    Normal,
    /// Only written in verbose mode.
    IfVerbose,
}

/// Failure class of one file-copy error, derived from the OS error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyFailureClass {
    /// Permission denied.
    AccessDenied,
    /// File is open by another process without sharing.
    SharingViolation,
    /// A byte-range lock on the file blocks the read.
    LockViolation,
    /// Anything else.
    Other,
}

impl EnumCopyFailureClass {
    /// Failures that `skip_denied` turns into a skip.
    pub fn is_access_denied(self) -> bool {
        matches!(self, Self::AccessDenied | Self::SharingViolation)
    }

    /// Failures that trigger the lock command when one is configured.
    pub fn is_locked(self) -> bool {
        matches!(self, Self::SharingViolation | Self::LockViolation)
    }
}

/// Why a visited file was not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSkipReason {
    /// At least one filter in the chain rejected the file.
    Filtered,
    /// Copy failed with an access-denied class error and skipping is enabled.
    AccessDenied,
}

/// Result of one file visit.
#[derive(Debug)]
pub enum EnumVisitOutcome {
    /// File was copied; keep walking.
    Continue,
    /// File was skipped; keep walking.
    Skip(EnumSkipReason),
    /// Fatal failure; the walker must stop and surface the error.
    Abort(CopyTreeError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_tree`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Include patterns applied to file basename.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumCopyPatternMode,
    /// Copy only files modified strictly after this instant.
    pub modified_since: Option<SystemTime>,
    /// Count and skip files that fail with access denied instead of aborting.
    pub if_skip_denied: bool,
    /// Executable launched with the relative path of a locked file.
    pub lock_command: Option<PathBuf>,
    /// Descend into subdirectories.
    pub if_recursive: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            patterns_include_files: None,
            patterns_exclude_files: None,
            rule_pattern: EnumCopyPatternMode::Glob,
            modified_since: None,
            if_skip_denied: false,
            lock_command: None,
            if_recursive: true,
        }
    }
}

/// Errors that end a copy run.
#[derive(Debug, thiserror::Error)]
pub enum CopyTreeError {
    /// Invalid include/exclude pattern.
    #[error("Invalid pattern in include/exclude: {0}")]
    InvalidPattern(String),
    /// Source path is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        source_dir.display(),
        destination_dir.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        source_dir: PathBuf,
        /// Normalized destination directory.
        destination_dir: PathBuf,
    },
    /// Destination directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectoryFailed {
        /// Destination directory.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Source directory listing failed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirectoryFailed {
        /// Source directory.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Copy failure that no policy handles.
    #[error("Copy of file failed with error {message} on file {}", path.display())]
    CopyFailed {
        /// Source file.
        path: PathBuf,
        /// Formatted OS error text.
        message: String,
    },
    /// Locked file; the lock command already ran.
    #[error("Encountered error {message} accessing file {}.", path.display())]
    LockedFile {
        /// Source file.
        path: PathBuf,
        /// Formatted OS error text.
        message: String,
        /// Exit code of the lock command, `None` if it did not run to completion.
        exit_code: Option<i32>,
    },
}

/// A run that stopped on a fatal error, with the counters gathered so far.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct CopyTreeAbort {
    /// Counters at the time of the abort.
    pub report: ReportCopy,
    /// The fatal error.
    #[source]
    pub error: CopyTreeError,
}

impl From<CopyTreeError> for CopyTreeAbort {
    fn from(error: CopyTreeError) -> Self {
        Self {
            report: ReportCopy::default(),
            error,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
