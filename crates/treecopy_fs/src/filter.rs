//! File filters and the AND-ed filter chain.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;

use crate::spec::{CopyTreeError, EnumCopyPatternMode};
use crate::util::{TypeCopyPatternSeq, file_name_lossy};

/// Predicate over a source file path.
pub trait CopyFilter: fmt::Debug {
    fn is_file_match(&self, path: &Path) -> bool;
}

/// Matches every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllFilter;

impl CopyFilter for IncludeAllFilter {
    fn is_file_match(&self, _path: &Path) -> bool {
        true
    }
}

/// Matches files whose basename matches at least one pattern.
#[derive(Debug, Clone)]
pub struct IncludePatternFilter {
    patterns: TypeCopyPatternSeq,
}

impl IncludePatternFilter {
    pub fn new(
        patterns: &[String],
        rule_pattern: EnumCopyPatternMode,
    ) -> Result<Self, CopyTreeError> {
        Ok(Self {
            patterns: TypeCopyPatternSeq::compile(patterns, rule_pattern)?,
        })
    }
}

impl CopyFilter for IncludePatternFilter {
    fn is_file_match(&self, path: &Path) -> bool {
        self.patterns.is_any_match(&file_name_lossy(path))
    }
}

/// Matches files whose basename matches none of the patterns.
#[derive(Debug, Clone)]
pub struct ExcludePatternFilter {
    patterns: TypeCopyPatternSeq,
}

impl ExcludePatternFilter {
    pub fn new(
        patterns: &[String],
        rule_pattern: EnumCopyPatternMode,
    ) -> Result<Self, CopyTreeError> {
        Ok(Self {
            patterns: TypeCopyPatternSeq::compile(patterns, rule_pattern)?,
        })
    }
}

impl CopyFilter for ExcludePatternFilter {
    fn is_file_match(&self, path: &Path) -> bool {
        !self.patterns.is_any_match(&file_name_lossy(path))
    }
}

/// Matches files modified strictly after a point in time.
///
/// Files whose metadata cannot be read match, so the copy itself reports the
/// real failure.
#[derive(Debug, Clone, Copy)]
pub struct ModifiedSinceFilter {
    since: FileTime,
}

impl ModifiedSinceFilter {
    pub fn new(since: SystemTime) -> Self {
        Self {
            since: FileTime::from_system_time(since),
        }
    }
}

impl CopyFilter for ModifiedSinceFilter {
    fn is_file_match(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(stat) => FileTime::from_last_modification_time(&stat) > self.since,
            Err(_) => true,
        }
    }
}

/// Ordered filters combined with logical AND.
///
/// Order only affects how early evaluation stops. An empty chain matches
/// everything.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn CopyFilter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn CopyFilter>>) -> Self {
        Self { filters }
    }

    pub fn push(&mut self, filter: Box<dyn CopyFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn is_file_match(&self, path: &Path) -> bool {
        self.filters.iter().all(|f| f.is_file_match(path))
    }
}
