//! `treecopy_fs`:
//! Filtered, statistics-gathering directory-tree copy.
//!
//! Modules:
//! - `copy`   : top-level run (`copy_tree`)
//! - `action` : per-node copy decision (`CopyAction`)
//! - `walk`   : depth-first walker and visitor contract
//! - `filter` : file filters and the AND-ed chain
//! - `ops`    : swappable filesystem and process primitives
//! - `output` : verbosity-tagged logging
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod action;
pub mod copy;
pub mod filter;
pub mod ops;
pub mod output;
pub mod report;
pub mod spec;
pub mod walk;
mod util;

pub use action::CopyAction;
pub use copy::{build_filter_chain, copy_tree};
pub use filter::{
    CopyFilter, ExcludePatternFilter, FilterChain, IncludeAllFilter, IncludePatternFilter,
    ModifiedSinceFilter,
};
pub use ops::{CommandRunner, FsOps, LocalFs, ProcessCommandRunner};
pub use output::write_line;
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyTreeAbort, CopyTreeError, EnumCopyFailureClass, EnumCopyPatternMode, EnumSkipReason,
    EnumVerbosity, EnumVisitOutcome, SpecCopyOptions,
};
pub use util::format_os_error;
pub use walk::{DirectoryVisitor, walk_tree};
