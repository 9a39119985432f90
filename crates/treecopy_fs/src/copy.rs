//! Top-level copy run: validation, filter setup and traversal.

use std::path::Path;

use crate::action::CopyAction;
use crate::filter::{
    ExcludePatternFilter, FilterChain, IncludePatternFilter, ModifiedSinceFilter,
};
use crate::report::ReportCopy;
use crate::spec::{CopyTreeAbort, CopyTreeError, SpecCopyOptions};
use crate::util::is_overlap;
use crate::walk::walk_tree;

/// Copy a directory tree from `dir_source` to `dir_destination`.
///
/// Behavior is controlled by [`SpecCopyOptions`]:
/// - include/exclude file masks and an optional modified-since cutoff,
///   AND-ed into one filter chain,
/// - the skip-denied policy,
/// - the optional lock command,
/// - recursive vs root-only traversal.
///
/// The destination tree is created as needed and existing files are
/// overwritten. The first fatal error stops the run; the returned
/// [`CopyTreeAbort`] carries the counters gathered up to that point.
pub fn copy_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, CopyTreeAbort>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if !path_dir_src.is_dir() {
        return Err(CopyTreeError::SourceNotDirectory(path_dir_src).into());
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(CopyTreeError::SourceDestinationOverlap {
            source_dir: path_dir_src,
            destination_dir: path_dir_dst,
        }
        .into());
    }

    let filters = build_filter_chain(&spec_cp_options)?;
    let mut action = CopyAction::new(
        path_dir_src.clone(),
        path_dir_dst,
        spec_cp_options.if_skip_denied,
        spec_cp_options.lock_command,
        filters,
    );

    match walk_tree(&path_dir_src, spec_cp_options.if_recursive, &mut action) {
        Ok(()) => Ok(action.report()),
        Err(error) => Err(CopyTreeAbort {
            report: action.report(),
            error,
        }),
    }
}

/// Build the filter chain described by `spec_cp_options`.
///
/// Cheap name filters come first so the metadata lookup of the
/// modified-since filter only runs for files that passed them.
pub fn build_filter_chain(
    spec_cp_options: &SpecCopyOptions,
) -> Result<FilterChain, CopyTreeError> {
    let mut filters = FilterChain::default();

    if let Some(patterns) = spec_cp_options.patterns_include_files.as_deref()
        && !patterns.is_empty()
    {
        filters.push(Box::new(IncludePatternFilter::new(
            patterns,
            spec_cp_options.rule_pattern,
        )?));
    }
    if let Some(patterns) = spec_cp_options.patterns_exclude_files.as_deref()
        && !patterns.is_empty()
    {
        filters.push(Box::new(ExcludePatternFilter::new(
            patterns,
            spec_cp_options.rule_pattern,
        )?));
    }
    if let Some(since) = spec_cp_options.modified_since {
        filters.push(Box::new(ModifiedSinceFilter::new(since)));
    }

    Ok(filters)
}
