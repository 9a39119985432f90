//! The per-node copy decision: copy, skip or abort.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::filter::FilterChain;
use crate::ops::{CommandRunner, FsOps, LocalFs, ProcessCommandRunner};
use crate::output::write_line;
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumSkipReason, EnumVerbosity, EnumVisitOutcome};
use crate::util::{
    classify_copy_error, combine_path, fix_long_filename, format_os_error, os_error_code,
};
use crate::walk::DirectoryVisitor;

/// Copies a source tree into a destination tree as a [`DirectoryVisitor`].
///
/// One instance serves exactly one traversal. Counters are read back through
/// the accessors or [`CopyAction::report`] once the walk has returned.
#[derive(Debug)]
pub struct CopyAction<F = LocalFs, R = ProcessCommandRunner> {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    if_skip_denied: bool,
    lock_command: Option<PathBuf>,
    filters: FilterChain,
    builder_cp_report: ReportCopyBuilder,
    fs_ops: F,
    command_runner: R,
}

impl CopyAction {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        if_skip_denied: bool,
        lock_command: Option<PathBuf>,
        filters: FilterChain,
    ) -> Self {
        Self {
            path_dir_src: source.into(),
            path_dir_dst: destination.into(),
            if_skip_denied,
            lock_command,
            filters,
            builder_cp_report: ReportCopyBuilder::default(),
            fs_ops: LocalFs,
            command_runner: ProcessCommandRunner,
        }
    }
}

impl<F, R> CopyAction<F, R>
where
    F: FsOps,
    R: CommandRunner,
{
    /// Replace the filesystem primitives.
    pub fn with_fs_ops<G: FsOps>(self, fs_ops: G) -> CopyAction<G, R> {
        CopyAction {
            path_dir_src: self.path_dir_src,
            path_dir_dst: self.path_dir_dst,
            if_skip_denied: self.if_skip_denied,
            lock_command: self.lock_command,
            filters: self.filters,
            builder_cp_report: self.builder_cp_report,
            fs_ops,
            command_runner: self.command_runner,
        }
    }

    /// Replace the runner used for the lock command.
    pub fn with_command_runner<S: CommandRunner>(self, command_runner: S) -> CopyAction<F, S> {
        CopyAction {
            path_dir_src: self.path_dir_src,
            path_dir_dst: self.path_dir_dst,
            if_skip_denied: self.if_skip_denied,
            lock_command: self.lock_command,
            filters: self.filters,
            builder_cp_report: self.builder_cp_report,
            fs_ops: self.fs_ops,
            command_runner,
        }
    }

    pub fn byte_count(&self) -> u64 {
        self.builder_cp_report.byte_count()
    }

    pub fn directory_count(&self) -> u64 {
        self.builder_cp_report.directory_count()
    }

    pub fn file_count(&self) -> u64 {
        self.builder_cp_report.file_count()
    }

    pub fn skip_count(&self) -> u64 {
        self.builder_cp_report.skip_count()
    }

    /// Immutable snapshot of the counters.
    pub fn report(&self) -> ReportCopy {
        self.builder_cp_report.build()
    }

    fn handle_copied(&mut self, path_file_src: &Path, path_file_dst: &Path) {
        write_line(
            &format!(
                "Copied file {} to {}",
                path_file_src.display(),
                path_file_dst.display()
            ),
            EnumVerbosity::IfVerbose,
        );
        self.builder_cp_report.add_file();

        match self.fs_ops.file_size(path_file_src) {
            Ok(n_bytes) => self.builder_cp_report.add_bytes(n_bytes),
            Err(e) => write_line(
                &format!(
                    "Unable to calculate size of file. Size calculations may be incorrect. Message was: {}",
                    format_os_error(&e)
                ),
                EnumVerbosity::UnlessSilent,
            ),
        }
    }

    fn handle_copy_error(
        &mut self,
        path_rel: &Path,
        path_file_src: &Path,
        error: io::Error,
    ) -> EnumVisitOutcome {
        let class_failure = classify_copy_error(&error);
        let n_code = os_error_code(&error);

        if class_failure.is_access_denied() && self.if_skip_denied {
            write_line(
                &format!(
                    "Error {n_code} accessing file {}. Skipping.",
                    path_file_src.display()
                ),
                EnumVerbosity::Normal,
            );
            self.builder_cp_report.add_skipped();
            return EnumVisitOutcome::Skip(EnumSkipReason::AccessDenied);
        }

        if class_failure.is_locked()
            && let Some(path_lock_command) = self.lock_command.as_deref()
        {
            write_line(
                &format!(
                    "Encountered error {n_code} accessing file {}.",
                    path_file_src.display()
                ),
                EnumVerbosity::UnlessSilent,
            );
            write_line(
                &format!(
                    "Launching \"{}\" \"{}\" and terminating.",
                    path_lock_command.display(),
                    path_rel.display()
                ),
                EnumVerbosity::UnlessSilent,
            );

            let l_args = [OsString::from(path_rel.as_os_str())];
            let exit_code = match self.command_runner.run_and_wait(path_lock_command, &l_args) {
                Ok(code) => code,
                Err(e) => {
                    write_line(
                        &format!(
                            "Failed to launch {}: {}",
                            path_lock_command.display(),
                            format_os_error(&e)
                        ),
                        EnumVerbosity::UnlessSilent,
                    );
                    None
                }
            };

            return EnumVisitOutcome::Abort(CopyTreeError::LockedFile {
                path: path_file_src.to_path_buf(),
                message: format_os_error(&error),
                exit_code,
            });
        }

        EnumVisitOutcome::Abort(CopyTreeError::CopyFailed {
            path: path_file_src.to_path_buf(),
            message: format_os_error(&error),
        })
    }
}

impl<F, R> DirectoryVisitor for CopyAction<F, R>
where
    F: FsOps,
    R: CommandRunner,
{
    fn visit_directory_initial(&mut self, path_rel: &Path) -> Result<(), CopyTreeError> {
        let path_dir_dst = combine_path(&self.path_dir_dst, path_rel);
        self.fs_ops
            .create_dir_all(&path_dir_dst)
            .map_err(|e| CopyTreeError::CreateDirectoryFailed {
                path: path_dir_dst.clone(),
                source: e,
            })?;
        write_line(
            &format!("Created directory {}", path_dir_dst.display()),
            EnumVerbosity::IfVerbose,
        );
        Ok(())
    }

    fn visit_directory_final(&mut self, path_rel: &Path) {
        write_line(
            &format!("Copied directory {}", path_rel.display()),
            EnumVerbosity::Normal,
        );
        self.builder_cp_report.add_directory();
    }

    fn visit_file(&mut self, path_rel: &Path) -> EnumVisitOutcome {
        let path_file_src = combine_path(&self.path_dir_src, path_rel);
        let path_file_dst = fix_long_filename(combine_path(&self.path_dir_dst, path_rel));

        if !self.filters.is_file_match(&path_file_src) {
            write_line(
                &format!(
                    "Skipping file {} because it doesn't meet filter criteria.",
                    path_rel.display()
                ),
                EnumVerbosity::Normal,
            );
            self.builder_cp_report.add_skipped();
            return EnumVisitOutcome::Skip(EnumSkipReason::Filtered);
        }

        match self.fs_ops.copy_file(&path_file_src, &path_file_dst) {
            Ok(_) => {
                self.handle_copied(&path_file_src, &path_file_dst);
                EnumVisitOutcome::Continue
            }
            Err(e) => self.handle_copy_error(path_rel, &path_file_src, e),
        }
    }
}
