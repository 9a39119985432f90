//! OS primitives used by [`crate::CopyAction`].
//!
//! Both seams are traits so a run can be driven against injected failures
//! without touching the real filesystem or launching processes.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use crate::util::copy_file_with_metadata;

/// Filesystem operations needed by a copy run.
pub trait FsOps {
    /// Create `path` and any missing parents. Existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy one file, replacing an existing destination. Returns bytes written.
    fn copy_file(&self, path_src: &Path, path_dst: &Path) -> io::Result<u64>;

    /// Size of the file at `path` in bytes.
    fn file_size(&self, path: &Path) -> io::Result<u64>;
}

/// [`FsOps`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FsOps for LocalFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, path_src: &Path, path_dst: &Path) -> io::Result<u64> {
        copy_file_with_metadata(path_src, path_dst)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }
}

/// Runs an external command to completion.
pub trait CommandRunner {
    /// Spawn `program` with `args` and block until it exits.
    ///
    /// Returns the exit code, or `None` when the process ended without one
    /// (e.g. killed by a signal).
    fn run_and_wait(&self, program: &Path, args: &[OsString]) -> io::Result<Option<i32>>;
}

/// [`CommandRunner`] that spawns a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run_and_wait(&self, program: &Path, args: &[OsString]) -> io::Result<Option<i32>> {
        let status = Command::new(program).args(args).status()?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{CommandRunner, FsOps, LocalFs, ProcessCommandRunner};

    #[test]
    fn local_fs_copies_and_reports_size() {
        let tmp = TempDir::new().expect("tempdir");
        let path_src = tmp.path().join("a.txt");
        let path_dst = tmp.path().join("out/a.txt");
        std::fs::write(&path_src, "0123456789").expect("write");

        let fs_ops = LocalFs;
        fs_ops
            .create_dir_all(&tmp.path().join("out"))
            .expect("mkdir");
        fs_ops
            .create_dir_all(&tmp.path().join("out"))
            .expect("mkdir is idempotent");
        let n_bytes = fs_ops.copy_file(&path_src, &path_dst).expect("copy");

        assert_eq!(n_bytes, 10);
        assert_eq!(fs_ops.file_size(&path_dst).expect("size"), 10);
        assert_eq!(std::fs::read_to_string(&path_dst).expect("read"), "0123456789");
    }

    #[test]
    fn local_fs_size_of_missing_file_fails() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(LocalFs.file_size(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn process_runner_reports_spawn_failure() {
        let res = ProcessCommandRunner.run_and_wait(
            Path::new("/definitely/not/a/real/program"),
            &[OsString::from("x")],
        );
        assert!(res.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_returns_exit_code() {
        let code = ProcessCommandRunner
            .run_and_wait(
                Path::new("/bin/sh"),
                &[OsString::from("-c"), OsString::from("exit 3")],
            )
            .expect("run sh");
        assert_eq!(code, Some(3));
    }
}
