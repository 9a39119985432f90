use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{CopyTreeError, EnumCopyFailureClass, EnumCopyPatternMode};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeCopyPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeCopyPatternSeq {
    pub(crate) fn compile(
        patterns: &[String],
        rule_pattern: EnumCopyPatternMode,
    ) -> Result<Self, CopyTreeError> {
        match rule_pattern {
            EnumCopyPatternMode::Literal => Ok(Self::Literal(patterns.to_vec())),
            EnumCopyPatternMode::Glob => {
                let mut l_glob = Vec::with_capacity(patterns.len());
                for pattern in patterns {
                    let matcher = Glob::new(pattern)
                        .map_err(|e| CopyTreeError::InvalidPattern(e.to_string()))?
                        .compile_matcher();
                    l_glob.push(matcher);
                }
                Ok(Self::Glob(l_glob))
            }
            EnumCopyPatternMode::Regex => {
                let mut l_regex = Vec::with_capacity(patterns.len());
                for pattern in patterns {
                    let regex = Regex::new(pattern)
                        .map_err(|e| CopyTreeError::InvalidPattern(e.to_string()))?;
                    l_regex.push(regex);
                }
                Ok(Self::Regex(l_regex))
            }
        }
    }

    /// True when any pattern matches `value`.
    pub(crate) fn is_any_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Resolve links in the deepest existing ancestor of `path`, then re-append
/// the components that do not exist yet.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = _absolutize_path(path);
    let mut path_existing = path_abs.as_path();
    let mut l_tail: Vec<&OsStr> = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_existing) {
            return l_tail.iter().rev().fold(resolved, |acc, c_name| acc.join(c_name));
        }
        match (path_existing.parent(), path_existing.file_name()) {
            (Some(parent), Some(c_name)) => {
                l_tail.push(c_name);
                path_existing = parent;
            }
            _ => return path_abs.clone(),
        }
    }
}

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Join a path relative to the traversal root under `path_root`.
///
/// The root itself is visited with an empty relative path.
pub(crate) fn combine_path(path_root: &Path, path_rel: &Path) -> PathBuf {
    if path_rel.as_os_str().is_empty() {
        return path_root.to_path_buf();
    }
    path_root.join(path_rel)
}

#[cfg(windows)]
const N_LEN_PATH_MAX: usize = 260;

/// Prefix long absolute paths with `\\?\` so Win32 accepts them.
#[cfg(windows)]
pub(crate) fn fix_long_filename(path: PathBuf) -> PathBuf {
    let c_path = path.as_os_str().to_string_lossy();
    if c_path.len() < N_LEN_PATH_MAX || c_path.starts_with(r"\\?\") || !path.is_absolute() {
        return path;
    }
    if let Some(c_unc) = c_path.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{c_unc}"));
    }
    PathBuf::from(format!(r"\\?\{c_path}"))
}

#[cfg(not(windows))]
pub(crate) fn fix_long_filename(path: PathBuf) -> PathBuf {
    path
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OsErrors

#[cfg(windows)]
const N_ERROR_ACCESS_DENIED: i32 = 5;
#[cfg(windows)]
const N_ERROR_SHARING_VIOLATION: i32 = 32;
#[cfg(windows)]
const N_ERROR_LOCK_VIOLATION: i32 = 33;

/// Classify a copy error by its OS error code.
pub(crate) fn classify_copy_error(error: &io::Error) -> EnumCopyFailureClass {
    #[cfg(windows)]
    {
        match error.raw_os_error() {
            Some(N_ERROR_ACCESS_DENIED) => return EnumCopyFailureClass::AccessDenied,
            Some(N_ERROR_SHARING_VIOLATION) => return EnumCopyFailureClass::SharingViolation,
            Some(N_ERROR_LOCK_VIOLATION) => return EnumCopyFailureClass::LockViolation,
            _ => {}
        }
    }

    match error.kind() {
        io::ErrorKind::PermissionDenied => EnumCopyFailureClass::AccessDenied,
        io::ErrorKind::ResourceBusy | io::ErrorKind::ExecutableFileBusy => {
            EnumCopyFailureClass::SharingViolation
        }
        io::ErrorKind::WouldBlock => EnumCopyFailureClass::LockViolation,
        _ => EnumCopyFailureClass::Other,
    }
}

/// OS error code for log lines, `-1` when the error carries none.
pub(crate) fn os_error_code(error: &io::Error) -> i32 {
    error.raw_os_error().unwrap_or(-1)
}

/// Human-readable OS error text.
pub fn format_os_error(error: &io::Error) -> String {
    error.to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<u64, io::Error> {
    let n_bytes = fs::copy(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        if let Err(e) = apply_metadata_linux(path_file_src, path_file_dst) {
            tracing::debug!(
                "Could not preserve metadata for {} ({e})",
                path_file_dst.display()
            );
        }
    }
    Ok(n_bytes)
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let Ok(iter_xattr_names) = xattr::list(path_file_src) else {
        return;
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "Could not copy attribute {} to {} ({e})",
                name.to_string_lossy(),
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{
        TypeCopyPatternSeq, classify_copy_error, combine_path, file_name_lossy, is_overlap,
    };
    use crate::spec::{CopyTreeError, EnumCopyFailureClass, EnumCopyPatternMode};

    #[test]
    fn combine_path_keeps_root_for_empty_relative() {
        let root = Path::new("/dst");
        assert_eq!(combine_path(root, Path::new("")), PathBuf::from("/dst"));
        assert_eq!(
            combine_path(root, Path::new("sub/a.txt")),
            PathBuf::from("/dst/sub/a.txt")
        );
    }

    #[test]
    fn classify_permission_denied_as_access_denied() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(classify_copy_error(&err), EnumCopyFailureClass::AccessDenied);
        assert!(classify_copy_error(&err).is_access_denied());
        assert!(!classify_copy_error(&err).is_locked());
    }

    #[test]
    fn classify_busy_and_would_block_as_locked() {
        let err_busy = io::Error::from(io::ErrorKind::ResourceBusy);
        let class_busy = classify_copy_error(&err_busy);
        assert_eq!(class_busy, EnumCopyFailureClass::SharingViolation);
        assert!(class_busy.is_access_denied());
        assert!(class_busy.is_locked());

        let err_lock = io::Error::from(io::ErrorKind::WouldBlock);
        let class_lock = classify_copy_error(&err_lock);
        assert_eq!(class_lock, EnumCopyFailureClass::LockViolation);
        assert!(!class_lock.is_access_denied());
        assert!(class_lock.is_locked());
    }

    #[test]
    fn classify_not_found_as_other() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(classify_copy_error(&err), EnumCopyFailureClass::Other);
    }

    #[test]
    fn pattern_seq_glob_regex_literal() {
        let globs =
            TypeCopyPatternSeq::compile(&["*.txt".to_string()], EnumCopyPatternMode::Glob)
                .expect("glob");
        assert!(globs.is_any_match("a.txt"));
        assert!(!globs.is_any_match("a.md"));

        let regexes = TypeCopyPatternSeq::compile(
            &[r"^report_\d+\.csv$".to_string()],
            EnumCopyPatternMode::Regex,
        )
        .expect("regex");
        assert!(regexes.is_any_match("report_01.csv"));
        assert!(!regexes.is_any_match("report_x.csv"));

        let literals =
            TypeCopyPatternSeq::compile(&["log".to_string()], EnumCopyPatternMode::Literal)
                .expect("literal");
        assert!(literals.is_any_match("server.log.1"));
        assert!(!literals.is_any_match("server.txt"));
    }

    #[test]
    fn pattern_seq_rejects_invalid_patterns() {
        let err = TypeCopyPatternSeq::compile(&["[".to_string()], EnumCopyPatternMode::Glob)
            .expect_err("invalid glob");
        assert!(matches!(err, CopyTreeError::InvalidPattern(_)));

        let err = TypeCopyPatternSeq::compile(&["(".to_string()], EnumCopyPatternMode::Regex)
            .expect_err("invalid regex");
        assert!(matches!(err, CopyTreeError::InvalidPattern(_)));
    }

    #[test]
    fn overlap_detects_missing_destination_under_source() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");

        assert!(is_overlap(&src, &src.join("out/deeper")));
        assert!(!is_overlap(&src, &tmp.path().join("dst/deeper")));
    }

    #[cfg(unix)]
    #[test]
    fn overlap_resolves_links_in_source_and_missing_destination() {
        let tmp = TempDir::new().expect("tempdir");
        let path_real = tmp.path().join("real");
        let path_link = tmp.path().join("link");
        std::fs::create_dir_all(&path_real).expect("mkdir");
        std::os::unix::fs::symlink(&path_real, &path_link).expect("symlink");

        assert!(is_overlap(&path_link, &path_link.join("out")));
        assert!(is_overlap(&path_real, &path_link.join("out")));
    }

    #[test]
    fn file_name_lossy_returns_basename() {
        assert_eq!(file_name_lossy(Path::new("/a/b/c.txt")), "c.txt");
        assert_eq!(file_name_lossy(Path::new("/")), "");
    }
}
