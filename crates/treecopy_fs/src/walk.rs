//! Depth-first directory walker and the visitor contract it drives.

use std::fs;
use std::path::{Path, PathBuf};

use crate::output::write_line;
use crate::spec::{CopyTreeError, EnumVerbosity, EnumVisitOutcome};
use crate::util::combine_path;

/// Callbacks invoked by [`walk_tree`].
///
/// All paths are relative to the walked root; the root itself is the empty
/// path.
pub trait DirectoryVisitor {
    /// Called before any child of `path_rel` is visited.
    fn visit_directory_initial(&mut self, path_rel: &Path) -> Result<(), CopyTreeError>;

    /// Called after every child of `path_rel` was visited.
    fn visit_directory_final(&mut self, path_rel: &Path);

    /// Called exactly once per regular file, or link to one.
    fn visit_file(&mut self, path_rel: &Path) -> EnumVisitOutcome;
}

#[derive(Debug, Clone)]
struct SpecDirListing {
    l_files: Vec<PathBuf>,
    l_dirs: Vec<PathBuf>,
}

/// Walk `path_root` depth first, driving `visitor`.
///
/// Per directory: initial callback, files in name order, subdirectories in
/// name order, final callback. With `if_recursive = false` only the root's
/// files are visited. Stops at the first `Abort` and returns its error.
pub fn walk_tree<V>(
    path_root: &Path,
    if_recursive: bool,
    visitor: &mut V,
) -> Result<(), CopyTreeError>
where
    V: DirectoryVisitor + ?Sized,
{
    walk_directory(path_root, Path::new(""), if_recursive, visitor)
}

fn walk_directory<V>(
    path_root: &Path,
    path_rel: &Path,
    if_recursive: bool,
    visitor: &mut V,
) -> Result<(), CopyTreeError>
where
    V: DirectoryVisitor + ?Sized,
{
    visitor.visit_directory_initial(path_rel)?;

    let spec_listing = list_directory(&combine_path(path_root, path_rel))?;

    for c_name in spec_listing.l_files {
        let path_file_rel = path_rel.join(c_name);
        if let EnumVisitOutcome::Abort(e) = visitor.visit_file(&path_file_rel) {
            return Err(e);
        }
    }

    if if_recursive {
        for c_name in spec_listing.l_dirs {
            walk_directory(path_root, &path_rel.join(c_name), if_recursive, visitor)?;
        }
    }

    visitor.visit_directory_final(path_rel);
    Ok(())
}

fn list_directory(path_dir: &Path) -> Result<SpecDirListing, CopyTreeError> {
    let iter_entries = fs::read_dir(path_dir).map_err(|e| CopyTreeError::ReadDirectoryFailed {
        path: path_dir.to_path_buf(),
        source: e,
    })?;

    let mut l_dirs: Vec<PathBuf> = Vec::new();
    let mut l_files: Vec<PathBuf> = Vec::new();

    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| CopyTreeError::ReadDirectoryFailed {
            path: path_dir.to_path_buf(),
            source: e,
        })?;

        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                write_line(
                    &format!("Failed to inspect {} ({e}). Skipping.", path_entry.display()),
                    EnumVerbosity::UnlessSilent,
                );
                continue;
            }
        };

        let c_name = PathBuf::from(entry.file_name());
        if cfg_file_type.is_dir() {
            l_dirs.push(c_name);
        } else if cfg_file_type.is_file() {
            l_files.push(c_name);
        } else if cfg_file_type.is_symlink() {
            match fs::metadata(&path_entry) {
                Ok(stat) if stat.is_file() => l_files.push(c_name),
                Ok(stat) if stat.is_dir() => write_line(
                    &format!("Not following directory link {}", path_entry.display()),
                    EnumVerbosity::UnlessSilent,
                ),
                Ok(_) => write_line(
                    &format!("Special file skipped: {}", path_entry.display()),
                    EnumVerbosity::UnlessSilent,
                ),
                Err(e) => write_line(
                    &format!("Broken link {} ({e}). Skipping.", path_entry.display()),
                    EnumVerbosity::UnlessSilent,
                ),
            }
        } else {
            write_line(
                &format!("Special file skipped: {}", path_entry.display()),
                EnumVerbosity::UnlessSilent,
            );
        }
    }

    l_dirs.sort();
    l_files.sort();
    Ok(SpecDirListing { l_files, l_dirs })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{DirectoryVisitor, walk_tree};
    use crate::spec::{CopyTreeError, EnumSkipReason, EnumVisitOutcome};

    #[derive(Debug, Default)]
    struct RecordingVisitor {
        l_events: Vec<String>,
        abort_on: Option<PathBuf>,
    }

    impl DirectoryVisitor for RecordingVisitor {
        fn visit_directory_initial(&mut self, path_rel: &Path) -> Result<(), CopyTreeError> {
            self.l_events.push(format!("enter:{}", path_rel.display()));
            Ok(())
        }

        fn visit_directory_final(&mut self, path_rel: &Path) {
            self.l_events.push(format!("leave:{}", path_rel.display()));
        }

        fn visit_file(&mut self, path_rel: &Path) -> EnumVisitOutcome {
            self.l_events.push(format!("file:{}", path_rel.display()));
            if self.abort_on.as_deref() == Some(path_rel) {
                return EnumVisitOutcome::Abort(CopyTreeError::CopyFailed {
                    path: path_rel.to_path_buf(),
                    message: "injected".to_string(),
                });
            }
            if path_rel.ends_with("skip.txt") {
                return EnumVisitOutcome::Skip(EnumSkipReason::Filtered);
            }
            EnumVisitOutcome::Continue
        }
    }

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    fn build_tree() -> TempDir {
        let tmp = TempDir::new().expect("tempdir");
        write_text(&tmp.path().join("b.txt"), "b");
        write_text(&tmp.path().join("a.txt"), "a");
        write_text(&tmp.path().join("skip.txt"), "s");
        write_text(&tmp.path().join("sub/c.txt"), "c");
        write_text(&tmp.path().join("sub/deeper/d.txt"), "d");
        std::fs::create_dir_all(tmp.path().join("empty")).expect("mkdir");
        tmp
    }

    #[test]
    fn walk_visits_files_then_subdirectories_in_name_order() {
        let tmp = build_tree();
        let mut visitor = RecordingVisitor::default();
        walk_tree(tmp.path(), true, &mut visitor).expect("walk");

        assert_eq!(
            visitor.l_events,
            vec![
                "enter:",
                "file:a.txt",
                "file:b.txt",
                "file:skip.txt",
                "enter:empty",
                "leave:empty",
                "enter:sub",
                "file:sub/c.txt",
                "enter:sub/deeper",
                "file:sub/deeper/d.txt",
                "leave:sub/deeper",
                "leave:sub",
                "leave:",
            ]
        );
    }

    #[test]
    fn walk_non_recursive_stays_in_root() {
        let tmp = build_tree();
        let mut visitor = RecordingVisitor::default();
        walk_tree(tmp.path(), false, &mut visitor).expect("walk");

        assert_eq!(
            visitor.l_events,
            vec!["enter:", "file:a.txt", "file:b.txt", "file:skip.txt", "leave:"]
        );
    }

    #[test]
    fn walk_stops_at_first_abort() {
        let tmp = build_tree();
        let mut visitor = RecordingVisitor {
            abort_on: Some(PathBuf::from("sub/c.txt")),
            ..RecordingVisitor::default()
        };
        let err = walk_tree(tmp.path(), true, &mut visitor).expect_err("abort");

        assert!(matches!(err, CopyTreeError::CopyFailed { .. }));
        assert_eq!(visitor.l_events.last().map(String::as_str), Some("file:sub/c.txt"));
        assert!(!visitor.l_events.iter().any(|e| e == "leave:sub"));
        assert!(!visitor.l_events.iter().any(|e| e.contains("deeper")));
    }

    #[test]
    fn walk_missing_root_fails_after_enter() {
        let tmp = TempDir::new().expect("tempdir");
        let mut visitor = RecordingVisitor::default();
        let err = walk_tree(&tmp.path().join("missing"), true, &mut visitor)
            .expect_err("missing root");

        assert!(matches!(err, CopyTreeError::ReadDirectoryFailed { .. }));
        assert_eq!(visitor.l_events, vec!["enter:"]);
    }

    #[cfg(unix)]
    #[test]
    fn walk_visits_file_links_but_not_directory_links() {
        use std::os::unix::fs::symlink;

        let tmp = build_tree();
        symlink(tmp.path().join("a.txt"), tmp.path().join("link_a.txt")).expect("file link");
        symlink(tmp.path().join("sub"), tmp.path().join("link_sub")).expect("dir link");

        let mut visitor = RecordingVisitor::default();
        walk_tree(tmp.path(), true, &mut visitor).expect("walk");

        assert!(visitor.l_events.iter().any(|e| e == "file:link_a.txt"));
        assert!(!visitor.l_events.iter().any(|e| e.contains("link_sub")));
    }

    #[cfg(unix)]
    #[test]
    fn walk_skips_dangling_links_and_keeps_going() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        write_text(&tmp.path().join("a.txt"), "a");
        write_text(&tmp.path().join("c.txt"), "c");
        symlink(tmp.path().join("gone"), tmp.path().join("b_dangling")).expect("link");

        let mut visitor = RecordingVisitor::default();
        walk_tree(tmp.path(), true, &mut visitor).expect("walk");

        assert_eq!(
            visitor.l_events,
            vec!["enter:", "file:a.txt", "file:c.txt", "leave:"]
        );
    }
}
