use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use treecopy_fs::{EnumCopyPatternMode, SpecCopyOptions};

#[derive(Parser, Debug)]
#[command(name = "treecopy")]
#[command(version, about = "Copy a directory tree with filters and run statistics")]
pub struct Cli {
    /// Source directory
    pub source: PathBuf,
    /// Destination directory (created if missing)
    pub destination: PathBuf,
    /// Count and skip files that cannot be read instead of stopping
    #[arg(long)]
    pub skip_denied: bool,
    /// Program run with the relative path of a locked file before stopping
    #[arg(long, value_name = "PATH")]
    pub lock_command: Option<PathBuf>,
    /// Only copy files whose name matches one of these masks
    #[arg(long = "include", value_name = "MASK")]
    pub patterns_include: Vec<String>,
    /// Never copy files whose name matches one of these masks
    #[arg(long = "exclude", value_name = "MASK")]
    pub patterns_exclude: Vec<String>,
    /// How include/exclude masks are interpreted
    #[arg(long, value_enum, default_value_t = PatternModeArg::Glob)]
    pub pattern_mode: PatternModeArg,
    /// Copy only the files directly inside the source directory
    #[arg(long)]
    pub no_recursive: bool,
    /// 0 = silent, 1 = warnings, 2 = normal, 3 = verbose
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: u8,
    /// File recording the start time of the last successful run
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,
    /// Copy only files modified since the run recorded in --state-file
    #[arg(long, requires = "state_file")]
    pub incremental: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternModeArg {
    Glob,
    Regex,
    Literal,
}

impl From<PatternModeArg> for EnumCopyPatternMode {
    fn from(value: PatternModeArg) -> Self {
        match value {
            PatternModeArg::Glob => EnumCopyPatternMode::Glob,
            PatternModeArg::Regex => EnumCopyPatternMode::Regex,
            PatternModeArg::Literal => EnumCopyPatternMode::Literal,
        }
    }
}

impl Cli {
    /// Copy options from the parsed arguments. The modified-since cutoff is
    /// filled in separately from the state file.
    pub fn to_copy_options(&self) -> SpecCopyOptions {
        SpecCopyOptions {
            patterns_include_files: (!self.patterns_include.is_empty())
                .then(|| self.patterns_include.clone()),
            patterns_exclude_files: (!self.patterns_exclude.is_empty())
                .then(|| self.patterns_exclude.clone()),
            rule_pattern: self.pattern_mode.into(),
            modified_since: None,
            if_skip_denied: self.skip_denied,
            lock_command: self.lock_command.clone(),
            if_recursive: !self.no_recursive,
        }
    }
}
