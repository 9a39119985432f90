//! Verbosity-tagged output routed through `tracing`.
//!
//! Each [`EnumVerbosity`] maps to one tracing level, so the subscriber's level
//! filter acts as the verbosity threshold:
//!
//! | verbosity      | level   |
//! |----------------|---------|
//! | `Always`       | `ERROR` |
//! | `UnlessSilent` | `WARN`  |
//! | `Normal`       | `INFO`  |
//! | `IfVerbose`    | `DEBUG` |

use tracing::Level;

use crate::spec::EnumVerbosity;

impl EnumVerbosity {
    /// Tracing level that carries messages of this verbosity.
    pub fn level(self) -> Level {
        match self {
            Self::Always => Level::ERROR,
            Self::UnlessSilent => Level::WARN,
            Self::Normal => Level::INFO,
            Self::IfVerbose => Level::DEBUG,
        }
    }

    /// Verbosity for a numeric setting (`0` = silent .. `3` = verbose).
    ///
    /// Messages at or below the returned verbosity are shown.
    pub fn from_setting(n_setting: u8) -> Self {
        match n_setting {
            0 => Self::Always,
            1 => Self::UnlessSilent,
            2 => Self::Normal,
            _ => Self::IfVerbose,
        }
    }
}

/// Write one line at the given verbosity.
pub fn write_line(message: &str, verbosity: EnumVerbosity) {
    match verbosity {
        EnumVerbosity::Always => tracing::error!("{message}"),
        EnumVerbosity::UnlessSilent => tracing::warn!("{message}"),
        EnumVerbosity::Normal => tracing::info!("{message}"),
        EnumVerbosity::IfVerbose => tracing::debug!("{message}"),
    }
}
