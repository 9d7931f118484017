//! Config-file discovery settings.
//!
//! A command with a config base name looks for `<base>.toml`, `<base>.yaml`,
//! `<base>.yml` or `<base>.json` in each directory named by its
//! [`SearchPath`] list. The list is **priority-ascending**: files found later
//! override files found earlier. [`SearchMode`] decides whether all found
//! files are merged or only the highest-priority one is used.
//!
//! Common layouts:
//!
//! ```ignore
//! // user-level settings, overridden by a project file in the working dir
//! vec![SearchPath::Platform, SearchPath::Cwd]
//!
//! // nearest project config wins, walking up to the repository root
//! vec![SearchPath::Ancestors(Boundary::Marker(".git"))] + SearchMode::FirstMatch
//! ```

use std::path::PathBuf;

/// Where to search for config files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
    /// The working directory and its ancestors, shallowest first.
    Ancestors(Boundary),
}

/// How far [`SearchPath::Ancestors`] walks up.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Up to the filesystem root.
    Root,
    /// Up to and including the first directory containing this entry.
    Marker(&'static str),
}

/// What to do when several config files are found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Merge all found files, later ones winning key by key.
    #[default]
    Merge,
    /// Use only the highest-priority file found.
    FirstMatch,
}
