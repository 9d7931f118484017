//! Config file discovery, loading and format dispatch.
//!
//! # Discovery
//!
//! Each [`SearchPath`] resolves to one or more directories, kept in
//! priority-ascending order. `Ancestors` expands inline, shallowest first, so
//! the directory closest to the working directory has the highest priority.
//!
//! In each directory the base name is probed with the supported extensions in
//! [`Format::EXTENSIONS`] order and the first hit is taken. A base name that
//! already carries a supported extension is looked up verbatim.
//!
//! # Resolution
//!
//! - [`SearchMode::Merge`] returns every file found, lowest priority first.
//! - [`SearchMode::FirstMatch`] returns only the highest-priority file found.
//!
//! Missing files are skipped. Other I/O errors (permissions, etc.) propagate.
//!
//! # Formats
//!
//! Parsing is delegated to `toml`, `serde_yaml` and `serde_json`. Every format
//! is read into a `toml::Table`, which the resolver merges and coerces.

use std::path::{Path, PathBuf};

use toml::Table;
use tracing::debug;

use crate::error::CommandError;
use crate::types::{Boundary, SearchMode, SearchPath};

/// A supported config file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Extensions probed during discovery, in probe order.
    pub const EXTENSIONS: &'static [(&'static str, Format)] = &[
        ("toml", Format::Toml),
        ("yaml", Format::Yaml),
        ("yml", Format::Yaml),
        ("json", Format::Json),
    ];

    /// Format implied by a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
    }

    /// Parse a document into a table. An empty document is an empty table.
    ///
    /// Top-level `null` (JSON) and `~` (YAML) values are dropped, so the key
    /// counts as unset.
    pub fn parse(self, content: &str) -> Result<Table, String> {
        if content.trim().is_empty() {
            return Ok(Table::new());
        }
        match self {
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(content)
                .map_err(|e| e.to_string())
                .and_then(without_nulls),
            Format::Json => serde_json::from_str(content)
                .map_err(|e| e.to_string())
                .and_then(without_nulls),
        }
    }
}

fn without_nulls(document: serde_json::Map<String, serde_json::Value>) -> Result<Table, String> {
    document
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = toml::Value::try_from(value).map_err(|e| format!("{key}: {e}"))?;
            Ok((key, value))
        })
        .collect()
}

/// Parse a loaded file, choosing the format from its extension.
pub fn parse_file(path: &Path, content: &str) -> Result<Table, CommandError> {
    let format = Format::from_path(path).ok_or_else(|| CommandError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    format.parse(content).map_err(|reason| CommandError::ParseError {
        path: path.to_path_buf(),
        reason,
    })
}

/// Expand [`SearchPath::Ancestors`] starting from `start` instead of the CWD.
pub fn expand_ancestors_from(start: PathBuf, boundary: &Boundary) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut current = start.as_path();

    loop {
        dirs.push(current.to_path_buf());

        if let Boundary::Marker(name) = boundary
            && current.join(name).exists()
        {
            break;
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    // Shallowest first (lowest priority), deepest last (highest priority).
    dirs.reverse();
    dirs
}

/// Expand all search paths into concrete directories, priority-ascending.
///
/// `app_name` names the platform config directory. Paths that cannot be
/// resolved (no home directory, unreadable CWD) are dropped.
pub fn expand_search_paths(search_paths: &[SearchPath], app_name: &str) -> Vec<PathBuf> {
    expand_search_paths_from(search_paths, app_name, None)
}

/// Like [`expand_search_paths`] with an explicit start directory for
/// `Ancestors` and `Cwd`.
pub fn expand_search_paths_from(
    search_paths: &[SearchPath],
    app_name: &str,
    cwd: Option<&Path>,
) -> Vec<PathBuf> {
    let cwd = cwd
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok());

    let mut dirs = Vec::new();
    for sp in search_paths {
        match sp {
            SearchPath::Platform => {
                if let Some(proj) = directories::ProjectDirs::from("", "", app_name) {
                    dirs.push(proj.config_dir().to_path_buf());
                }
            }
            SearchPath::Home(subdir) => {
                if let Some(user) = directories::UserDirs::new() {
                    dirs.push(user.home_dir().join(subdir));
                }
            }
            SearchPath::Cwd => dirs.extend(cwd.clone()),
            SearchPath::Path(p) => dirs.push(p.clone()),
            SearchPath::Ancestors(boundary) => {
                if let Some(start) = &cwd {
                    dirs.extend(expand_ancestors_from(start.clone(), boundary));
                }
            }
        }
    }
    dirs
}

/// Discover and read config files named `base_name`.
pub fn load_config_files(
    search_paths: &[SearchPath],
    base_name: &str,
    app_name: &str,
    mode: SearchMode,
) -> Result<Vec<(PathBuf, String)>, CommandError> {
    let dirs = expand_search_paths(search_paths, app_name);
    load_from_dirs(&dirs, base_name, mode)
}

pub(crate) fn load_from_dirs(
    dirs: &[PathBuf],
    base_name: &str,
    mode: SearchMode,
) -> Result<Vec<(PathBuf, String)>, CommandError> {
    match mode {
        SearchMode::Merge => {
            let mut results = Vec::new();
            for dir in dirs {
                results.extend(find_in_dir(dir, base_name)?);
            }
            Ok(results)
        }
        SearchMode::FirstMatch => {
            for dir in dirs.iter().rev() {
                if let Some(found) = find_in_dir(dir, base_name)? {
                    return Ok(vec![found]);
                }
            }
            Ok(vec![])
        }
    }
}

/// Read a config file named explicitly by the user. It must exist.
pub fn load_explicit(path: &Path) -> Result<(PathBuf, String), CommandError> {
    let content = std::fs::read_to_string(path).map_err(|e| CommandError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "loaded explicit config file");
    Ok((path.to_path_buf(), content))
}

fn find_in_dir(dir: &Path, base_name: &str) -> Result<Option<(PathBuf, String)>, CommandError> {
    let candidates: Vec<PathBuf> = if Format::from_path(Path::new(base_name)).is_some() {
        vec![dir.join(base_name)]
    } else {
        Format::EXTENSIONS
            .iter()
            .map(|(ext, _)| dir.join(format!("{base_name}.{ext}")))
            .collect()
    };

    for file_path in candidates {
        match std::fs::read_to_string(&file_path) {
            Ok(content) => {
                debug!(path = %file_path.display(), "found config file");
                return Ok(Some((file_path, content)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(CommandError::IoError {
                    path: file_path,
                    source: e,
                });
            }
        }
    }
    Ok(None)
}
