use std::collections::HashMap;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

/// Config-file values keyed by flag name, overlaid file by file.
///
/// Flag values are scalars or flat lists, so an overlay replaces a key's
/// value wholesale; it never merges inside it. Each entry remembers the file
/// it came from so coercion errors can point at it.
#[derive(Debug, Default)]
pub struct FileLayer {
    entries: HashMap<String, (Value, PathBuf)>,
}

impl FileLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `table` (read from `path`) on top of what is already here.
    pub fn overlay(&mut self, path: &Path, table: Table) {
        debug!(path = %path.display(), keys = table.len(), "overlaying config file");
        for (key, value) in table {
            self.entries.insert(key, (value, path.to_path_buf()));
        }
    }

    pub fn get(&self, key: &str) -> Option<(&Value, &Path)> {
        self.entries
            .get(key)
            .map(|(value, path)| (value, path.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn disjoint_keys_merge() {
        let mut layer = FileLayer::new();
        layer.overlay(Path::new("a.toml"), table(r#"host = "localhost""#));
        layer.overlay(Path::new("b.toml"), table("port = 3000"));
        assert_eq!(layer.get("host").unwrap().0.as_str(), Some("localhost"));
        assert_eq!(layer.get("port").unwrap().1, Path::new("b.toml"));
    }

    #[test]
    fn later_file_wins() {
        let mut layer = FileLayer::new();
        layer.overlay(Path::new("global.toml"), table("port = 8080"));
        layer.overlay(Path::new("local.toml"), table("port = 3000"));
        let (value, path) = layer.get("port").unwrap();
        assert_eq!(value.as_integer(), Some(3000));
        assert_eq!(path, Path::new("local.toml"));
    }

    #[test]
    fn lists_replaced_not_concatenated() {
        let mut layer = FileLayer::new();
        layer.overlay(Path::new("a.toml"), table(r#"tags = ["a", "b"]"#));
        layer.overlay(Path::new("b.toml"), table(r#"tags = ["c"]"#));
        let (value, _) = layer.get("tags").unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn empty_layer() {
        let layer = FileLayer::new();
        assert!(layer.get("port").is_none());
    }
}
