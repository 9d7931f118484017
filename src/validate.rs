//! Strict-mode validation: detect unknown keys in config files.
//!
//! A key is known when it is the name of a flag on the command (or the
//! `config` path flag). Each unknown key is reported with its file path and a
//! best-effort line number.

use std::collections::HashSet;
use std::path::Path;

use toml::Table;

use crate::error::CommandError;

/// Validate that a parsed config file holds only `known` keys.
///
/// `content` is the raw file text, used for line numbers only.
pub fn validate_unknown_keys(
    table: &Table,
    known: &HashSet<&str>,
    path: &Path,
    content: &str,
) -> Result<(), CommandError> {
    let mut errors: Vec<CommandError> = table
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| CommandError::UnknownKey {
            key: key.clone(),
            path: path.to_path_buf(),
            line: find_key_line(content, key),
        })
        .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(CommandError::UnknownKeys(errors)),
    }
}

/// Find the 1-indexed line on which `key` is assigned, or 0 if not found.
///
/// Matches `key =` (TOML), `key:` (YAML) and `"key":` (JSON, quoted TOML and
/// YAML keys) at the start of a line, ignoring indentation.
fn find_key_line(content: &str, key: &str) -> usize {
    let quoted = format!("\"{key}\"");
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        let rest = trimmed
            .strip_prefix(quoted.as_str())
            .or_else(|| trimmed.strip_prefix(key));
        if let Some(rest) = rest
            && matches!(rest.trim_start().chars().next(), Some('=' | ':'))
        {
            return i + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::Format;

    fn known() -> HashSet<&'static str> {
        ["host", "port", "enable-https"].into_iter().collect()
    }

    fn check(format: Format, content: &str) -> Result<(), CommandError> {
        let table = format.parse(content).unwrap();
        validate_unknown_keys(&table, &known(), Path::new("app"), content)
    }

    #[test]
    fn known_keys_pass() {
        assert!(check(Format::Toml, "host = \"x\"\nenable-https = true\n").is_ok());
    }

    #[test]
    fn unknown_toml_key_has_line() {
        let err = check(Format::Toml, "host = \"x\"\n\ntypo = 1\n").unwrap_err();
        match err {
            CommandError::UnknownKey { key, line, .. } => {
                assert_eq!(key, "typo");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_yaml_key_has_line() {
        let err = check(Format::Yaml, "port: 1\nextra: 2\n").unwrap_err();
        assert!(matches!(err, CommandError::UnknownKey { line: 2, .. }));
    }

    #[test]
    fn unknown_json_key_has_line() {
        let err = check(Format::Json, "{\n  \"port\": 1,\n  \"extra\": 2\n}\n").unwrap_err();
        assert!(matches!(err, CommandError::UnknownKey { line: 3, .. }));
    }

    #[test]
    fn several_unknown_keys_collected() {
        let err = check(Format::Toml, "a = 1\nb = 2\n").unwrap_err();
        match err {
            CommandError::UnknownKeys(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prefix_of_longer_key_not_matched() {
        assert_eq!(find_key_line("hostname = 1\nhost = 2\n", "host"), 2);
    }

    #[test]
    fn missing_key_is_line_zero() {
        assert_eq!(find_key_line("port = 1\n", "host"), 0);
    }
}
