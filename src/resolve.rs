//! Core resolution pipeline: pick each flag's value from the highest-priority
//! layer that has one, then build a typed config.
//!
//! Operates on pre-loaded data ([`ResolveInput`]) with no I/O, so the whole
//! precedence chain is testable with synthetic inputs. Per flag, highest
//! first:
//!
//! 1. an explicit command-line value
//! 2. the bound environment variable
//! 3. the config files (later files override earlier ones)
//! 4. the compiled-in default
//!
//! The resolved values are then laid over the serialized default instance,
//! keyed by field name, and deserialized into a fresh `T`. Fields without a
//! flag keep their default.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::debug;

use crate::cli::CONFIG_FLAG;
use crate::descriptor::FlagDescriptor;
use crate::env;
use crate::error::CommandError;
use crate::file;
use crate::merge::FileLayer;
use crate::validate;

/// All pre-loaded data needed to resolve a command's flags.
#[derive(Debug, Default)]
pub struct ResolveInput {
    /// Config file contents in precedence order: first = lowest priority.
    pub files: Vec<(PathBuf, String)>,
    /// Raw environment variable pairs.
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"APP"`). `None` means no env binding.
    pub env_prefix: Option<String>,
    /// Values given explicitly on the command line, keyed by flag name.
    pub cli: Table,
    /// Whether to reject config-file keys that are not flag names.
    pub strict: bool,
}

/// The layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Default,
    File,
    Env,
    Flag,
}

/// One flag's winning value and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFlag {
    pub name: String,
    pub field: &'static str,
    pub value: Value,
    pub source: Source,
}

/// Resolve every descriptor through the precedence chain.
pub fn resolve_flags(
    descriptors: &[FlagDescriptor],
    input: ResolveInput,
) -> Result<Vec<ResolvedFlag>, CommandError> {
    let known: HashSet<&str> = descriptors
        .iter()
        .map(|d| d.name.as_str())
        .chain([CONFIG_FLAG])
        .collect();

    let mut files = FileLayer::new();
    for (path, content) in &input.files {
        let table = file::parse_file(path, content)?;
        if input.strict {
            validate::validate_unknown_keys(&table, &known, path, content)?;
        }
        files.overlay(path, table);
    }

    let env_table = match &input.env_prefix {
        Some(prefix) => env::env_to_table(prefix, descriptors, input.env_vars)?,
        None => Table::new(),
    };

    descriptors
        .iter()
        .map(|d| {
            let (value, source) = if let Some(v) = input.cli.get(&d.name) {
                (v.clone(), Source::Flag)
            } else if let Some(v) = env_table.get(&d.name) {
                (v.clone(), Source::Env)
            } else if let Some((v, path)) = files.get(&d.name) {
                let coerced = d.kind.coerce(v).map_err(|reason| CommandError::InvalidValue {
                    key: format!("{} (in {})", d.name, path.display()),
                    reason,
                })?;
                (coerced, Source::File)
            } else {
                (d.default.clone(), Source::Default)
            };

            debug!(flag = %d.name, ?source, "resolved flag");
            Ok(ResolvedFlag {
                name: d.name.clone(),
                field: d.field,
                value,
                source,
            })
        })
        .collect()
}

/// Lay resolved values over the defaults and deserialize a fresh `T`.
///
/// A value the field type can't hold (`--port 70000` on a `u16`) is
/// reported under the name of the flag that supplied it.
pub fn into_config<T: DeserializeOwned>(
    defaults: &Table,
    resolved: &[ResolvedFlag],
) -> Result<T, CommandError> {
    build::<T>(overlay(defaults, resolved)).map_err(|reason| {
        let key = resolved
            .iter()
            .filter(|flag| flag.source != Source::Default)
            .find(|flag| build::<T>(overlay(defaults, std::slice::from_ref(*flag))).is_err())
            .map_or_else(|| "<resolved>".to_string(), |flag| flag.name.clone());
        CommandError::InvalidValue { key, reason }
    })
}

fn overlay(defaults: &Table, resolved: &[ResolvedFlag]) -> Table {
    let mut merged = defaults.clone();
    for flag in resolved {
        merged.insert(flag.field.to_string(), flag.value.clone());
    }
    merged
}

fn build<T: DeserializeOwned>(table: Table) -> Result<T, String> {
    Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| e.to_string())
}

/// Resolve `descriptors` from `input` and build a `T` in one step.
pub fn resolve<T: DeserializeOwned>(
    defaults: &Table,
    descriptors: &[FlagDescriptor],
    input: ResolveInput,
) -> Result<T, CommandError> {
    let resolved = resolve_flags(descriptors, input)?;
    into_config(defaults, &resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{build_descriptors, defaults_table};
    use crate::fixtures::test::{PortArgs, ServeArgs};

    struct Layers {
        flag: Option<i64>,
        env: Option<&'static str>,
        file: Option<i64>,
    }

    fn resolve_port(layers: Layers) -> (i32, Source) {
        let defaults = PortArgs { port: 8080 };
        let descriptors = build_descriptors(Some(&defaults)).unwrap();
        let table = defaults_table(Some(&defaults)).unwrap();

        let mut cli = Table::new();
        if let Some(port) = layers.flag {
            cli.insert("port".into(), Value::Integer(port));
        }
        let input = ResolveInput {
            files: layers
                .file
                .map(|port| vec![("app.toml".into(), format!("port = {port}\n"))])
                .unwrap_or_default(),
            env_vars: layers
                .env
                .map(|port| vec![("APP_PORT".to_string(), port.to_string())])
                .unwrap_or_default(),
            env_prefix: Some("APP".into()),
            cli,
            strict: true,
        };

        let resolved = resolve_flags(&descriptors, input).unwrap();
        let source = resolved[0].source;
        let config: PortArgs = into_config(&table, &resolved).unwrap();
        (config.port, source)
    }

    #[test]
    fn precedence_for_every_source_combination() {
        let flag = [None, Some(7000)];
        let env = [None, Some("9000")];
        let file = [None, Some(6000)];

        for f in flag {
            for e in env {
                for c in file {
                    let (port, source) = resolve_port(Layers {
                        flag: f,
                        env: e,
                        file: c,
                    });
                    let expected = match (f, e, c) {
                        (Some(_), _, _) => (7000, Source::Flag),
                        (None, Some(_), _) => (9000, Source::Env),
                        (None, None, Some(_)) => (6000, Source::File),
                        (None, None, None) => (8080, Source::Default),
                    };
                    assert_eq!((port, source), expected, "flag={f:?} env={e:?} file={c:?}");
                }
            }
        }
    }

    #[test]
    fn removing_layers_falls_through() {
        let all = resolve_port(Layers {
            flag: Some(7000),
            env: Some("9000"),
            file: None,
        });
        assert_eq!(all.0, 7000);
        let no_flag = resolve_port(Layers {
            flag: None,
            env: Some("9000"),
            file: None,
        });
        assert_eq!(no_flag.0, 9000);
        let defaults_only = resolve_port(Layers {
            flag: None,
            env: None,
            file: None,
        });
        assert_eq!(defaults_only.0, 8080);
    }

    fn serve_inputs() -> (Table, Vec<FlagDescriptor>) {
        let descriptors = build_descriptors::<ServeArgs>(None).unwrap();
        let table = defaults_table::<ServeArgs>(None).unwrap();
        (table, descriptors)
    }

    #[test]
    fn defaults_only() {
        let (table, descriptors) = serve_inputs();
        let config: ServeArgs = resolve(&table, &descriptors, ResolveInput::default()).unwrap();
        assert_eq!(config, ServeArgs::default());
    }

    #[test]
    fn sparse_layers_combine() {
        let (table, descriptors) = serve_inputs();
        let mut cli = Table::new();
        cli.insert("verbose".into(), Value::Boolean(true));
        let input = ResolveInput {
            files: vec![(
                "serve.yaml".into(),
                "host: filehost\ntags: [a, b]\n".into(),
            )],
            env_vars: vec![("SERVE_PORT".into(), "4000".into())],
            env_prefix: Some("SERVE".into()),
            cli,
            strict: true,
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.host, "filehost");
        assert_eq!(config.port, 4000);
        assert!(config.verbose);
        assert_eq!(config.tags, vec!["a", "b"]);
        assert_eq!(config.internal, "kept");
    }

    #[test]
    fn later_file_overrides_earlier() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![
                ("global.toml".into(), "port = 1000\nhost = \"global\"\n".into()),
                ("local.json".into(), r#"{"port": 2000}"#.into()),
            ],
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.port, 2000);
        assert_eq!(config.host, "global");
    }

    #[test]
    fn env_ignored_without_prefix() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            env_vars: vec![("_PORT".into(), "1".into()), ("PORT".into(), "1".into())],
            env_prefix: None,
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn file_values_coerced_by_kind() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![(
                "serve.json".into(),
                r#"{"port": "9100", "ratio": 1, "ids": "3,4"}"#.into(),
            )],
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.ratio, 1.0);
        assert_eq!(config.ids, vec![3, 4]);
    }

    #[test]
    fn bad_file_value_names_flag_and_file() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![("serve.toml".into(), "port = \"eighty\"\n".into())],
            ..ResolveInput::default()
        };
        let err = resolve::<ServeArgs>(&table, &descriptors, input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("port"));
        assert!(msg.contains("serve.toml"));
    }

    #[test]
    fn out_of_range_value_rejected() {
        let (table, descriptors) = serve_inputs();
        let mut cli = Table::new();
        cli.insert("port".into(), Value::Integer(70000));
        let input = ResolveInput {
            cli,
            ..ResolveInput::default()
        };
        let err = resolve::<ServeArgs>(&table, &descriptors, input).unwrap_err();
        match err {
            CommandError::InvalidValue { key, .. } => assert_eq!(key, "port"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_env_value_names_flag() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            env_vars: vec![
                ("APP_HOST".into(), "0.0.0.0".into()),
                ("APP_PORT".into(), "-1".into()),
            ],
            env_prefix: Some("APP".into()),
            ..ResolveInput::default()
        };
        let err = resolve::<ServeArgs>(&table, &descriptors, input).unwrap_err();
        assert!(matches!(err, CommandError::InvalidValue { key, .. } if key == "port"));
    }

    #[test]
    fn strict_rejects_unknown_key() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![("bad.toml".into(), "typo = 1\n".into())],
            strict: true,
            ..ResolveInput::default()
        };
        let err = resolve::<ServeArgs>(&table, &descriptors, input).unwrap_err();
        assert!(matches!(err, CommandError::UnknownKey { ref key, .. } if key == "typo"));
    }

    #[test]
    fn strict_allows_config_key() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![("ok.toml".into(), "config = \"x\"\nport = 1\n".into())],
            strict: true,
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.port, 1);
    }

    #[test]
    fn lenient_allows_unknown_key() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![("ok.toml".into(), "typo = 1\nport = 3000\n".into())],
            strict: false,
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn untagged_field_not_read_from_file() {
        let (table, descriptors) = serve_inputs();
        let input = ResolveInput {
            files: vec![("ok.toml".into(), "internal = \"changed\"\n".into())],
            strict: false,
            ..ResolveInput::default()
        };
        let config: ServeArgs = resolve(&table, &descriptors, input).unwrap();
        assert_eq!(config.internal, "kept");
    }
}
