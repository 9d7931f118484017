//! Clap adapter: turn descriptors into `clap::Arg`s and read back the values
//! the user typed.
//!
//! Every flag is registered as a long option (`--name`) with the default
//! shown in help. Defaults are only for display: when reading matches, a
//! value counts only if its [`ValueSource`] is the command line, so the
//! environment and config files can still override compiled-in defaults.
//!
//! | Kind | Accepts |
//! |------|---------|
//! | String | `--host x`, `--host=x` |
//! | Int / Float | `--port 80`, `--offset -3` |
//! | Bool | `--verbose`, `--verbose=false` |
//! | StringList / IntList | `--tag a --tag b`, `--tag a,b` |

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use toml::{Table, Value};

use crate::descriptor::FlagDescriptor;
use crate::error::CommandError;
use crate::kind::FlagKind;

/// Name of the flag that points at an explicit config file.
pub const CONFIG_FLAG: &str = "config";

/// Build the clap argument for one descriptor.
pub fn flag_arg(descriptor: &FlagDescriptor) -> Arg {
    let arg = Arg::new(descriptor.name.clone())
        .long(descriptor.name.clone())
        .help(descriptor.help.clone());

    let arg = match descriptor.kind {
        FlagKind::String => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(String)),
        FlagKind::Int => arg
            .action(ArgAction::Set)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64)),
        FlagKind::Float => arg
            .action(ArgAction::Set)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(f64)),
        FlagKind::Bool => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(value_parser!(bool)),
        FlagKind::StringList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_parser(value_parser!(String)),
        FlagKind::IntList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64)),
    };

    let shown: Vec<String> = FlagKind::render(&descriptor.default)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if shown.is_empty() {
        arg
    } else {
        arg.default_values(shown)
    }
}

/// The `--config <PATH>` flag registered when config-file lookup is on.
pub fn config_arg() -> Arg {
    Arg::new(CONFIG_FLAG)
        .long(CONFIG_FLAG)
        .value_name("PATH")
        .help("Read configuration from this file instead of searching for one")
        .action(ArgAction::Set)
        .value_parser(value_parser!(String))
}

/// Register every descriptor on `command`, in order.
pub fn register(mut command: Command, descriptors: &[FlagDescriptor]) -> Command {
    for descriptor in descriptors {
        command = command.arg(flag_arg(descriptor));
    }
    command
}

/// Values the user typed on the command line, keyed by flag name.
///
/// Flags that `matches` does not define are skipped, as are defaults.
pub fn explicit_values(
    matches: &ArgMatches,
    descriptors: &[FlagDescriptor],
) -> Result<Table, CommandError> {
    let mut table = Table::new();
    for d in descriptors {
        // `value_source` asserts the id exists; foreign matches may not define it.
        if !matches.try_contains_id(&d.name).unwrap_or(false) {
            continue;
        }
        if matches.value_source(&d.name) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = read_value(matches, d)? {
            table.insert(d.name.clone(), value);
        }
    }
    Ok(table)
}

/// Explicit `--config` path, if one was typed.
///
/// Fails with [`CommandError::MissingConfigFlag`] when `matches` was not
/// produced by a command that defines the flag.
pub fn explicit_config_path(matches: &ArgMatches) -> Result<Option<String>, CommandError> {
    let path = matches
        .try_get_one::<String>(CONFIG_FLAG)
        .map_err(|_| CommandError::MissingConfigFlag)?;
    if matches.value_source(CONFIG_FLAG) != Some(ValueSource::CommandLine) {
        return Ok(None);
    }
    Ok(path.filter(|p| !p.is_empty()).cloned())
}

fn read_value(matches: &ArgMatches, d: &FlagDescriptor) -> Result<Option<Value>, CommandError> {
    let mismatch = |e: clap::parser::MatchesError| CommandError::InvalidValue {
        key: d.name.clone(),
        reason: e.to_string(),
    };
    let id = d.name.as_str();

    let value = match d.kind {
        FlagKind::String => matches
            .try_get_one::<String>(id)
            .map_err(mismatch)?
            .map(|s| Value::String(s.clone())),
        FlagKind::Int => matches
            .try_get_one::<i64>(id)
            .map_err(mismatch)?
            .map(|i| Value::Integer(*i)),
        FlagKind::Float => matches
            .try_get_one::<f64>(id)
            .map_err(mismatch)?
            .map(|f| Value::Float(*f)),
        FlagKind::Bool => matches
            .try_get_one::<bool>(id)
            .map_err(mismatch)?
            .map(|b| Value::Boolean(*b)),
        FlagKind::StringList => matches
            .try_get_many::<String>(id)
            .map_err(mismatch)?
            .map(|values| Value::Array(values.map(|s| Value::String(s.clone())).collect())),
        FlagKind::IntList => matches
            .try_get_many::<i64>(id)
            .map_err(mismatch)?
            .map(|values| Value::Array(values.map(|i| Value::Integer(*i)).collect())),
    };
    Ok(value)
}
