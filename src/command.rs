//! Build a clap command from a [`Flags`] struct and a handler.
//!
//! ```ignore
//! let serve = CommandSpec::new(|args: ServeArgs| run_server(args))
//!     .short("Run the server")
//!     .defaults(ServeArgs::default())
//!     .env_prefix("APP")
//!     .config_file("serve")
//!     .build("serve")?;
//!
//! serve.execute(std::env::args_os())?;
//! ```

use std::collections::HashSet;
use std::ffi::OsString;

use clap::{ArgMatches, Command};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cli::{self, CONFIG_FLAG};
use crate::descriptor::{self, FlagDescriptor, TaggedField};
use crate::dispatch::{ConfigLookup, Dispatcher, Handler, Runnable};
use crate::env;
use crate::error::{BoxError, CommandError};
use crate::kind::FlagKind;
use crate::schema::Flags;
use crate::types::{SearchMode, SearchPath};

/// Descriptive and lookup settings for a command. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandMeta {
    /// One-line description shown in the command list.
    pub short: Option<String>,
    /// Longer description shown by `--help`.
    pub long: Option<String>,
    /// Base name of the config file to look for, e.g. `"serve"` for
    /// `serve.toml`. Setting it also registers `--config <PATH>`.
    pub config_file: Option<String>,
    /// Prefix for bound environment variables. `None` disables env binding.
    pub env_prefix: Option<String>,
    /// Directories to search, priority-ascending. Defaults to
    /// `[Platform, Cwd]`.
    pub search_paths: Option<Vec<SearchPath>>,
    pub search_mode: SearchMode,
    /// Reject config-file keys that are not flag names.
    pub strict: bool,
}

/// Builder for a typed command. Setters may be called in any order; a
/// repeated setter replaces the earlier value.
pub struct CommandSpec<T> {
    defaults: Option<T>,
    meta: CommandMeta,
    handler: Handler<T>,
}

impl<T> CommandSpec<T>
where
    T: Flags + Serialize + DeserializeOwned + Default + 'static,
{
    /// Start a spec around the handler that runs on each execution.
    pub fn new<F, E>(handler: F) -> Self
    where
        F: Fn(T) -> Result<(), E> + 'static,
        E: Into<BoxError>,
    {
        Self {
            defaults: None,
            meta: CommandMeta::default(),
            handler: Box::new(move |config| handler(config).map_err(Into::into)),
        }
    }

    /// Instance whose field values become the flag defaults
    /// (default: `T::default()`).
    pub fn defaults(mut self, defaults: T) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn short(mut self, text: &str) -> Self {
        self.meta.short = Some(text.to_string());
        self
    }

    pub fn long(mut self, text: &str) -> Self {
        self.meta.long = Some(text.to_string());
        self
    }

    /// Look for `<base_name>.{toml,yaml,yml,json}` in the search paths.
    /// A base name that already carries one of those extensions is used as is.
    pub fn config_file(mut self, base_name: &str) -> Self {
        self.meta.config_file = Some(base_name.to_string()).filter(|b| !b.is_empty());
        self
    }

    /// Bind each flag to `<PREFIX>_<FLAG>`. An empty prefix disables binding.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.meta.env_prefix = Some(prefix.to_string()).filter(|p| !p.is_empty());
        self
    }

    /// Replace the default search paths. See [`SearchPath`].
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.meta.search_paths = Some(paths);
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.meta.search_mode = mode;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    pub fn strict(mut self, strict: bool) -> Self {
        self.meta.strict = strict;
        self
    }

    /// Replace all metadata at once.
    pub fn meta(mut self, meta: CommandMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Build the command. Equivalent to [`new_cmd`].
    pub fn build(self, name: &str) -> Result<Cmd<T>, CommandError> {
        let fields = descriptor::tagged_fields::<T>()?;
        check_names(&fields)?;
        let defaults = descriptor::defaults_table(self.defaults.as_ref())?;
        let descriptors = descriptor::attach_defaults(fields, &defaults);

        let CommandMeta {
            short,
            long,
            config_file,
            env_prefix,
            search_paths,
            search_mode,
            strict,
        } = self.meta;

        let config = config_file.map(|base_name| ConfigLookup {
            base_name,
            search_paths: search_paths.unwrap_or_else(default_search_paths),
            mode: search_mode,
        });

        let mut command = Command::new(name.to_string());
        if let Some(short) = short {
            command = command.about(short);
        }
        if let Some(long) = long {
            command = command.long_about(long);
        }
        command = cli::register(command, &descriptors);
        if config.is_some() && !descriptors.iter().any(|d| d.name == CONFIG_FLAG) {
            command = command.arg(cli::config_arg());
        }

        debug!(
            command = name,
            flags = descriptors.len(),
            env_prefix = ?env_prefix,
            config_file = ?config.as_ref().map(|c| &c.base_name),
            "built command"
        );

        Ok(Cmd {
            command,
            dispatcher: Dispatcher {
                name: name.to_string(),
                descriptors,
                defaults,
                env_prefix,
                config,
                strict,
                handler: self.handler,
            },
        })
    }
}

fn default_search_paths() -> Vec<SearchPath> {
    vec![SearchPath::Platform, SearchPath::Cwd]
}

/// Flag names must be unique, must not shadow `--help`, and may only reuse
/// `--config` for a string field.
fn check_names(fields: &[TaggedField]) -> Result<(), CommandError> {
    let mut seen = HashSet::new();
    for f in fields {
        let name = f.tag.name.as_str();
        let clash = name == "help"
            || (name == CONFIG_FLAG && f.kind != FlagKind::String)
            || !seen.insert(name);
        if clash {
            return Err(CommandError::DuplicateFlagName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Build a command named `name` from `spec`.
///
/// Fails on the first malformed tag, unsupported field type or duplicate
/// flag name, before any clap state is created.
pub fn new_cmd<T>(name: &str, spec: CommandSpec<T>) -> Result<Cmd<T>, CommandError>
where
    T: Flags + Serialize + DeserializeOwned + Default + 'static,
{
    spec.build(name)
}

/// Like [`new_cmd`], but panics on error. For commands built from static
/// definitions at startup.
pub fn must_cmd<T>(name: &str, spec: CommandSpec<T>) -> Cmd<T>
where
    T: Flags + Serialize + DeserializeOwned + Default + 'static,
{
    match new_cmd(name, spec) {
        Ok(cmd) => cmd,
        Err(e) => panic!("{e}"),
    }
}

/// A built command: the clap node plus everything needed to run its handler.
pub struct Cmd<T> {
    command: Command,
    dispatcher: Dispatcher<T>,
}

impl<T: DeserializeOwned> Cmd<T> {
    /// The clap command, with one long flag per tagged field.
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn descriptors(&self) -> &[FlagDescriptor] {
        &self.dispatcher.descriptors
    }

    /// Parse `args` (program name first) and run the handler.
    ///
    /// Help, version and parse failures come back as [`CommandError::Cli`];
    /// call `exit()` on the inner error to print them the clap way.
    pub fn execute<I, A>(&self, args: I) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString> + Clone,
    {
        self.execute_with_env(args, env::process_vars())
    }

    /// [`execute`](Self::execute) with an explicit environment.
    pub fn execute_with_env<I, A>(
        &self,
        args: I,
        env_vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(args)?;
        self.dispatch_with_env(&matches, env_vars)
    }

    /// Run the handler against matches already parsed by a parent command.
    pub fn dispatch(&self, matches: &ArgMatches) -> Result<(), CommandError> {
        self.dispatch_with_env(matches, env::process_vars())
    }

    /// [`dispatch`](Self::dispatch) with an explicit environment.
    pub fn dispatch_with_env(
        &self,
        matches: &ArgMatches,
        env_vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), CommandError> {
        self.dispatcher
            .dispatch(matches, env_vars.into_iter().collect())
    }
}

impl<T: DeserializeOwned> Runnable for Cmd<T> {
    fn name(&self) -> &str {
        &self.dispatcher.name
    }

    fn command(&self) -> Command {
        self.command.clone()
    }

    fn dispatch(&self, matches: &ArgMatches) -> Result<(), CommandError> {
        Cmd::dispatch(self, matches)
    }
}
