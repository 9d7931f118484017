//! Run a command's handler against freshly resolved configuration.

use std::path::{Path, PathBuf};

use clap::{ArgMatches, Command};
use serde::de::DeserializeOwned;
use toml::Table;
use tracing::debug;

use crate::cli;
use crate::descriptor::FlagDescriptor;
use crate::error::{BoxError, CommandError};
use crate::file;
use crate::resolve::{self, ResolveInput};
use crate::types::{SearchMode, SearchPath};

pub(crate) type Handler<T> = Box<dyn Fn(T) -> Result<(), BoxError>>;

/// Where a command looks for its config file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConfigLookup {
    pub base_name: String,
    pub search_paths: Vec<SearchPath>,
    pub mode: SearchMode,
}

/// Everything a command needs at execution time, minus the clap node.
pub(crate) struct Dispatcher<T> {
    pub name: String,
    pub descriptors: Vec<FlagDescriptor>,
    pub defaults: Table,
    pub env_prefix: Option<String>,
    pub config: Option<ConfigLookup>,
    pub strict: bool,
    pub handler: Handler<T>,
}

impl<T: DeserializeOwned> Dispatcher<T> {
    /// Resolve a fresh `T` from `matches`, `env_vars` and config files, then
    /// call the handler once. Its error comes back as
    /// [`CommandError::Handler`], untouched.
    pub fn dispatch(
        &self,
        matches: &ArgMatches,
        env_vars: Vec<(String, String)>,
    ) -> Result<(), CommandError> {
        let cli = cli::explicit_values(matches, &self.descriptors)?;
        let files = self.config_files(matches)?;

        let input = ResolveInput {
            files,
            env_vars,
            env_prefix: self.env_prefix.clone(),
            cli,
            strict: self.strict,
        };
        let config: T = resolve::resolve(&self.defaults, &self.descriptors, input)?;

        debug!(command = %self.name, "invoking handler");
        (self.handler)(config).map_err(CommandError::Handler)
    }

    fn config_files(&self, matches: &ArgMatches) -> Result<Vec<(PathBuf, String)>, CommandError> {
        let Some(lookup) = &self.config else {
            return Ok(vec![]);
        };
        match cli::explicit_config_path(matches)? {
            Some(path) => Ok(vec![file::load_explicit(Path::new(&path))?]),
            None => file::load_config_files(
                &lookup.search_paths,
                &lookup.base_name,
                &self.name,
                lookup.mode,
            ),
        }
    }
}

/// A typed command with its configuration type erased, so commands over
/// different structs can sit side by side under one parent.
pub trait Runnable {
    /// The command's name, as matched by clap.
    fn name(&self) -> &str;

    /// A copy of the command's clap node, for attaching to a parent.
    fn command(&self) -> Command;

    /// Resolve configuration from `matches` and run the handler.
    fn dispatch(&self, matches: &ArgMatches) -> Result<(), CommandError>;
}

/// Dispatch the subcommand selected in `matches` to the matching runnable.
///
/// Returns `None` when no subcommand was selected or none of `commands` has
/// its name.
///
/// ```ignore
/// let serve = new_cmd("serve", serve_spec)?;
/// let migrate = new_cmd("migrate", migrate_spec)?;
/// let commands: [&dyn Runnable; 2] = [&serve, &migrate];
///
/// let root = clap::Command::new("app").subcommands(commands.iter().map(|c| c.command()));
/// let matches = root.get_matches();
/// dispatch_subcommand(&matches, &commands).transpose()?;
/// ```
pub fn dispatch_subcommand(
    matches: &ArgMatches,
    commands: &[&dyn Runnable],
) -> Option<Result<(), CommandError>> {
    let (name, sub_matches) = matches.subcommand()?;
    let runnable = commands.iter().find(|c| c.name() == name)?;
    Some(runnable.dispatch(sub_matches))
}
