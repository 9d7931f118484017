//! Declarative command-line flags for Rust applications. Tag a struct's
//! fields, hand over a handler, and get a clap command whose flags also bind
//! to environment variables and config files.
//!
//! ```ignore
//! #[derive(Flags, Serialize, Deserialize, Default)]
//! struct ServeArgs {
//!     #[flag = "host,Address to bind"]
//!     host: String,
//!     #[flag = "port,Port to listen on"]
//!     port: u16,
//! }
//!
//! let serve = new_cmd(
//!     "serve",
//!     CommandSpec::new(|args: ServeArgs| run(args))
//!         .env_prefix("APP")
//!         .config_file("serve"),
//! )?;
//! serve.execute(std::env::args_os())?;
//! ```
//!
//! That command accepts `--host` and `--port`, reads `APP_HOST` and
//! `APP_PORT`, looks for `serve.toml` (or `.yaml`, `.yml`, `.json`) in the
//! platform config directory and the working directory, and calls `run` with
//! a fresh `ServeArgs` holding the winning values.
//!
//! # Tags
//!
//! `#[flag = "<name>,<help>"]` turns a field into `--<name>`. Only the first
//! comma splits, so help text may contain commas. Fields without the
//! attribute are left alone and keep their default value.
//!
//! Supported field types:
//!
//! | Field type | Flag kind |
//! |------------|-----------|
//! | `String` | String |
//! | `i8`..`i64`, `u8`..`u64`, `isize`, `usize` | Int |
//! | `f32`, `f64` | Float |
//! | `bool` | Bool |
//! | `Vec<String>` | StringList |
//! | `Vec<i64>` and other integer vectors | IntList |
//!
//! Anything else on a tagged field (nested structs, maps, `Option`) is
//! rejected with [`CommandError::UnsupportedFieldType`] when the command is
//! built.
//!
//! # Precedence
//!
//! For each flag, highest first:
//!
//! 1. a value typed on the command line
//! 2. the environment variable `<PREFIX>_<FLAG>` (upper-cased, `-` → `_`)
//! 3. config files, keyed by flag name (later search paths win)
//! 4. the default instance given to [`CommandSpec::defaults`], or
//!    `T::default()`
//!
//! A default shown in `--help` never counts as a command-line value, so it
//! does not hide the environment or config files.
//!
//! # Config files
//!
//! Setting [`CommandSpec::config_file`] registers `--config <PATH>` and
//! turns on discovery over [`SearchPath`]s. An explicit `--config` skips
//! discovery and must point at a readable file. With
//! [`CommandSpec::strict`], keys that are not flag names are rejected with
//! their file and line.
//!
//! # Subcommands
//!
//! Every built [`Cmd`] is a [`Runnable`]. Attach each one's
//! [`command`](Runnable::command) to a parent and route the parsed matches
//! with [`dispatch_subcommand`].

extern crate self as commandments;

pub mod error;
pub mod types;

mod cli;
mod command;
mod descriptor;
mod dispatch;
mod env;
mod file;
mod kind;
mod merge;
mod resolve;
mod schema;
mod tag;
mod validate;

#[cfg(test)]
mod fixtures;

pub use commandments_derive::Flags;

pub use cli::CONFIG_FLAG;
pub use command::{Cmd, CommandMeta, CommandSpec, must_cmd, new_cmd};
pub use descriptor::{FlagDescriptor, build_descriptors};
pub use dispatch::{Runnable, dispatch_subcommand};
pub use env::env_var_name;
pub use error::{BoxError, CommandError};
pub use file::Format;
pub use kind::FlagKind;
pub use schema::{FieldInfo, Flags};
pub use types::{Boundary, SearchMode, SearchPath};
