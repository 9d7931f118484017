//! # commandments demo
//!
//! A toy two-command CLI that shows how tagged structs become flags bound to
//! the environment and config files. It doesn't serve or migrate anything;
//! the handlers print the configuration they were given.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example serve -- serve --port 9000
//! cargo run --example serve -- migrate --dry-run
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature | How to exercise it |
//! |---------|--------------------|
//! | Compiled defaults | `cargo run --example serve -- serve` |
//! | Flag override | `cargo run --example serve -- serve --host 0.0.0.0` |
//! | Env var override | `DEMO_PORT=9999 cargo run --example serve -- serve` |
//! | Config file (cwd) | Create `serve.toml` with `port = 7000`, then run `serve` |
//! | Explicit config file | `cargo run --example serve -- serve --config other.yaml` |
//! | List flags | `cargo run --example serve -- serve --tags a,b --tags c` |
//! | Handler errors | `cargo run --example serve -- migrate --steps 0` |
//! | Resolution logs | `RUST_LOG=commandments=debug cargo run --example serve -- serve` |

use std::process::ExitCode;

use clap::Command;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use commandments::{CommandError, CommandSpec, Flags, Runnable, dispatch_subcommand, new_cmd};

#[derive(Flags, Serialize, Deserialize, Debug)]
struct ServeArgs {
    #[flag = "host,Address to bind"]
    host: String,

    #[flag = "port,Port to listen on"]
    port: u16,

    #[flag = "tags,Tags attached to every response"]
    tags: Vec<String>,

    #[flag = "verbose,Log every request"]
    verbose: bool,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            tags: vec![],
            verbose: false,
        }
    }
}

#[derive(Flags, Serialize, Deserialize, Debug, Default)]
struct MigrateArgs {
    #[flag = "database-url,Connection string, e.g. postgres://localhost/app"]
    database_url: String,

    #[flag = "steps,How many migrations to apply"]
    steps: u32,

    #[flag = "dry-run,Print the plan without applying it"]
    dry_run: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("nothing to do: --steps must be at least 1")]
struct NoSteps;

fn serve(args: ServeArgs) -> Result<(), CommandError> {
    println!("serving on {}:{}", args.host, args.port);
    if !args.tags.is_empty() {
        println!("tags: {}", args.tags.join(", "));
    }
    if args.verbose {
        println!("{args:#?}");
    }
    Ok(())
}

fn migrate(args: MigrateArgs) -> Result<(), NoSteps> {
    if args.steps == 0 {
        return Err(NoSteps);
    }
    let verb = if args.dry_run { "would apply" } else { "applying" };
    println!("{verb} {} migration(s) to {:?}", args.steps, args.database_url);
    Ok(())
}

fn run() -> Result<(), CommandError> {
    let serve = new_cmd(
        "serve",
        CommandSpec::new(serve)
            .short("Run the demo server")
            .env_prefix("DEMO")
            .config_file("serve"),
    )?;
    let migrate = new_cmd(
        "migrate",
        CommandSpec::new(migrate)
            .short("Apply database migrations")
            .defaults(MigrateArgs {
                database_url: "postgres://localhost/demo".into(),
                steps: 1,
                dry_run: false,
            })
            .env_prefix("DEMO"),
    )?;
    let commands: [&dyn Runnable; 2] = [&serve, &migrate];

    let root = Command::new("demo")
        .about("commandments demo")
        .subcommand_required(true)
        .subcommands(commands.iter().map(|c| c.command()));
    let matches = root.try_get_matches()?;

    dispatch_subcommand(&matches, &commands).unwrap_or(Ok(()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
