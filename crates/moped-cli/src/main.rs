#![forbid(unsafe_code)]

mod cmd;
mod http;
mod output;

use clap::{Parser, Subcommand};
use moped_core::{ConfigError, ErrorCode, FetchError, QueryError};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "moped: list-view GraphQL query assembler",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by MOPED_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Directory holding persisted column settings.
    #[arg(long, global = true, value_name = "DIR")]
    settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Config",
        about = "Check a list-view config",
        long_about = "Load a list-view config, validate it, and summarize its columns.",
        after_help = "EXAMPLES:\n    # Validate a config\n    moped validate projects.toml\n\n    # Emit machine-readable output\n    moped validate projects.toml --format json"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Print the GraphQL query for a view state",
        long_about = "Replay search, filter, sort and paging flags against a list view and print the assembled GraphQL document.",
        after_help = "EXAMPLES:\n    # Default query\n    moped query projects.toml\n\n    # Search and sort\n    moped query projects.toml --search signal --sort updated_at --desc\n\n    # Third page of 50\n    moped query projects.toml --limit 50 --page 2"
    )]
    Query(cmd::query::QueryArgs),

    #[command(
        next_help_heading = "Read",
        about = "Run a list-view query against the backend",
        long_about = "Assemble the query for a view state, post it to the GraphQL endpoint and print the returned page.",
        after_help = "EXAMPLES:\n    # Fetch the first page\n    MOPED_GRAPHQL_URL=https://hasura.example/v1/graphql moped fetch projects.toml\n\n    # Pass endpoint and token explicitly\n    moped fetch projects.toml --endpoint http://localhost:8080/v1/graphql --token $TOKEN"
    )]
    Fetch(cmd::fetch::FetchArgs),

    #[command(
        next_help_heading = "Settings",
        about = "Show or change column visibility",
        long_about = "Show which columns a list view displays, and hide or show columns. Changes persist across runs.",
        after_help = "EXAMPLES:\n    # List columns\n    moped columns projects.toml\n\n    # Hide a column\n    moped columns projects.toml --hide construction_cost\n\n    # Show everything again\n    moped columns projects.toml --reset"
    )]
    Columns(cmd::columns::ColumnsArgs),
}

/// Directives used when `MOPED_LOG` is unset.
const fn default_directives(verbose: bool, debug_env: bool) -> &'static str {
    if verbose || debug_env {
        "moped=debug,info"
    } else {
        "moped=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("MOPED_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_directives(verbose, env::var("DEBUG").is_ok()))
    });

    let format = env::var("MOPED_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Find the stable code for the first coded error in the chain.
fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<cmd::CodedError>() {
            Some(e.code)
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<QueryError>() {
            Some(e.code())
        } else {
            cause.downcast_ref::<FetchError>().map(FetchError::code)
        }
    })
}

fn to_cli_error(err: &anyhow::Error) -> CliError {
    let error = CliError::new(format!("{err:#}"));
    match error_code(err) {
        Some(code) => {
            debug!(%code, summary = code.message(), "command failed");
            error.with_code(code)
        }
        None => error,
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    let settings = cmd::settings_dir(cli.settings_dir.as_deref());
    debug!(?output, settings = %settings.display(), "starting");

    let result = match &cli.command {
        Commands::Validate(args) => cmd::validate::run_validate(args, output),
        Commands::Query(args) => cmd::query::run_query(args, output, &settings),
        Commands::Fetch(args) => cmd::fetch::run_fetch(args, output, &settings),
        Commands::Columns(args) => cmd::columns::run_columns(args, output, &settings),
    };

    if let Err(err) = result {
        if render_error(output, &to_cli_error(&err)).is_err() {
            eprintln!("error: {err:#}");
        }
        std::process::exit(1);
    }
}
