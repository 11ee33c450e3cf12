//! sqlplugin CLI Entry Point
//!
//! Subcommands:
//! - `tables` - List table names
//! - `schema` - Column metadata for one table
//! - `query` - Run SQL and print CSV
//! - `wrap` - Word-wrap text
//! - `functions` - Print the function descriptions as JSON
//! - `init` - Write a config file
//! - `mcp` - MCP server mode (hidden, for AI agent integration)
//!
//! Logs go to stdout next to the results, except in `mcp` mode where stdout
//! carries JSON-RPC and logs go to stderr.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};

use sqlplugin::{
    config, mcp, resolve_config, word_wrap, ConfigLocation, PluginConfig, SqlPlugin,
    SqliteEngine, DEFAULT_DATABASE,
};

/// sqlplugin - SQL query functions for AI planners
#[derive(Parser)]
#[command(name = "sqlplugin")]
#[command(about = "Query a SQLite database as CSV, the way an AI planner plugin does")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides SQLPLUGIN_DATABASE and config files)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the table names in the database
    Tables,

    /// Show column metadata for a table
    Schema {
        /// Table name, interpolated into the query unescaped
        table: String,
    },

    /// Run a SQL query and print the result as CSV
    Query {
        /// SQL text, executed verbatim
        sql: String,
    },

    /// Word-wrap text read from the argument or stdin
    Wrap {
        /// Text to wrap (stdin when omitted)
        text: Option<String>,

        /// Maximum line length (defaults to the configured wrap width)
        #[arg(long)]
        width: Option<usize>,
    },

    /// Print the callable function descriptions as JSON
    Functions,

    /// Write a config file
    Init {
        /// Save to the global config instead of `.sqlplugin/config.json`
        #[arg(long)]
        global: bool,
    },

    /// Start MCP server (hidden from help, for AI agent integration)
    #[command(hide = true)]
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let target = if matches!(cli.command, Commands::Mcp) { Target::Stderr } else { Target::Stdout };
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).target(target).init();

    let database = cli.database;
    match cli.command {
        Commands::Tables => print_result(&load_plugin(database)?.list_tables().await),
        Commands::Schema { table } => {
            print_result(&load_plugin(database)?.get_table_schema(&table).await);
        }
        Commands::Query { sql } => print_result(&load_plugin(database)?.run_query(&sql).await),
        Commands::Wrap { text, width } => {
            let width = match width {
                Some(width) => width,
                None => resolve_config(database)?.wrap_width,
            };
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
                    buf
                }
            };
            print!("{}", word_wrap(&text, width));
        }
        Commands::Functions => {
            let functions = SqlPlugin::<SqliteEngine>::functions();
            println!("{}", serde_json::to_string_pretty(&functions)?);
        }
        Commands::Init { global } => init(database, global)?,
        Commands::Mcp => mcp::serve(&load_plugin(database)?).await?,
    }

    Ok(())
}

fn load_plugin(database: Option<PathBuf>) -> anyhow::Result<SqlPlugin> {
    let config = resolve_config(database).context("Failed to resolve configuration")?;
    log::debug!("using database {}", config.database.display());
    Ok(SqlPlugin::new(config.database))
}

fn print_result(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

fn init(database: Option<PathBuf>, global: bool) -> anyhow::Result<()> {
    let location = if global { ConfigLocation::Global } else { ConfigLocation::Local };
    let path = location.path()?;

    let database = match database {
        Some(database) => database,
        None => dialoguer::Input::<String>::new()
            .with_prompt("SQLite database file")
            .default(DEFAULT_DATABASE.to_string())
            .interact_text()
            .map(PathBuf::from)?,
    };

    let existing = config::load_config(&path)?.unwrap_or_default();
    let updated = PluginConfig { database, ..existing };
    config::save_config(&path, &updated)?;

    println!("Saved {} (database: {})", path.display(), updated.database.display());
    Ok(())
}
