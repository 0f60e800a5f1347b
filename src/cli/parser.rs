use crate::input::InputFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for puzzlesync
/// CLI application to reconcile crossword stats and solving sessions with SQLite
#[derive(Parser)]
#[command(
    name = "puzzlesync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reconcile crossword solving stats into SQLite and track solving sessions",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "limit", help = "Only show the newest N rows")]
        limit: Option<usize>,
    },

    /// Reconcile a batch of puzzle records into the database
    Sync {
        #[arg(long, value_name = "FILE", help = "CSV or JSON file with puzzle records")]
        file: String,

        #[arg(long, value_enum, help = "Input format (default: from file extension)")]
        format: Option<InputFormat>,

        #[arg(long = "dry-run", help = "Run the batch and roll everything back")]
        dry_run: bool,

        #[arg(long, short, help = "Print one line per record")]
        verbose: bool,
    },

    /// List stored puzzles, or one puzzle with its sessions
    List {
        #[arg(long = "puzzle", help = "Show state and sessions of one puzzle")]
        puzzle: Option<i64>,
    },
}
