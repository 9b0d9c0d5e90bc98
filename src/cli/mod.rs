// CLI module for operations run outside the request path

pub mod migrate;
pub mod sync_rollback;

use clap::{Parser, Subcommand};

/// Corelog CLI
#[derive(Parser)]
#[command(name = "corelog")]
#[command(about = "Audited document administration backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending migrations to the document and audit databases
    Migrate,

    /// Re-flag audit entries that a ROLLBACK entry names as reverted
    SyncRollbackStatus,
}

impl Cli {
    /// The subcommand to run, `serve` when none was given
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
