//! Command-line interface definitions.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cadastro",
    about = "Account-management service with a role-gated HTTP API",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Create a default config file with a generated signing key
    Init,
}
