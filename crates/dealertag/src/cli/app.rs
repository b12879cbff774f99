use clap::{Parser, Subcommand};

use super::commands::{clean::CleanArgs, replay::ReplayArgs, schema::SchemaArgs};

#[derive(Debug, Parser)]
#[command(
    name = "dealertag",
    version,
    about = "Dealer-site analytics event pipeline for Tealium"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize and strip an event payload the way the dispatcher does.
    Clean(CleanArgs),
    /// Run a recorded page session against an in-process SDK.
    Replay(ReplayArgs),
    /// Print the JSON Schema of replay scenarios.
    Schema(SchemaArgs),
}
