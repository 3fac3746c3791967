use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sitesync",
    about = "Incremental static-site deployment over FTP",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pull, build, and push the changed files to the remote server
    Deploy,
    /// Show what a deploy would do, without touching the remote
    Plan,
}
