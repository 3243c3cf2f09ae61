use clap::{Parser, Subcommand};

/// Offline-first cache worker for progressive web apps.
#[derive(Parser, Debug)]
#[command(name = "petrel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Populate the static cache from the precache manifest.
    Install(InstallArgs),

    /// Install the current generation, then activate it and purge stale caches.
    Activate,

    /// Resolve a URL through the offline strategy and print the body.
    Resolve(ResolveArgs),

    /// Replay deferred requests for a sync tag.
    Sync(SyncArgs),

    /// Print the worker version and its cache labels.
    Version,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Activate immediately after install instead of waiting.
    #[arg(long, default_value_t = false)]
    pub skip_waiting: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// URL to resolve; relative paths resolve against the configured origin.
    pub url: String,

    /// Accept header to send, which also selects the offline fallback.
    #[arg(long)]
    pub accept: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Sync tag to fire.
    #[arg(long, default_value = "background-sync")]
    pub tag: String,

    /// URL to queue as a deferred POST before replay; repeatable.
    #[arg(long)]
    pub task: Vec<String>,
}
