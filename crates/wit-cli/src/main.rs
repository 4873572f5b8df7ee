//! wit CLI - Work item tracking from the command line.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wit_core::SpaceId;

#[derive(Parser)]
#[command(name = "wit")]
#[command(author, version, about = "Work item tracking CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Workspace path (defaults to current directory)
    #[arg(long, short = 'C', global = true)]
    path: Option<std::path::PathBuf>,

    /// Space to operate in (defaults to the workspace's space)
    #[arg(long, global = true, env = "WIT_SPACE")]
    space: Option<SpaceId>,

    /// Identity recorded on saves
    #[arg(long, global = true, env = "WIT_ACTOR", default_value = "local")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new workspace
    Init {
        /// Workspace name
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a new work item
    New {
        /// Title of the work item
        title: String,

        /// Initial state
        #[arg(long, short = 's')]
        state: Option<String>,

        /// Assignees (can be specified multiple times)
        #[arg(long, short = 'a')]
        assignee: Vec<String>,

        /// Labels (can be specified multiple times)
        #[arg(long, short = 'l')]
        label: Vec<String>,
    },

    /// List work items of the space
    #[command(alias = "ls")]
    List,

    /// Show a work item
    Show {
        /// Work item id
        id: String,
    },

    /// Set field values on a work item
    Set {
        /// Work item id
        id: String,

        /// Version the change is based on (defaults to the stored version)
        #[arg(long = "base-version", value_name = "VERSION")]
        base_version: Option<u64>,

        /// Field assignments (name=value, `-` removes the field)
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Show event history for a work item
    Events {
        /// Work item id
        id: String,
    },

    /// Remote tracker staging
    #[command(subcommand)]
    Tracker(TrackerCommands),
}

#[derive(Subcommand)]
enum TrackerCommands {
    /// Stage (or restage) a remote item
    Put {
        /// Remote item id
        remote_id: String,

        /// Tracker configuration id
        #[arg(long)]
        tracker: u64,

        /// Raw item payload
        #[arg(long)]
        item: String,
    },

    /// Show a staged item
    Get {
        /// Remote item id
        remote_id: String,
    },

    /// List items staged by a tracker
    List {
        /// Tracker configuration id
        #[arg(long)]
        tracker: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let workspace_path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let ctx = commands::Context {
        path: workspace_path,
        space: cli.space,
        actor: cli.actor,
        format: cli.format,
    };

    match cli.command {
        Commands::Init { name } => commands::init(&ctx, name),
        Commands::New {
            title,
            state,
            assignee,
            label,
        } => commands::new_item(&ctx, title, state, assignee, label),
        Commands::List => commands::list(&ctx),
        Commands::Show { id } => commands::show(&ctx, &id),
        Commands::Set {
            id,
            base_version,
            assignments,
        } => commands::set(&ctx, &id, base_version, &assignments),
        Commands::Events { id } => commands::events(&ctx, &id),
        Commands::Tracker(TrackerCommands::Put {
            remote_id,
            tracker,
            item,
        }) => commands::tracker_put(&ctx, &remote_id, tracker, item),
        Commands::Tracker(TrackerCommands::Get { remote_id }) => {
            commands::tracker_get(&ctx, &remote_id)
        }
        Commands::Tracker(TrackerCommands::List { tracker }) => {
            commands::tracker_list(&ctx, tracker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_set_parses_base_version() {
        let cli = Cli::try_parse_from([
            "wit",
            "set",
            "0b6f5e4c-3a51-4c39-9a0e-6f0d7d3c2a11",
            "--base-version",
            "3",
            "system.state=closed",
        ])
        .unwrap();

        match cli.command {
            Commands::Set {
                base_version,
                assignments,
                ..
            } => {
                assert_eq!(base_version, Some(3));
                assert_eq!(assignments, ["system.state=closed"]);
            }
            _ => panic!("expected set"),
        }
    }
}
