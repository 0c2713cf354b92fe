//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Check credentials and group membership against htpasswd/htgroup files.
#[derive(Debug, Parser)]
#[command(name = "htrealm", version, about)]
pub struct Cli {
    /// Path to the htpasswd file
    #[arg(short = 'p', long, env = "HTREALM_PASSWD_FILE", global = true)]
    pub passwd_file: Option<PathBuf>,

    /// Path to the htgroup file
    #[arg(short = 'g', long, env = "HTREALM_GROUP_FILE", global = true)]
    pub group_file: Option<PathBuf>,

    /// Load both paths from a JSON config file instead
    #[arg(short = 'c', long, env = "HTREALM_CONFIG", global = true, conflicts_with_all = ["passwd_file", "group_file"])]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Realm queries.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify a user's password and print their groups
    Check {
        /// Username to authenticate
        user: String,
        /// Password; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Show a user and the groups they belong to
    User {
        /// Username to look up
        name: String,
    },
    /// Show the members of a group
    Group {
        /// Group name to look up
        name: String,
    },
}
