//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "psn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Issue and verify pseudonyms over a hierarchy of domains")]
pub(crate) struct Cli {
    /// Configuration file (TOML, JSON or YAML); `PSN__*` environment variables override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the configured domains
    Domains,
    /// Print the effective configuration of a domain
    Resolve {
        domain: String,
    },
    /// Issue a pseudonym for an identifier
    Issue {
        domain: String,
        identifier: String,
        #[arg(long, default_value = "DEFAULT")]
        id_type: String,
    },
    /// Compute or verify a check character
    CheckDigit {
        #[command(subcommand)]
        action: CheckDigitAction,
    },
    /// Print the path between two domains
    Path {
        from: String,
        to: String,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum CheckDigitAction {
    /// Append the check character to a value
    Append(CheckDigitArgs),
    /// Verify the trailing check character of a value
    Validate(CheckDigitArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct CheckDigitArgs {
    /// Algorithm whose alphabet applies (unknown names fall back to RANDOM_LET)
    #[arg(short, long)]
    pub algorithm: String,
    /// Alphabet used by the RANDOM strategy
    #[arg(long)]
    pub alphabet: Option<String>,
    /// Domain prefix stripped before computing
    #[arg(short, long, default_value = "")]
    pub prefix: String,
    pub value: String,
}
