//! # Plankey CLI
//!
//! Command-line interface for plankey.
//!
//! This crate inspects expression tree files from the command line: it
//! prints their cache keys, checks whether two trees share a key, and runs
//! the structural validator.
//!
//! ## Commands
//!
//! - `key` - Print the cache key of a tree file
//! - `compare` - Check whether two tree files are cache-equivalent
//! - `validate` - Run the structural validator over a tree file
//! - `kinds` - Print every node kind with its key token
//!

pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use plankey_keygen::KeyGenConfig;
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Arguments
// ============================================================================

/// Canonical cache keys for query command trees
#[derive(Parser, Debug)]
#[command(name = "plankey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML file with key-generation settings
    #[arg(short, long, env = "PLANKEY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Deepest tree that will be keyed
    #[arg(long, global = true, conflicts_with = "no_depth_limit")]
    pub max_depth: Option<usize>,

    /// Key trees of any depth
    #[arg(long, global = true)]
    pub no_depth_limit: bool,

    /// Fail on variable names from the default alias generator
    #[arg(long, global = true, conflicts_with = "allow_generated_aliases")]
    pub strict_aliases: bool,

    /// Accept variable names from the default alias generator
    #[arg(long, global = true)]
    pub allow_generated_aliases: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cache key of a tree file
    Key {
        /// Path to the tree file
        file: PathBuf,

        /// Print a JSON report instead of the bare key
        #[arg(long)]
        json: bool,
    },

    /// Check whether two tree files are cache-equivalent
    Compare {
        /// First tree file
        left: PathBuf,

        /// Second tree file
        right: PathBuf,
    },

    /// Run the structural validator over a tree file
    Validate {
        /// Path to the tree file
        file: PathBuf,
    },

    /// Print every node kind with its key token
    Kinds,
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Key printed, trees equivalent, or tree valid
    Success,
    /// Tree not cacheable, trees differ, or tree invalid
    Negative,
}

impl Outcome {
    /// Process exit code; errors exit with 1
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Negative => 2,
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

impl Cli {
    /// Key-generation settings: config file first, then flag overrides
    pub fn keygen_config(&self) -> anyhow::Result<KeyGenConfig> {
        let mut config = match &self.config {
            Some(path) => KeyGenConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => KeyGenConfig::default(),
        };

        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if self.no_depth_limit {
            config = config.without_depth_limit();
        }
        if self.strict_aliases {
            config = config.strict_aliases();
        }
        if self.allow_generated_aliases {
            config = config.allow_generated_aliases();
        }

        Ok(config)
    }
}

/// Run a parsed command line, writing results to stdout
pub fn run(cli: Cli) -> anyhow::Result<Outcome> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.keygen_config()?;
    tracing::debug!(?config, "key generation settings");

    let mut out = std::io::stdout().lock();
    match &cli.command {
        Commands::Key { file, json } => commands::key(&mut out, file, *json, config),
        Commands::Compare { left, right } => commands::compare(&mut out, left, right, config),
        Commands::Validate { file } => commands::validate(&mut out, file),
        Commands::Kinds => commands::kinds(&mut out),
    }
}

// ============================================================================
// Tests
// ============================================================================
