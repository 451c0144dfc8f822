//! Command-line interface of the irrigator, built on clap.
//!
//! Defines the [`Cli`] struct with [`Command`] subcommands (decide, demo,
//! fields) and global flags (--max-attempts, --seed, --json, --verbose).

use clap::{Parser, Subcommand};

/// Fault-tolerant irrigation decision engine.
#[derive(Debug, Parser)]
#[command(name = "irrigator", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Maximum sensor attempts per decision (overrides irrigator.toml).
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Seed for the simulated sensor network, for reproducible runs.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Emit machine-readable JSON instead of the terminal report.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decide whether to irrigate a single field.
    Decide {
        /// Identifier of the field to evaluate.
        field_id: u32,
    },

    /// Evaluate every field known to the directory.
    Demo,

    /// List the field directory.
    Fields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_decide_subcommand() {
        let cli = Cli::parse_from(["irrigator", "decide", "12"]);
        match cli.command {
            Command::Decide { field_id } => assert_eq!(field_id, 12),
            _ => panic!("expected Decide command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "irrigator",
            "--max-attempts",
            "5",
            "--seed",
            "42",
            "--json",
            "--verbose",
            "demo",
        ]);
        assert!(cli.json);
        assert!(cli.verbose);
        assert_eq!(cli.max_attempts, Some(5));
        assert_eq!(cli.seed, Some(42));
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn cli_parses_fields_subcommand() {
        let cli = Cli::parse_from(["irrigator", "fields"]);
        assert!(matches!(cli.command, Command::Fields));
    }

    #[test]
    fn cli_rejects_non_numeric_field_id() {
        assert!(Cli::try_parse_from(["irrigator", "decide", "north-40"]).is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
