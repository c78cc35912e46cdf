//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `vcr`.
#[derive(Debug, Parser)]
#[command(name = "vcr", version, about = "Inspect HTTP record/replay cassettes")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the mode resolved from VCR_MODE and VCR_PATH.
    Mode,
    /// List the interactions stored in a cassette file.
    Show {
        /// Path to a `.cassette` file.
        cassette: PathBuf,
    },
    /// Print the seed recorded for a test under VCR_PATH.
    Seed {
        /// Test identity, e.g. `TestAccIAMRole/basic`.
        test: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_mode_subcommand() {
        let cli = Cli::parse_from(["vcr", "mode"]);
        assert!(matches!(cli.command, Command::Mode));
    }

    #[test]
    fn parses_show_subcommand() {
        let cli = Cli::parse_from(["vcr", "show", "/t/a.cassette"]);
        let Command::Show { cassette } = cli.command else {
            panic!("expected show subcommand");
        };
        assert!(cassette.ends_with("a.cassette"));
    }

    #[test]
    fn seed_requires_test_name() {
        assert!(Cli::try_parse_from(["vcr", "seed"]).is_err());
    }
}
