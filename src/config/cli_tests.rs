//! Tests for CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

use super::cli::{Cli, Command};

mod parsing {
    use super::*;

    #[test]
    fn no_arguments_is_interactive_run() {
        let cli = Cli::parse_from_iter(["macshift"]);

        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.settle_delay_ms.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from_iter(["macshift", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));

        let short = Cli::parse_from_iter(["macshift", "-c", "other.toml"]);
        assert_eq!(short.config, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn parse_settle_delay() {
        let cli = Cli::parse_from_iter(["macshift", "--settle-delay-ms", "1500"]);
        assert_eq!(cli.settle_delay_ms, Some(1500));
    }

    #[test]
    fn parse_verbose() {
        assert!(Cli::parse_from_iter(["macshift", "--verbose"]).verbose);
        assert!(Cli::parse_from_iter(["macshift", "-v"]).verbose);
    }

    #[test]
    fn non_numeric_settle_delay_is_rejected() {
        let result = Cli::try_parse_from(["macshift", "--settle-delay-ms", "fast"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let result = Cli::try_parse_from(["macshift", "--url", "https://example.com"]);
        assert!(result.is_err());
    }
}

mod init_command {
    use super::*;

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["macshift", "init"]);

        let Some(Command::Init { output }) = cli.command else {
            panic!("Expected Init command");
        };
        assert_eq!(output, PathBuf::from("macshift.toml"));
    }

    #[test]
    fn init_with_custom_output() {
        let cli = Cli::parse_from_iter(["macshift", "init", "-o", "conf/macshift.toml"]);

        let Some(Command::Init { output }) = cli.command else {
            panic!("Expected Init command");
        };
        assert_eq!(output, PathBuf::from("conf/macshift.toml"));
    }
}
