//! CLI help output tests for rc-core.
//!
//! These tests verify that all commands and subcommands correctly display
//! their help text without errors.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the rc-core binary.
fn rc_core() -> Command {
    cargo_bin_cmd!("rc-core")
}

mod top_level {
    use super::*;

    #[test]
    fn help_flag_works() {
        rc_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("RareCrowds"));
    }

    #[test]
    fn version_flag_works() {
        rc_core()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("rc-core"));
    }

    #[test]
    fn help_shows_all_commands() {
        rc_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("simulate"))
            .stdout(predicate::str::contains("presets"))
            .stdout(predicate::str::contains("check"))
            .stdout(predicate::str::contains("ontology"))
            .stdout(predicate::str::contains("version"));
    }

    #[test]
    fn help_shows_global_options() {
        rc_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--format"))
            .stdout(predicate::str::contains("--log-level"))
            .stdout(predicate::str::contains("--log-format"));
    }

    #[test]
    fn missing_subcommand_is_usage_error() {
        rc_core().assert().failure().code(2);
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn simulate_help() {
        rc_core()
            .args(["simulate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--ontology"))
            .stdout(predicate::str::contains("--annotations"))
            .stdout(predicate::str::contains("--preset"))
            .stdout(predicate::str::contains("--seed"))
            .stdout(predicate::str::contains("--parallel"));
    }

    #[test]
    fn check_help() {
        rc_core()
            .args(["check", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--config"));
    }

    #[test]
    fn ontology_help_lists_queries() {
        rc_core()
            .args(["ontology", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ancestors"))
            .stdout(predicate::str::contains("descendants"))
            .stdout(predicate::str::contains("simplify"));
    }
}
