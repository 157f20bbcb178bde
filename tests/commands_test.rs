//! Command-level tests: parsed CLI arguments over temp files, checking exit codes.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use scalebal::cli::{execute_command, Cli, CliResult};
use scalebal::exitcode;

fn run(args: &[&str]) -> CliResult<()> {
    let cli = Cli::try_parse_from(std::iter::once("scalebal").chain(args.iter().copied()))
        .expect("parse arguments");
    execute_command(&cli)
}

fn exit_code(result: CliResult<()>) -> i32 {
    result.err().map_or(exitcode::OK, |e| e.exit_code())
}

fn write_table(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("scales.csv");
    fs::write(&path, content).expect("write table");
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

const WITH_REJECTED_LINE: &str = "X,X,2\nS1,5,S2\nS2,5,5\n";

#[test]
fn given_rejected_line_and_strict_when_balancing_then_dataerr_and_records_written() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_table(&temp, WITH_REJECTED_LINE);
    let output = temp.path().join("out.csv");

    // Act
    let code = exit_code(run(&[
        "-C",
        arg(temp.path()),
        "balance",
        arg(&input),
        "-o",
        arg(&output),
        "--strict",
    ]));

    // Assert
    assert_eq!(code, exitcode::DATAERR);
    assert_eq!(fs::read_to_string(&output).unwrap(), "S1,6,0\nS2,0,0\n");
}

#[test]
fn given_rejected_line_without_strict_when_balancing_then_succeeds() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_table(&temp, WITH_REJECTED_LINE);
    let output = temp.path().join("out.csv");

    // Act
    let code = exit_code(run(&[
        "-C",
        arg(temp.path()),
        "balance",
        arg(&input),
        "-o",
        arg(&output),
    ]));

    // Assert
    assert_eq!(code, exitcode::OK);
    assert_eq!(fs::read_to_string(&output).unwrap(), "S1,6,0\nS2,0,0\n");
}

#[test]
fn given_strict_in_local_config_when_balancing_then_dataerr() {
    // Arrange
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".scalebal.toml"), "[balance]\nstrict = true\n").unwrap();
    let input = write_table(&temp, WITH_REJECTED_LINE);
    let output = temp.path().join("out.csv");

    // Act
    let code = exit_code(run(&[
        "-C",
        arg(temp.path()),
        "balance",
        arg(&input),
        "-o",
        arg(&output),
    ]));

    // Assert
    assert_eq!(code, exitcode::DATAERR);
}

#[test]
fn given_rejected_line_when_checking_then_dataerr() {
    let temp = TempDir::new().unwrap();
    let input = write_table(&temp, WITH_REJECTED_LINE);

    let code = exit_code(run(&["-C", arg(temp.path()), "check", arg(&input)]));

    assert_eq!(code, exitcode::DATAERR);
}

#[test]
fn given_cycle_when_checking_then_dataerr() {
    let temp = TempDir::new().unwrap();
    let input = write_table(&temp, "X,X,2\nA,B,1\nB,A,1\n");

    let code = exit_code(run(&["-C", arg(temp.path()), "check", arg(&input)]));

    assert_eq!(code, exitcode::DATAERR);
}

#[test]
fn given_clean_table_when_checking_then_ok() {
    let temp = TempDir::new().unwrap();
    let input = write_table(&temp, "A,B,1\nB,C,2\nC,3,4\n");

    let code = exit_code(run(&["-C", arg(temp.path()), "check", arg(&input)]));

    assert_eq!(code, exitcode::OK);
}

#[test]
fn given_missing_input_when_balancing_then_noinput() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.csv");

    let code = exit_code(run(&["-C", arg(temp.path()), "balance", arg(&missing)]));

    assert_eq!(code, exitcode::NOINPUT);
}

#[test]
fn given_existing_local_config_when_init_then_requires_force() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let dir = arg(temp.path());
    assert_eq!(exit_code(run(&["-C", dir, "config", "init"])), exitcode::OK);
    fs::write(temp.path().join(".scalebal.toml"), "[balance]\nself_mass = 9\n").unwrap();

    // Act
    let refused = exit_code(run(&["-C", dir, "config", "init"]));
    let forced = exit_code(run(&["-C", dir, "config", "init", "--force"]));

    // Assert
    assert_eq!(refused, exitcode::USAGE);
    assert_eq!(forced, exitcode::OK);
    let content = fs::read_to_string(temp.path().join(".scalebal.toml")).unwrap();
    assert!(content.starts_with("# scalebal configuration"), "{}", content);
}
