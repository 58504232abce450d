use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

mod common;

#[test]
fn build_of_a_missing_source_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    common::write_config(dir.path())?;

    let mut cmd = Command::cargo_bin("assetforge")?;
    cmd.current_dir(dir.path())
        .arg("build")
        .arg("1")
        .arg("--full-name")
        .arg(dir.path().join("does-not-exist").to_string_lossy().into_owned());

    cmd.assert().failure();
    Ok(())
}

#[test]
fn build_of_an_existing_source_file_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    common::write_config(dir.path())?;
    let source = dir.path().join("leaf.txt");
    std::fs::write(&source, b"hello")?;

    let mut cmd = Command::cargo_bin("assetforge")?;
    cmd.current_dir(dir.path())
        .arg("build")
        .arg("1")
        .arg("--full-name")
        .arg(source.to_string_lossy().into_owned());

    cmd.assert().success().stdout(predicate::str::contains("Clean"));
    Ok(())
}

#[test]
fn completions_are_printed_for_every_supported_shell() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("assetforge")?;
    cmd.arg("completions").arg("bash");
    cmd.assert().success().stdout(predicate::str::contains("assetforge"));
    Ok(())
}
