use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn test_cli_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::cargo_bin_cmd!("projections");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("schedule"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("completions"));
    Ok(())
}

#[test]
fn test_schedule_help_lists_forecast_options() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::cargo_bin_cmd!("projections");
    cmd.args(["schedule", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--percentiles"))
        .stdout(predicate::str::contains("--runs"))
        .stdout(predicate::str::contains("--overflow-limit"));
    Ok(())
}
