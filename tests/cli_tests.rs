mod common;

use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use common::{epl_header, write_file};
use predicates::prelude::*;
use tempfile::tempdir;

const MIT_TEMPLATE: &str = include_str!("../resources/copyright-templates/mitsallings-copyright.txt");

fn copyright(dir: &Path) -> Result<Command> {
  let mut cmd = Command::cargo_bin("copyright")?;
  cmd
    .current_dir(dir)
    .env_remove("COPYRIGHT_CHECK_CONFIG")
    .env_remove("RUST_LOG")
    .args(["--colors", "never"]);
  Ok(cmd)
}

#[test]
fn test_help_lists_examples() -> Result<()> {
  let dir = tempdir()?;
  copyright(dir.path())?
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Examples:"))
    .stdout(predicate::str::contains("--repair"));
  Ok(())
}

#[test]
fn test_missing_header_sets_exit_status() -> Result<()> {
  let dir = tempdir()?;
  write_file(dir.path(), "A.java", "public class A {}\n")?;
  write_file(dir.path(), "B.java", "public class B {}\n")?;

  copyright(dir.path())?
    .args(["--no-config", "-c"])
    .assert()
    .code(2)
    .stdout(predicate::str::contains("A.java: No copyright"))
    .stdout(predicate::str::contains("B.java: No copyright"))
    .stdout(predicate::str::contains("No Copyright:\t\t2"));
  Ok(())
}

#[test]
fn test_clean_tree_reports_no_errors() -> Result<()> {
  let dir = tempdir()?;
  write_file(
    dir.path(),
    "src/A.java",
    &format!("{}\npublic class A {{}}\n", epl_header("2015")),
  )?;

  copyright(dir.path())?
    .args(["--no-config", "-c", "-y"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No errors"));
  Ok(())
}

#[test]
fn test_quiet_hides_findings_but_keeps_status() -> Result<()> {
  let dir = tempdir()?;
  write_file(dir.path(), "A.java", "public class A {}\n")?;

  copyright(dir.path())?
    .args(["--no-config", "-q"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("No copyright").not());
  Ok(())
}

#[test]
fn test_repair_then_recheck() -> Result<()> {
  let dir = tempdir()?;
  let file = write_file(dir.path(), "A.java", "public class A {}\n")?;

  copyright(dir.path())?.args(["--no-config", "-r"]).assert().code(1);
  assert!(fs::read_to_string(&file)?.contains("Oracle and/or its affiliates. All rights reserved."));

  copyright(dir.path())?
    .args(["--no-config", "-c", "-y"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No errors"));
  Ok(())
}

#[test]
fn test_dry_run_requires_repair() -> Result<()> {
  let dir = tempdir()?;
  copyright(dir.path())?.arg("-n").assert().failure();
  Ok(())
}

#[test]
fn test_dry_run_writes_new_file() -> Result<()> {
  let dir = tempdir()?;
  let file = write_file(dir.path(), "A.java", "public class A {}\n")?;

  copyright(dir.path())?
    .args(["--no-config", "-r", "-n", "A.java"])
    .assert()
    .code(1);
  assert_eq!(fs::read_to_string(&file)?, "public class A {}\n");
  assert!(dir.path().join("A.java.new").exists());
  Ok(())
}

#[test]
fn test_zero_scm_timeout_is_rejected() -> Result<()> {
  let dir = tempdir()?;
  copyright(dir.path())?.args(["--scm-timeout", "0"]).assert().failure();
  Ok(())
}

#[test]
fn test_nonexistent_path_is_reported() -> Result<()> {
  let dir = tempdir()?;
  copyright(dir.path())?
    .args(["--no-config", "Missing.java"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Missing.java: doesn't exist"));
  Ok(())
}

#[test]
fn test_config_file_excludes() -> Result<()> {
  let dir = tempdir()?;
  write_file(dir.path(), "generated/G.java", "public class G {}\n")?;
  write_file(dir.path(), ".copyright.toml", "excludes = [\"/generated/\"]\n")?;

  copyright(dir.path())?.arg("-c").assert().success();
  copyright(dir.path())?.args(["--no-config", "-c"]).assert().code(1);
  Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
  let dir = tempdir()?;
  write_file(dir.path(), ".copyright.toml", "scm-timeout-secs = 0\n")?;

  copyright(dir.path())?
    .assert()
    .failure()
    .stderr(predicate::str::contains("scm-timeout-secs"));
  Ok(())
}

#[test]
fn test_unknown_template_is_fatal() -> Result<()> {
  let dir = tempdir()?;
  copyright(dir.path())?
    .args(["--no-config", "-C", "no-such-template.txt"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load copyright templates"));
  Ok(())
}

#[test]
fn test_alternate_templates_are_accepted() -> Result<()> {
  let dir = tempdir()?;
  write_file(
    dir.path(),
    "M.java",
    &format!("{}\npublic class M {{}}\n", MIT_TEMPLATE.replace("YYYY", "2015")),
  )?;

  // A custom correct template drops the default alternates.
  copyright(dir.path())?
    .args(["--no-config", "-y", "-C", "epl"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("M.java: Wrong copyright"));

  copyright(dir.path())?
    .args(["--no-config", "-y", "-C", "epl", "-A", "w3c-copyright.txt:mitsallings-copyright.txt"])
    .assert()
    .success();
  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let dir = tempdir()?;
  write_file(dir.path(), "A.java", "public class A {}\n")?;

  copyright(dir.path())?
    .args(["--no-config", "--report-json", "report.json"])
    .assert()
    .code(1);

  let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(dir.path().join("report.json"))?)?;
  assert_eq!(report["summary"]["missing"], 1);
  assert_eq!(report["files"][0]["finding"], "No copyright");
  Ok(())
}
