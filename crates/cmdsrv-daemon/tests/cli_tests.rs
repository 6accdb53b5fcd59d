// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line behaviour of the `cmdsrv` binary that does not need a bound
//! socket.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmdsrv() -> Command {
    let mut cmd = Command::cargo_bin("cmdsrv").expect("binary `cmdsrv` should be built");
    cmd.env_remove("RUST_LOG");
    for var in [
        "CMDSRV_LOG_LEVEL",
        "CMDSRV_LOG_FORMAT",
        "CMDSRV_BIND_ADDRESS",
        "CMDSRV_BIND_PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_flags() {
    cmdsrv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--print-config-schema"));
}

#[test]
fn print_config_schema_is_json() {
    let out = cmdsrv()
        .arg("--print-config-schema")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let schema: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let props = &schema["properties"];
    assert!(props.get("server").is_some(), "{schema}");
    assert!(props.get("logging").is_some(), "{schema}");
    assert!(props.get("cmdsrv").is_some(), "{schema}");
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmdsrv()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn malformed_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nbind_port = 1").unwrap();
    cmdsrv()
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("load configuration"));
}

#[test]
fn invalid_config_values_fail() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[logging]\nlevel = \"chatty\"").unwrap();
    cmdsrv()
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn zero_port_override_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    cmdsrv()
        .current_dir(dir.path())
        .args(["--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}
