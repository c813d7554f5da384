//! Exit statuses and diagnostics of the `csc` binary.
//!
//! The channel is prepared lazily, so none of these need a running
//! controller; the endpoint below is never successfully dialed.

use assert_cmd::Command;
use predicates::prelude::*;

const ENDPOINT: &str = "tcp://127.0.0.1:1";

fn csc() -> Command {
    let mut cmd = Command::cargo_bin("csc").unwrap();
    for var in [
        "CSI_ENDPOINT",
        "CSI_FORMAT",
        "CSI_VERSION",
        "CSI_TIMEOUT",
        "CSI_STARTING_TOKEN",
        "CSI_MAX_ENTRIES",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn missing_volume_id_prints_usage() {
    csc()
        .args(["--endpoint", ENDPOINT, "deletevolume"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing volume ID"))
        .stderr(predicate::str::contains("usage: csc deletevolume [ARGS...] ID_KEY"));
}

#[test]
fn aliases_route_to_the_same_command() {
    csc()
        .args(["rm", "-e", ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("usage: csc deletevolume"));

    csc()
        .args(["-e", ENDPOINT, "new"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing volume name"))
        .stderr(predicate::str::contains("usage: csc createvolume [ARGS...] NAME"));
}

#[test]
fn oversized_max_entries_is_not_a_usage_error() {
    csc()
        .args(["-e", ENDPOINT, "listvolumes", "--maxEntries", "4294967296"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max entries > uint32: 4294967296"))
        .stderr(predicate::str::contains("usage:").not());
}

#[test]
fn max_entries_from_the_environment() {
    csc()
        .env("CSI_MAX_ENTRIES", "4294967296")
        .args(["-e", ENDPOINT, "ls"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max entries > uint32"));
}

#[test]
fn endpoint_is_required() {
    csc()
        .args(["getcapacity"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing endpoint"));
}

#[test]
fn unsupported_endpoint_scheme_is_reported() {
    csc()
        .args(["-e", "ftp://host:21", "getcapacity"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported scheme"));
}

#[test]
fn unreachable_controller_is_an_rpc_failure() {
    csc()
        .args(["-e", ENDPOINT, "--timeout", "10", "getcapacity"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error: "));
}

#[test]
fn unknown_command_is_rejected_by_the_parser() {
    csc()
        .args(["-e", ENDPOINT, "nodepublishvolume"])
        .assert()
        .code(2);
}

#[test]
fn help_lists_every_command() {
    let assert = csc().arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for name in [
        "createvolume",
        "deletevolume",
        "controllerpublishvolume",
        "controllerunpublishvolume",
        "validatevolumecapabilities",
        "listvolumes",
        "getcapacity",
        "controllergetcapabilities",
    ] {
        assert!(out.contains(name), "{name} missing from help");
    }
}
