#![allow(missing_docs)]

use assert_cmd::Command;

const HELP_STR: &str = "Shows the metadata of an LHAPDF set relevant for the ratio

Usage: nuclratio info [OPTIONS] <SET>

Arguments:
  <SET>  LHAPDF id or name of the set

Options:
      --cl <CL>  Confidence level in per cent [default: 68.26894921370858]
  -h, --help     Print help
";

#[test]
fn help() {
    Command::cargo_bin("nuclratio")
        .unwrap()
        .args(["info", "--help"])
        .assert()
        .success()
        .stdout(HELP_STR);
}

#[test]
fn missing_set() {
    Command::cargo_bin("nuclratio")
        .unwrap()
        .arg("info")
        .assert()
        .failure()
        .stderr(predicates::str::contains("<SET>"));
}

#[test]
fn unknown_set() {
    Command::cargo_bin("nuclratio")
        .unwrap()
        .args(["info", "NoSuchSet"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("could not load ensemble `NoSuchSet`"));
}
