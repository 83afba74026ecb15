use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("minicharts").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("minicharts"));
}

#[test]
fn add_from_csv_writes_commands() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let out = dir.path().join("cmds.json");
    fs::write(
        &input,
        "lng,lat,time,wind,solar\n2.35,48.85,2020,1,2\n2.35,48.85,2021,3,4\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("minicharts").unwrap();
    cmd.args(["add", "--input"])
        .arg(&input)
        .args(["--width", "40", "--out"])
        .arg(&out);
    cmd.assert().success();

    let cmds: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(cmds[0]["method"], "addMinicharts");
    assert_eq!(cmds[0]["args"]["options"]["layerId"][0], "_minichart (2.35,48.85)");
    assert_eq!(cmds[0]["args"]["options"]["width"], 40.0);
    assert_eq!(cmds[0]["args"]["timeLabels"], serde_json::json!(["2020", "2021"]));
    assert_eq!(cmds[1]["method"], "addLegend");
}

#[test]
fn update_prints_only_supplied_options() {
    let mut cmd = Command::cargo_bin("minicharts").unwrap();
    cmd.args(["update", "--layer-ids", "c1", "--opacity", "0.5", "--clear", "label-style"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"opacity\": 0.5"))
        .stdout(predicate::str::contains("\"labelStyle\": null"))
        .stdout(predicate::str::contains("width").not());
}

#[test]
fn invalid_type_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    fs::write(&input, "lng,lat,v\n0,0,1\n").unwrap();
    let mut cmd = Command::cargo_bin("minicharts").unwrap();
    cmd.args(["add", "--type", "donut", "--input"]).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown chart type"));
}
