use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn tracker(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sr-tracker").unwrap();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn import_builtin_then_list() {
    let dir = tempdir().unwrap();

    tracker(dir.path())
        .args(["import", "--builtin", "goblin_warband"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 3 enemies"));

    tracker(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goblin Skirmisher"))
        .stdout(predicate::str::contains("Warband Ogre"))
        .stdout(predicate::str::contains("3 enemies tracked"));
}

#[test]
fn export_writes_a_versioned_document() {
    let dir = tempdir().unwrap();
    tracker(dir.path())
        .args(["import", "--builtin", "goblin_warband"])
        .assert()
        .success();

    let out = dir.path().join("out.json");
    tracker(dir.path())
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["version"], "3.0");
    assert_eq!(doc["enemies"].as_array().unwrap().len(), 3);
}

#[test]
fn malformed_import_fails_loudly() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "]]not json[[").unwrap();

    tracker(dir.path())
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to import"));

    tracker(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 enemies tracked"));
}

#[test]
fn import_append_then_replace() {
    let dir = tempdir().unwrap();
    for _ in 0..2 {
        tracker(dir.path())
            .args(["import", "--builtin", "goblin_warband", "--mode", "append"])
            .assert()
            .success();
    }
    tracker(dir.path())
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("6 enemies tracked"));

    tracker(dir.path())
        .args(["import", "--builtin", "goblin_warband", "--mode", "replace"])
        .assert()
        .success();
    tracker(dir.path())
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("3 enemies tracked"));
}

#[test]
fn unknown_builtin_is_an_error() {
    let dir = tempdir().unwrap();
    tracker(dir.path())
        .args(["import", "--builtin", "dragon_lair"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bundled encounter"));
}

#[test]
fn clear_requires_confirmation() {
    let dir = tempdir().unwrap();
    tracker(dir.path())
        .args(["import", "--builtin", "goblin_warband"])
        .assert()
        .success();

    tracker(dir.path())
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    tracker(dir.path())
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared 3 enemies"));

    tracker(dir.path())
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("0 enemies tracked"));
}

#[test]
fn room_sync_round_trips_through_the_shared_directory() {
    let dir = tempdir().unwrap();
    let room = dir.path().join("room");
    std::fs::create_dir_all(&room).unwrap();

    tracker(&dir.path().join("a"))
        .arg("--room")
        .arg(&room)
        .args(["import", "--builtin", "goblin_warband"])
        .assert()
        .success();

    // A second client pointed at the same room sees the shared roster.
    tracker(&dir.path().join("b"))
        .arg("--room")
        .arg(&room)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 enemies tracked"));
}
