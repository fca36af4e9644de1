use std::time::Duration;

use engine::{Backend, EnemyRecord, LocalStore, Mode, Persistence, RoomStore, StoreError};
use tempfile::tempdir;

fn enemy(id: &str, name: &str) -> EnemyRecord {
    EnemyRecord {
        id: id.to_string(),
        name: name.to_string(),
        ..EnemyRecord::default()
    }
}

/// Backend that claims readiness but fails every operation; used to verify
/// graceful degradation.
struct BrokenStore;

impl Backend for BrokenStore {
    fn ready(&self) -> bool {
        true
    }

    fn load(&self) -> Result<Option<Vec<EnemyRecord>>, StoreError> {
        Err(StoreError::Read {
            path: "broken".into(),
            source: std::io::Error::other("backend down"),
        })
    }

    fn save(&self, _enemies: &[EnemyRecord]) -> Result<(), StoreError> {
        Err(StoreError::Write {
            path: "broken".into(),
            source: std::io::Error::other("backend down"),
        })
    }
}

#[test]
fn local_store_round_trips() {
    let dir = tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    assert!(store.load().unwrap().is_none(), "empty before first save");

    let enemies = vec![enemy("enemy-1", "Bandit"), enemy("enemy-2", "Wolf")];
    store.save(&enemies).unwrap();
    assert_eq!(store.load().unwrap().unwrap(), enemies);
}

#[test]
fn local_store_rejects_corrupt_document() {
    let dir = tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    std::fs::write(store.path(), "{{not json").unwrap();
    assert!(matches!(store.load(), Err(StoreError::Malformed { .. })));
}

#[test]
fn room_store_preserves_foreign_metadata_keys() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("metadata.json"),
        r#"{"other-extension": {"keep": true}}"#,
    )
    .unwrap();

    let store = RoomStore::new(dir.path());
    assert!(store.ready());
    assert!(store.load().unwrap().is_none(), "no roster key yet");

    store.save(&[enemy("enemy-1", "Bandit")]).unwrap();
    assert_eq!(store.load().unwrap().unwrap().len(), 1);

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(metadata["other-extension"]["keep"], true);
    assert!(metadata["sr-enemies"].is_array());
}

#[test]
fn room_store_not_ready_without_directory() {
    let dir = tempdir().unwrap();
    let store = RoomStore::new(dir.path().join("missing-room"));
    assert!(!store.ready());
}

#[test]
fn ready_host_settles_to_host_mode() {
    let dir = tempdir().unwrap();
    let room = RoomStore::new(dir.path());
    let local = LocalStore::new(dir.path().join("local"));

    let mut persistence = Persistence::new(Some(Box::new(room)), local);
    assert_eq!(persistence.mode(), Mode::Probing);
    assert_eq!(persistence.poll_probe(), Some(Mode::Host));
    assert_eq!(persistence.poll_probe(), None, "probe is one-shot");
}

#[test]
fn silent_host_falls_back_after_the_window() {
    let dir = tempdir().unwrap();
    let room = RoomStore::new(dir.path().join("missing-room"));
    let local = LocalStore::new(dir.path().join("local"));

    let mut persistence =
        Persistence::with_probe_window(Some(Box::new(room)), local, Duration::ZERO);
    assert_eq!(persistence.poll_probe(), Some(Mode::Local));
    // One-way: later readiness is never picked up.
    std::fs::create_dir_all(dir.path().join("missing-room")).unwrap();
    assert_eq!(persistence.poll_probe(), None);
    assert_eq!(persistence.mode(), Mode::Local);
}

#[test]
fn no_host_starts_local() {
    let dir = tempdir().unwrap();
    let persistence = Persistence::new(None, LocalStore::new(dir.path()));
    assert_eq!(persistence.mode(), Mode::Local);
}

#[test]
fn broken_host_degrades_to_local_mirror() {
    let dir = tempdir().unwrap();
    let local = LocalStore::new(dir.path());
    let mut persistence = Persistence::new(Some(Box::new(BrokenStore)), local.clone());
    assert_eq!(persistence.resolve_now(), Mode::Host);

    // Host write fails silently; the local mirror is still written.
    let enemies = vec![enemy("enemy-1", "Bandit")];
    persistence.save(&enemies);
    assert_eq!(local.load().unwrap().unwrap(), enemies);

    // Host read fails; the load falls back to the mirror.
    assert_eq!(persistence.load(), enemies);
}

#[test]
fn host_load_wins_over_stale_local_copy() {
    let dir = tempdir().unwrap();
    let room_dir = dir.path().join("room");
    std::fs::create_dir_all(&room_dir).unwrap();
    let room = RoomStore::new(&room_dir);
    room.save(&[enemy("enemy-1", "Room Copy")]).unwrap();

    let local = LocalStore::new(dir.path().join("local"));
    local.save(&[enemy("enemy-9", "Stale Local")]).unwrap();

    let mut persistence = Persistence::new(Some(Box::new(room)), local);
    assert_eq!(persistence.resolve_now(), Mode::Host);
    let loaded = persistence.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Room Copy");
}
