use std::path::Path;

use engine::{
    EnemyRecord, ImportMode, LocalStore, Mode, Notifier, Persistence, RoomStore, Severity, Tracker,
};
use tempfile::tempdir;

#[derive(Default)]
struct RecordingNotifier {
    messages: Vec<(String, Severity)>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.messages.push((message.to_string(), severity));
    }
}

fn local_tracker(data_dir: &Path) -> Tracker<RecordingNotifier> {
    let persistence = Persistence::new(None, LocalStore::new(data_dir));
    let mut tracker = Tracker::new(persistence, RecordingNotifier::default());
    tracker.resolve_now();
    tracker
}

fn host_tracker(room_dir: &Path, data_dir: &Path) -> Tracker<RecordingNotifier> {
    std::fs::create_dir_all(room_dir).unwrap();
    let persistence = Persistence::new(
        Some(Box::new(RoomStore::new(room_dir))),
        LocalStore::new(data_dir),
    );
    let mut tracker = Tracker::new(persistence, RecordingNotifier::default());
    assert_eq!(tracker.resolve_now(), Mode::Host);
    tracker
}

fn named(name: &str) -> EnemyRecord {
    EnemyRecord {
        name: name.to_string(),
        ..EnemyRecord::new()
    }
}

#[test]
fn save_creates_then_updates_in_place() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());

    tracker.save_enemy(named("Bandit"));
    tracker.save_enemy(named("Wolf"));
    assert_eq!(tracker.roster().len(), 2);

    let mut edited = tracker.roster().records()[0].clone();
    edited.name = "Bandit Captain".to_string();
    let id = edited.id.clone();
    tracker.save_enemy(edited);

    assert_eq!(tracker.roster().len(), 2);
    assert_eq!(tracker.roster().position(&id), Some(0), "slot is replaced in place");
    assert_eq!(tracker.roster().get(&id).unwrap().name, "Bandit Captain");
}

#[test]
fn mutations_survive_a_reload() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    tracker.save_enemy(named("Bandit"));
    let id = tracker.roster().records()[0].id.clone();
    tracker.change_hp(&id, -4);

    let mut reopened = local_tracker(dir.path());
    reopened.reload();
    assert_eq!(reopened.roster().len(), 1);
    assert_eq!(reopened.roster().get(&id).unwrap().current_hp, 6);
}

#[test]
fn deleting_an_absent_enemy_is_a_noop() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    tracker.save_enemy(named("Bandit"));

    assert!(!tracker.delete_enemy("enemy-nope"));
    assert_eq!(tracker.roster().len(), 1);

    let id = tracker.roster().records()[0].id.clone();
    assert!(tracker.delete_enemy(&id));
    assert!(!tracker.delete_enemy(&id), "second delete is a no-op");
    assert!(tracker.roster().is_empty());
}

#[test]
fn clear_all_reports_zero_when_empty() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    assert_eq!(tracker.clear_all(), 0);
    assert!(tracker.notifier().messages.is_empty(), "nothing to announce");

    tracker.save_enemy(named("Bandit"));
    tracker.save_enemy(named("Wolf"));
    assert_eq!(tracker.clear_all(), 2);
    assert!(tracker.roster().is_empty());
    assert!(
        tracker
            .notifier()
            .messages
            .iter()
            .any(|(m, s)| m == "All enemies cleared" && *s == Severity::Warning)
    );
}

#[test]
fn defeated_notification_fires_only_when_host_connected() {
    let dir = tempdir().unwrap();

    let mut host = host_tracker(&dir.path().join("room"), &dir.path().join("data"));
    host.save_enemy(named("Bandit"));
    let id = host.roster().records()[0].id.clone();
    host.change_hp(&id, -100);
    assert!(
        host.notifier()
            .messages
            .iter()
            .any(|(m, s)| m == "Bandit has been defeated!" && *s == Severity::Warning)
    );

    let mut standalone = local_tracker(&dir.path().join("solo"));
    standalone.save_enemy(named("Wolf"));
    let id = standalone.roster().records()[0].id.clone();
    standalone.change_hp(&id, -100);
    assert!(
        !standalone
            .notifier()
            .messages
            .iter()
            .any(|(m, _)| m.contains("defeated")),
        "standalone sessions stay quiet"
    );
}

#[test]
fn import_replace_and_append_lengths() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    tracker.save_enemy(named("Bandit"));

    let upload = dir.path().join("upload.json");
    std::fs::write(&upload, r#"[{"name": "Wolf"}, {"name": "Bear"}]"#).unwrap();

    assert_eq!(tracker.import(&upload, ImportMode::Append).unwrap(), 2);
    assert_eq!(tracker.roster().len(), 3);

    assert_eq!(tracker.import(&upload, ImportMode::Replace).unwrap(), 2);
    assert_eq!(tracker.roster().len(), 2);
}

#[test]
fn failed_import_leaves_roster_untouched() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    tracker.save_enemy(named("Bandit"));

    let upload = dir.path().join("garbage.json");
    std::fs::write(&upload, "]]not json[[").unwrap();
    assert!(tracker.import(&upload, ImportMode::Replace).is_err());
    assert_eq!(tracker.roster().len(), 1);
    assert_eq!(tracker.roster().records()[0].name, "Bandit");
}

#[test]
fn host_saves_mirror_to_local_fallback() {
    let dir = tempdir().unwrap();
    let room_dir = dir.path().join("room");
    let data_dir = dir.path().join("data");
    let mut tracker = host_tracker(&room_dir, &data_dir);
    tracker.save_enemy(named("Bandit"));

    // The room metadata holds the roster...
    let loaded = RoomStore::new(&room_dir);
    assert_eq!(engine::Backend::load(&loaded).unwrap().unwrap().len(), 1);
    // ...and the local mirror was written as the fallback copy.
    let mirror = LocalStore::new(&data_dir);
    assert_eq!(engine::Backend::load(&mirror).unwrap().unwrap().len(), 1);
}

#[test]
fn export_notifies_and_writes_the_document() {
    let dir = tempdir().unwrap();
    let mut tracker = local_tracker(dir.path());
    tracker.save_enemy(named("Bandit"));

    let out = dir.path().join("export.json");
    tracker.export_to(&out).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["version"], "3.0");
    assert_eq!(doc["enemies"].as_array().unwrap().len(), 1);
    assert!(
        tracker
            .notifier()
            .messages
            .iter()
            .any(|(m, _)| m == "Enemies exported!")
    );
}
