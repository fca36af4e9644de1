use std::path::Path;

use tracing::{debug, info};

use crate::roster::{EnemyRecord, HpChange, Roster};
use crate::store::{Mode, Persistence, Severity};
use crate::transfer::{ImportMode, TransferError, read_import, write_export};

/// Fire-and-forget notification sink. The host platform forwards these to the
/// room; standalone front ends surface them as toasts.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Sink for headless use.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _message: &str, _severity: Severity) {}
}

/// The single mutator: owns the roster, the storage selection, and the
/// notification sink. Every mutation persists before the call returns.
pub struct Tracker<N: Notifier> {
    roster: Roster,
    persistence: Persistence,
    notifier: N,
}

impl<N: Notifier> Tracker<N> {
    pub fn new(persistence: Persistence, notifier: N) -> Self {
        Self {
            roster: Roster::new(),
            persistence,
            notifier,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn mode(&self) -> Mode {
        self.persistence.mode()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Drive the startup probe; rehydrates the roster on the tick where the
    /// storage mode settles.
    pub fn poll_probe(&mut self) -> Option<Mode> {
        let settled = self.persistence.poll_probe();
        if settled.is_some() {
            self.reload();
        }
        settled
    }

    /// Settle storage selection immediately and rehydrate.
    pub fn resolve_now(&mut self) -> Mode {
        let mode = self.persistence.resolve_now();
        self.reload();
        mode
    }

    pub fn reload(&mut self) {
        self.roster = Roster::from_records(self.persistence.load());
        debug!(count = self.roster.len(), "roster rehydrated");
    }

    fn persist(&self) {
        self.persistence.save(self.roster.records());
    }

    /// Commit an editor draft: in-place update when the id is already
    /// rostered, otherwise a create.
    pub fn save_enemy(&mut self, record: EnemyRecord) {
        let replaced = self.roster.upsert(record);
        self.persist();
        info!(replaced, "enemy saved");
        self.notifier.notify("Enemy saved!", Severity::Success);
    }

    /// Delete by id; deleting an absent id is a no-op.
    pub fn delete_enemy(&mut self, id: &str) -> bool {
        if !self.roster.remove(id) {
            return false;
        }
        self.persist();
        self.notifier.notify("Enemy deleted", Severity::Warning);
        true
    }

    /// Clamp HP by `delta` and persist. Landing on exactly 0 fires a one-time
    /// defeated notification when host-connected; no state transition.
    pub fn change_hp(&mut self, id: &str, delta: i32) -> Option<HpChange> {
        let change = self.roster.change_hp(id, delta)?;
        if change.defeated() && self.persistence.is_host() {
            let name = self
                .roster
                .get(id)
                .map(|e| e.name.clone())
                .unwrap_or_default();
            self.notifier
                .notify(&format!("{} has been defeated!", name), Severity::Warning);
        }
        self.persist();
        Some(change)
    }

    /// Parse and merge an uploaded document. Malformed input errors out and
    /// leaves the roster untouched.
    pub fn import(&mut self, path: &Path, mode: ImportMode) -> Result<usize, TransferError> {
        let incoming = read_import(path)?;
        let count = incoming.len();
        match mode {
            ImportMode::Replace => self.roster.replace_all(incoming),
            ImportMode::Append => self.roster.append(incoming),
        }
        self.persist();
        self.notifier
            .notify(&format!("Imported {} enemies!", count), Severity::Success);
        Ok(count)
    }

    /// Merge an already-parsed record list (builtin encounters, pre-parsed
    /// uploads).
    pub fn import_records(&mut self, incoming: Vec<EnemyRecord>, mode: ImportMode) -> usize {
        let count = incoming.len();
        match mode {
            ImportMode::Replace => self.roster.replace_all(incoming),
            ImportMode::Append => self.roster.append(incoming),
        }
        self.persist();
        self.notifier
            .notify(&format!("Imported {} enemies!", count), Severity::Success);
        count
    }

    pub fn export_to(&mut self, path: &Path) -> Result<(), TransferError> {
        write_export(path, self.roster.records())?;
        self.notifier.notify("Enemies exported!", Severity::Success);
        Ok(())
    }

    /// Drop every record. Returns how many were cleared; 0 means there was
    /// nothing to clear (the front end alerts instead of confirming).
    pub fn clear_all(&mut self) -> usize {
        let count = self.roster.len();
        if count == 0 {
            return 0;
        }
        self.roster.clear();
        self.persist();
        self.notifier
            .notify("All enemies cleared", Severity::Warning);
        count
    }
}
