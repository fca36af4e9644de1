pub mod content;
pub mod damage;
pub mod roster;
pub mod store;
pub mod tracker;
pub mod transfer;

pub use damage::{DamageBreakdown, DamageInput, HitTier, calculate};
pub use roster::{Aspect, AttackRecord, Element, EnemyRecord, HpChange, Roster};
pub use store::{Backend, LocalStore, Mode, Persistence, RoomStore, Severity, StoreError};
pub use tracker::{Notifier, NullNotifier, Tracker};
pub use transfer::{ImportMode, RosterDocument, TransferError, export_document, parse_import};
