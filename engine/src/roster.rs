use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attack delivery aspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aspect {
    #[default]
    Physical,
    Magical,
}

impl Aspect {
    pub const ALL: [Aspect; 2] = [Aspect::Physical, Aspect::Magical];

    pub fn label(self) -> &'static str {
        match self {
            Aspect::Physical => "Physical",
            Aspect::Magical => "Magical",
        }
    }

    pub fn cycled(self) -> Aspect {
        match self {
            Aspect::Physical => Aspect::Magical,
            Aspect::Magical => Aspect::Physical,
        }
    }
}

/// The twelve named elements an attack can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Steel,
    Flame,
    Frost,
    Storm,
    Gale,
    Stone,
    Tide,
    Venom,
    Light,
    Shadow,
    Spirit,
    Decay,
}

impl Element {
    pub const ALL: [Element; 12] = [
        Element::Steel,
        Element::Flame,
        Element::Frost,
        Element::Storm,
        Element::Gale,
        Element::Stone,
        Element::Tide,
        Element::Venom,
        Element::Light,
        Element::Shadow,
        Element::Spirit,
        Element::Decay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Element::Steel => "Steel",
            Element::Flame => "Flame",
            Element::Frost => "Frost",
            Element::Storm => "Storm",
            Element::Gale => "Gale",
            Element::Stone => "Stone",
            Element::Tide => "Tide",
            Element::Venom => "Venom",
            Element::Light => "Light",
            Element::Shadow => "Shadow",
            Element::Spirit => "Spirit",
            Element::Decay => "Decay",
        }
    }

    /// Next element in display order, wrapping around.
    pub fn cycled(self) -> Element {
        let idx = Element::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Element::ALL[(idx + 1) % Element::ALL.len()]
    }
}

/// One attack row on an enemy card. Order is display order; duplicates are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttackRecord {
    pub name: String,
    pub bonus: i32,
    pub aspect: Aspect,
    pub element: Element,
    pub effect: String,
}

impl Default for AttackRecord {
    fn default() -> Self {
        Self {
            name: "Attack".to_string(),
            bonus: 6,
            aspect: Aspect::Physical,
            element: Element::Steel,
            effect: String::new(),
        }
    }
}

impl AttackRecord {
    /// Effect text is only rendered when present and non-blank.
    pub fn has_effect(&self) -> bool {
        !self.effect.trim().is_empty()
    }
}

fn default_name() -> String {
    "Unnamed Enemy".to_string()
}

fn default_kind() -> String {
    "Humanoid".to_string()
}

fn default_hp() -> i32 {
    10
}

fn default_size() -> i32 {
    1
}

fn default_mov() -> i32 {
    4
}

fn default_eva() -> i32 {
    9
}

fn default_meva() -> i32 {
    8
}

/// Mint an opaque enemy id.
pub fn fresh_id() -> String {
    format!("enemy-{}", Uuid::new_v4())
}

/// A single tracked enemy. Field names follow the exported document format,
/// so every stat is independently defaulted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_hp")]
    pub max_hp: i32,
    #[serde(default = "default_hp")]
    pub current_hp: i32,
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default)]
    pub init: i32,
    #[serde(default = "default_mov")]
    pub mov: i32,
    #[serde(default = "default_eva")]
    pub eva: i32,
    #[serde(default = "default_meva")]
    pub meva: i32,
    #[serde(default)]
    pub guard: i32,
    #[serde(default)]
    pub barrier: i32,
    #[serde(default)]
    pub base_damage: i32,
    #[serde(default)]
    pub attacks: Vec<AttackRecord>,
    #[serde(default)]
    pub weaknesses: String,
    #[serde(default)]
    pub resistances: String,
    #[serde(default)]
    pub immunities: String,
    #[serde(default)]
    pub absorbs: String,
    #[serde(default)]
    pub ability_desc: String,
}

impl Default for EnemyRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: default_name(),
            kind: default_kind(),
            max_hp: default_hp(),
            current_hp: default_hp(),
            size: default_size(),
            init: 0,
            mov: default_mov(),
            eva: default_eva(),
            meva: default_meva(),
            guard: 0,
            barrier: 0,
            base_damage: 0,
            attacks: Vec::new(),
            weaknesses: String::new(),
            resistances: String::new(),
            immunities: String::new(),
            absorbs: String::new(),
            ability_desc: String::new(),
        }
    }
}

impl EnemyRecord {
    /// A defaulted record with a freshly minted id.
    pub fn new() -> Self {
        Self {
            id: fresh_id(),
            ..Self::default()
        }
    }

    /// HP fill percentage for bars, clamped into 0..=100.
    pub fn hp_percent(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        let pct = (self.current_hp as f64 / self.max_hp as f64) * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

/// Result of an HP mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub before: i32,
    pub after: i32,
}

impl HpChange {
    /// The clamped result landed on exactly 0. Notification-only; no flag is
    /// stored on the record.
    pub fn defeated(&self) -> bool {
        self.after == 0
    }
}

/// Ordered list of enemy records; the single source of truth for rendering
/// and editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<EnemyRecord>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<EnemyRecord>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[EnemyRecord] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EnemyRecord> {
        self.0.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EnemyRecord> {
        self.0.iter_mut().find(|e| e.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|e| e.id == id)
    }

    /// Replace the slot with a matching id in place, or push a new record.
    /// Returns true when an existing record was replaced.
    pub fn upsert(&mut self, record: EnemyRecord) -> bool {
        match self.position(&record.id) {
            Some(idx) => {
                self.0[idx] = record;
                true
            }
            None => {
                self.0.push(record);
                false
            }
        }
    }

    /// Remove by id. Removing an absent id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|e| e.id != id);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn append(&mut self, records: Vec<EnemyRecord>) {
        self.0.extend(records);
    }

    pub fn replace_all(&mut self, records: Vec<EnemyRecord>) {
        self.0 = records;
    }

    /// Clamp `current_hp + delta` into `[0, max_hp]`. Returns `None` when no
    /// record carries the id.
    pub fn change_hp(&mut self, id: &str, delta: i32) -> Option<HpChange> {
        let enemy = self.get_mut(id)?;
        let before = enemy.current_hp;
        enemy.current_hp = (before + delta).min(enemy.max_hp).max(0);
        Some(HpChange {
            before,
            after: enemy.current_hp,
        })
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a EnemyRecord;
    type IntoIter = std::slice::Iter<'a, EnemyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
