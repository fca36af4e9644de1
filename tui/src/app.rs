use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend as TerminalBackend;
use tracing::warn;

use engine::roster::fresh_id;
use engine::transfer::{default_export_filename, read_import};
use engine::{
    Aspect, AttackRecord, DamageInput, Element, EnemyRecord, HitTier, ImportMode, Mode, Notifier,
    RoomStore, Severity, Tracker,
};

/// The two mutually exclusive views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    List,
    Editor,
}

/// Toast sink for the status line; forwards to the room while the session is
/// host-connected.
pub struct ToastNotifier {
    room: Option<RoomStore>,
    pub last: Option<(String, Severity)>,
}

impl ToastNotifier {
    pub fn new(room: Option<RoomStore>) -> Self {
        Self { room, last: None }
    }

    /// Called once when the probe settles on local-only mode.
    pub fn disconnect_room(&mut self) {
        self.room = None;
    }
}

impl Notifier for ToastNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        if let Some(room) = &self.room {
            room.notify(message, severity);
        }
        self.last = Some((message.to_string(), severity));
    }
}

/// Per-card damage-calculator state. Reset whenever the card under it
/// changes or the list re-renders after an HP mutation, like the original
/// widget.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcState {
    pub tier: Option<HitTier>,
    pub crit: bool,
    pub base: i32,
    pub buff: i32,
    pub pen: i32,
}

impl CalcState {
    pub fn for_enemy(enemy: &EnemyRecord) -> Self {
        Self {
            base: enemy.base_damage,
            ..Self::default()
        }
    }

    /// Selecting a tier clears the others; selecting the active one
    /// deselects it. The calculator can never see two active tiers.
    pub fn toggle_tier(&mut self, tier: HitTier) {
        self.tier = if self.tier == Some(tier) {
            None
        } else {
            Some(tier)
        };
    }

    pub fn input(&self) -> DamageInput {
        DamageInput {
            tier: self.tier,
            crit: self.crit,
            base: self.base,
            buff: self.buff,
            pen: self.pen,
        }
    }

    pub fn adjust_base(&mut self, delta: i32) {
        self.base = (self.base + delta).clamp(0, 10);
    }

    pub fn adjust_buff(&mut self, delta: i32) {
        self.buff = (self.buff + delta).clamp(-10, 20);
    }

    pub fn adjust_pen(&mut self, delta: i32) {
        self.pen = (self.pen + delta).clamp(0, 10);
    }
}

/// Editable attack row; numeric input stays a string buffer until save.
#[derive(Debug, Clone)]
pub struct AttackDraft {
    pub name: String,
    pub bonus: String,
    pub aspect: Aspect,
    pub element: Element,
    pub effect: String,
}

impl Default for AttackDraft {
    fn default() -> Self {
        AttackDraft::from(&AttackRecord::default())
    }
}

impl From<&AttackRecord> for AttackDraft {
    fn from(attack: &AttackRecord) -> Self {
        Self {
            name: attack.name.clone(),
            bonus: attack.bonus.to_string(),
            aspect: attack.aspect,
            element: attack.element,
            effect: attack.effect.clone(),
        }
    }
}

impl AttackDraft {
    fn to_record(&self) -> AttackRecord {
        AttackRecord {
            name: self.name.clone(),
            bonus: parse_or(&self.bonus, 6),
            aspect: self.aspect,
            element: self.element,
            effect: self.effect.clone(),
        }
    }
}

fn parse_or(text: &str, default: i32) -> i32 {
    text.trim().parse().unwrap_or(default)
}

pub const BASE_FIELDS: usize = 17;
pub const ATTACK_FIELDS: usize = 5;

/// The editor's transient draft: field buffers plus the decoupled attack
/// list. Nothing touches the committed record until save.
#[derive(Debug, Clone)]
pub struct EditorForm {
    pub selected_id: Option<String>,
    pub name: String,
    pub kind: String,
    pub max_hp: String,
    pub current_hp: String,
    pub size: String,
    pub init: String,
    pub mov: String,
    pub eva: String,
    pub meva: String,
    pub guard: String,
    pub barrier: String,
    pub base_damage: String,
    pub weaknesses: String,
    pub resistances: String,
    pub immunities: String,
    pub absorbs: String,
    pub ability_desc: String,
    pub attacks: Vec<AttackDraft>,
    pub focus: usize,
}

impl EditorForm {
    /// Blank form for a new enemy: defaults plus one default attack.
    pub fn fresh() -> Self {
        Self {
            selected_id: None,
            name: String::new(),
            kind: "Humanoid".to_string(),
            max_hp: "10".to_string(),
            current_hp: "10".to_string(),
            size: "1".to_string(),
            init: "0".to_string(),
            mov: "4".to_string(),
            eva: "9".to_string(),
            meva: "8".to_string(),
            guard: "1".to_string(),
            barrier: "0".to_string(),
            base_damage: "0".to_string(),
            weaknesses: String::new(),
            resistances: String::new(),
            immunities: String::new(),
            absorbs: String::new(),
            ability_desc: String::new(),
            attacks: vec![AttackDraft::default()],
            focus: 0,
        }
    }

    pub fn load(enemy: &EnemyRecord) -> Self {
        Self {
            selected_id: Some(enemy.id.clone()),
            name: enemy.name.clone(),
            kind: enemy.kind.clone(),
            max_hp: enemy.max_hp.to_string(),
            current_hp: enemy.current_hp.to_string(),
            size: enemy.size.to_string(),
            init: enemy.init.to_string(),
            mov: enemy.mov.to_string(),
            eva: enemy.eva.to_string(),
            meva: enemy.meva.to_string(),
            guard: enemy.guard.to_string(),
            barrier: enemy.barrier.to_string(),
            base_damage: enemy.base_damage.to_string(),
            weaknesses: enemy.weaknesses.clone(),
            resistances: enemy.resistances.clone(),
            immunities: enemy.immunities.clone(),
            absorbs: enemy.absorbs.clone(),
            ability_desc: enemy.ability_desc.clone(),
            attacks: enemy.attacks.iter().map(AttackDraft::from).collect(),
            focus: 0,
        }
    }

    /// Commit the draft. Blank or unparseable inputs fall back to the same
    /// defaults a saved form always had.
    pub fn to_record(&self) -> EnemyRecord {
        let name = self.name.trim();
        let kind = self.kind.trim();
        EnemyRecord {
            id: self.selected_id.clone().unwrap_or_else(fresh_id),
            name: if name.is_empty() {
                "Unnamed Enemy".to_string()
            } else {
                name.to_string()
            },
            kind: if kind.is_empty() {
                "Humanoid".to_string()
            } else {
                kind.to_string()
            },
            max_hp: parse_or(&self.max_hp, 10),
            current_hp: parse_or(&self.current_hp, 10),
            size: parse_or(&self.size, 1),
            init: parse_or(&self.init, 0),
            mov: parse_or(&self.mov, 4),
            eva: parse_or(&self.eva, 9),
            meva: parse_or(&self.meva, 8),
            guard: parse_or(&self.guard, 0),
            barrier: parse_or(&self.barrier, 0),
            base_damage: parse_or(&self.base_damage, 0),
            attacks: self.attacks.iter().map(AttackDraft::to_record).collect(),
            weaknesses: self.weaknesses.clone(),
            resistances: self.resistances.clone(),
            immunities: self.immunities.clone(),
            absorbs: self.absorbs.clone(),
            ability_desc: self.ability_desc.clone(),
        }
    }

    pub fn field_count(&self) -> usize {
        BASE_FIELDS + self.attacks.len() * ATTACK_FIELDS
    }

    pub fn focus_up(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focus_down(&mut self) {
        self.focus = (self.focus + 1).min(self.field_count().saturating_sub(1));
    }

    /// Attack row and sub-field under the focus, when the focus sits past
    /// the base fields.
    pub fn focused_attack(&self) -> Option<(usize, usize)> {
        if self.focus < BASE_FIELDS {
            return None;
        }
        let rel = self.focus - BASE_FIELDS;
        Some((rel / ATTACK_FIELDS, rel % ATTACK_FIELDS))
    }

    /// True when the focused field cycles through fixed choices instead of
    /// taking text.
    pub fn focus_is_choice(&self) -> bool {
        matches!(self.focused_attack(), Some((_, 2)) | Some((_, 3)))
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        if let Some((idx, sub)) = self.focused_attack() {
            let attack = self.attacks.get_mut(idx)?;
            return match sub {
                0 => Some(&mut attack.name),
                1 => Some(&mut attack.bonus),
                4 => Some(&mut attack.effect),
                _ => None,
            };
        }
        let buffer = match self.focus {
            0 => &mut self.name,
            1 => &mut self.kind,
            2 => &mut self.max_hp,
            3 => &mut self.current_hp,
            4 => &mut self.size,
            5 => &mut self.init,
            6 => &mut self.mov,
            7 => &mut self.eva,
            8 => &mut self.meva,
            9 => &mut self.guard,
            10 => &mut self.barrier,
            11 => &mut self.base_damage,
            12 => &mut self.weaknesses,
            13 => &mut self.resistances,
            14 => &mut self.immunities,
            15 => &mut self.absorbs,
            16 => &mut self.ability_desc,
            _ => return None,
        };
        Some(buffer)
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.pop();
        }
    }

    pub fn cycle_choice(&mut self) {
        if let Some((idx, sub)) = self.focused_attack() {
            if let Some(attack) = self.attacks.get_mut(idx) {
                match sub {
                    2 => attack.aspect = attack.aspect.cycled(),
                    3 => attack.element = attack.element.cycled(),
                    _ => {}
                }
            }
        }
    }

    pub fn add_attack(&mut self) {
        self.attacks.push(AttackDraft::default());
        // Jump to the new row's name field.
        self.focus = BASE_FIELDS + (self.attacks.len() - 1) * ATTACK_FIELDS;
    }

    pub fn remove_focused_attack(&mut self) {
        if let Some((idx, _)) = self.focused_attack() {
            if idx < self.attacks.len() {
                self.attacks.remove(idx);
                self.focus = self.focus.min(self.field_count().saturating_sub(1));
            }
        }
    }
}

/// Modal overlays; while one is open it owns the keyboard.
#[derive(Debug, Clone)]
pub enum Dialog {
    ConfirmDelete { id: String, name: String },
    ConfirmClear { count: usize },
    ImportPath { input: String },
    ImportMode { path: PathBuf },
    Alert { message: String },
}

pub struct App {
    pub tracker: Tracker<ToastNotifier>,
    pub tab: Tab,
    pub selected: usize,
    pub hp_step: i32,
    pub calc: CalcState,
    pub show_ability: bool,
    pub editor: EditorForm,
    pub dialog: Option<Dialog>,
    pub should_quit: bool,
}

impl App {
    pub fn new(mut tracker: Tracker<ToastNotifier>) -> Self {
        // Sessions without a room to probe are already settled; hydrate now.
        if tracker.mode() != Mode::Probing {
            tracker.reload();
        }
        let calc = tracker
            .roster()
            .records()
            .first()
            .map(CalcState::for_enemy)
            .unwrap_or_default();
        Self {
            tracker,
            tab: Tab::List,
            selected: 0,
            hp_step: 1,
            calc,
            show_ability: false,
            editor: EditorForm::fresh(),
            dialog: None,
            should_quit: false,
        }
    }

    pub fn run<B: TerminalBackend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| crate::ui::draw(frame, &self))?;

            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key);
                    }
                }
            }

            if let Some(mode) = self.tracker.poll_probe() {
                if mode == Mode::Local {
                    self.tracker.notifier_mut().disconnect_room();
                }
                self.clamp_selection();
                self.refresh_calc();
            }
        }
        Ok(())
    }

    pub fn selected_enemy(&self) -> Option<&EnemyRecord> {
        self.tracker.roster().records().get(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.tracker.roster().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn refresh_calc(&mut self) {
        self.calc = self
            .selected_enemy()
            .map(CalcState::for_enemy)
            .unwrap_or_default();
        self.show_ability = false;
    }

    fn select(&mut self, index: usize) {
        let len = self.tracker.roster().len();
        if len == 0 {
            return;
        }
        self.selected = index.min(len - 1);
        self.refresh_calc();
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.dialog.is_some() {
            self.on_dialog_key(key);
            return;
        }
        match self.tab {
            Tab::List => self.on_list_key(key),
            Tab::Editor => self.on_editor_key(key),
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.tab = Tab::Editor,
            KeyCode::Up | KeyCode::Char('k') => self.select(self.selected.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.select(self.selected + 1),
            KeyCode::Char('a') => {
                self.editor = EditorForm::fresh();
                self.tab = Tab::Editor;
            }
            KeyCode::Char('e') => {
                if let Some(enemy) = self.selected_enemy() {
                    self.editor = EditorForm::load(enemy);
                    self.tab = Tab::Editor;
                }
            }
            KeyCode::Char('d') => {
                if let Some(enemy) = self.selected_enemy() {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id: enemy.id.clone(),
                        name: enemy.name.clone(),
                    });
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.apply_hp(self.hp_step),
            KeyCode::Char('-') | KeyCode::Char('_') => self.apply_hp(-self.hp_step),
            KeyCode::Char('[') => self.hp_step = (self.hp_step - 1).max(1),
            KeyCode::Char(']') => self.hp_step += 1,
            KeyCode::Char('1') => self.calc.toggle_tier(HitTier::Noble),
            KeyCode::Char('2') => self.calc.toggle_tier(HitTier::Royal),
            KeyCode::Char('3') => self.calc.toggle_tier(HitTier::Imperial),
            KeyCode::Char('c') => self.calc.crit = !self.calc.crit,
            KeyCode::Char('b') => self.calc.adjust_base(1),
            KeyCode::Char('B') => self.calc.adjust_base(-1),
            KeyCode::Char('u') => self.calc.adjust_buff(1),
            KeyCode::Char('U') => self.calc.adjust_buff(-1),
            KeyCode::Char('p') => self.calc.adjust_pen(1),
            KeyCode::Char('P') => self.calc.adjust_pen(-1),
            KeyCode::Enter => self.apply_calculated_damage(),
            KeyCode::Char('v') => self.show_ability = !self.show_ability,
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('i') => {
                self.dialog = Some(Dialog::ImportPath {
                    input: String::new(),
                })
            }
            KeyCode::Char('C') => {
                let count = self.tracker.roster().len();
                self.dialog = Some(if count == 0 {
                    Dialog::Alert {
                        message: "No enemies to clear!".to_string(),
                    }
                } else {
                    Dialog::ConfirmClear { count }
                });
            }
            _ => {}
        }
    }

    fn apply_hp(&mut self, delta: i32) {
        if let Some(id) = self.selected_enemy().map(|e| e.id.clone()) {
            self.tracker.change_hp(&id, delta);
            // The list re-renders, which resets the card's calculator.
            self.refresh_calc();
        }
    }

    fn apply_calculated_damage(&mut self) {
        let Some(outcome) = engine::calculate(self.calc.input()) else {
            return;
        };
        if outcome.total > 0 {
            self.apply_hp(-outcome.total);
        }
    }

    fn export(&mut self) {
        let path = PathBuf::from(default_export_filename());
        if let Err(err) = self.tracker.export_to(&path) {
            warn!(%err, "export failed");
            self.dialog = Some(Dialog::Alert {
                message: format!("Failed to export: {}", err),
            });
        }
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save_editor(),
                KeyCode::Char('a') => self.editor.add_attack(),
                KeyCode::Char('r') => self.editor.remove_focused_attack(),
                KeyCode::Char('d') => {
                    if let Some(id) = self.editor.selected_id.clone() {
                        let name = self
                            .tracker
                            .roster()
                            .get(&id)
                            .map(|e| e.name.clone())
                            .unwrap_or_default();
                        self.dialog = Some(Dialog::ConfirmDelete { id, name });
                    }
                }
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Esc => {
                // Cancel discards the draft.
                self.editor = EditorForm::fresh();
                self.tab = Tab::List;
            }
            KeyCode::Tab => self.tab = Tab::List,
            KeyCode::Up => self.editor.focus_up(),
            KeyCode::Down => self.editor.focus_down(),
            KeyCode::Left | KeyCode::Right if self.editor.focus_is_choice() => {
                self.editor.cycle_choice()
            }
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Char(c) => self.editor.insert_char(c),
            _ => {}
        }
    }

    fn save_editor(&mut self) {
        let record = self.editor.to_record();
        let id = record.id.clone();
        self.tracker.save_enemy(record);
        self.editor = EditorForm::fresh();
        self.tab = Tab::List;
        if let Some(pos) = self.tracker.roster().position(&id) {
            self.select(pos);
        }
    }

    fn on_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.clone() else {
            return;
        };
        match dialog {
            Dialog::Alert { .. } => self.dialog = None,
            Dialog::ConfirmDelete { id, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.tracker.delete_enemy(&id);
                    if self.editor.selected_id.as_deref() == Some(id.as_str()) {
                        self.editor = EditorForm::fresh();
                        self.tab = Tab::List;
                    }
                    self.clamp_selection();
                    self.refresh_calc();
                    self.dialog = None;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                _ => {}
            },
            Dialog::ConfirmClear { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.tracker.clear_all();
                    self.selected = 0;
                    self.refresh_calc();
                    self.dialog = None;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                _ => {}
            },
            Dialog::ImportPath { mut input } => match key.code {
                KeyCode::Esc => self.dialog = None,
                KeyCode::Enter => {
                    let path = PathBuf::from(input.trim());
                    // Parse before asking replace-vs-append, so malformed
                    // documents never prompt.
                    self.dialog = Some(match read_import(&path) {
                        Ok(_) => Dialog::ImportMode { path },
                        Err(err) => Dialog::Alert {
                            message: format!("Failed to import: {}", err),
                        },
                    });
                }
                KeyCode::Backspace => {
                    input.pop();
                    self.dialog = Some(Dialog::ImportPath { input });
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    self.dialog = Some(Dialog::ImportPath { input });
                }
                _ => {}
            },

            Dialog::ImportMode { path } => match key.code {
                KeyCode::Char('r') => self.finish_import(&path, ImportMode::Replace),
                KeyCode::Char('a') => self.finish_import(&path, ImportMode::Append),
                KeyCode::Esc => self.dialog = None,
                _ => {}
            },
        }
    }

    fn finish_import(&mut self, path: &std::path::Path, mode: ImportMode) {
        self.dialog = match self.tracker.import(path, mode) {
            Ok(_) => None,
            Err(err) => Some(Dialog::Alert {
                message: format!("Failed to import: {}", err),
            }),
        };
        self.clamp_selection();
        self.refresh_calc();
    }
}
