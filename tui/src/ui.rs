use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};

use engine::{EnemyRecord, HitTier, Mode, Severity, calculate};

use crate::app::{
    App, ATTACK_FIELDS, AttackDraft, BASE_FIELDS, Dialog, EditorForm, Tab,
};

const DIM: Style = Style::new().fg(Color::DarkGray);
const TITLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.area());

    draw_tabs(frame, chunks[0], app);
    match app.tab {
        Tab::List => draw_list(frame, chunks[1], app),
        Tab::Editor => draw_editor(frame, chunks[1], app),
    }
    draw_status(frame, chunks[2], app);

    if let Some(dialog) = &app.dialog {
        draw_dialog(frame, dialog);
    }
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let index = match app.tab {
        Tab::List => 0,
        Tab::Editor => 1,
    };
    let tabs = Tabs::new(vec!["Enemy List", "Editor"])
        .select(index)
        .highlight_style(TITLE)
        .block(Block::default().borders(Borders::ALL).title(" Enemy Tracker "));
    frame.render_widget(tabs, area);
}

fn draw_list(frame: &mut Frame, area: Rect, app: &App) {
    let roster = app.tracker.roster();
    if roster.is_empty() {
        let empty = Paragraph::new("No enemies added yet.\nPress 'a' to create one.")
            .alignment(Alignment::Center)
            .style(DIM)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(area);

    let items: Vec<ListItem> = roster
        .iter()
        .map(|enemy| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<20} ", truncated(&enemy.name, 20))),
                Span::styled(
                    format!("{}/{}", enemy.current_hp, enemy.max_hp),
                    hp_style(enemy),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Enemies "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, panes[0], &mut state);

    if let Some(enemy) = app.selected_enemy() {
        draw_detail(frame, panes[1], app, enemy);
    }
}

fn draw_detail(frame: &mut Frame, area: Rect, app: &App, enemy: &EnemyRecord) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let mut subtitle = enemy.kind.clone();
    if enemy.size > 1 {
        subtitle.push_str(&format!(" (Size {})", enemy.size));
    }
    if enemy.init > 0 {
        subtitle.push_str(&format!(" [Init {}]", enemy.init));
    }
    let header = Paragraph::new(vec![
        Line::from(Span::styled(enemy.name.clone(), TITLE)),
        Line::from(Span::styled(subtitle, DIM)),
    ]);
    frame.render_widget(header, chunks[0]);

    let gauge = Gauge::default()
        .ratio(enemy.hp_percent() / 100.0)
        .label(format!("{} / {}", enemy.current_hp, enemy.max_hp))
        .gauge_style(hp_style(enemy));
    frame.render_widget(gauge, chunks[1]);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "MOV {}  EVA {}  M.EVA {}  GRD {}  BAR {}  BASE +{}",
            enemy.mov, enemy.eva, enemy.meva, enemy.guard, enemy.barrier, enemy.base_damage
        ),
        Style::default().fg(Color::Cyan),
    )));

    if !enemy.attacks.is_empty() {
        lines.push(Line::raw(""));
        for attack in &enemy.attacks {
            lines.push(Line::from(vec![
                Span::raw(format!("• {}  ", attack.name)),
                Span::styled(
                    format!(
                        "+{} {} · {}",
                        attack.bonus,
                        attack.aspect.label(),
                        attack.element.label()
                    ),
                    DIM,
                ),
            ]));
            if attack.has_effect() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", attack.effect),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
    }

    let badges = [
        ("Weak", &enemy.weaknesses, Color::Red),
        ("Resist", &enemy.resistances, Color::Blue),
        ("Immune", &enemy.immunities, Color::Magenta),
        ("Absorb", &enemy.absorbs, Color::Green),
    ];
    if badges.iter().any(|(_, text, _)| !text.is_empty()) {
        lines.push(Line::raw(""));
        let mut spans = Vec::new();
        for (label, text, color) in badges {
            if !text.is_empty() {
                spans.push(Span::styled(
                    format!("{}: {}  ", label, text),
                    Style::default().fg(color),
                ));
            }
        }
        lines.push(Line::from(spans));
    }

    if !enemy.ability_desc.is_empty() {
        lines.push(Line::raw(""));
        if app.show_ability {
            lines.push(Line::from(Span::styled("Abilities ▲ [v]", TITLE)));
            lines.push(Line::raw(enemy.ability_desc.clone()));
        } else {
            lines.push(Line::from(Span::styled("Abilities ▼ [v]", DIM)));
        }
    }

    lines.push(Line::raw(""));
    lines.extend(calc_lines(app));

    let body = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, chunks[2]);
}

fn calc_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled("Damage Calculator", TITLE)));

    let mut tier_spans = vec![Span::raw("Tier ")];
    for (key, tier) in [
        ("1", HitTier::Noble),
        ("2", HitTier::Royal),
        ("3", HitTier::Imperial),
    ] {
        let label = format!("[{}] {} ({})  ", key, tier.label(), tier.value());
        let style = if app.calc.tier == Some(tier) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            DIM
        };
        tier_spans.push(Span::styled(label, style));
    }
    lines.push(Line::from(tier_spans));

    let crit_style = if app.calc.crit {
        Style::default().fg(Color::Black).bg(Color::Red)
    } else {
        DIM
    };
    lines.push(Line::from(vec![
        Span::styled("[c] Critical (×3)  ".to_string(), crit_style),
        Span::raw(format!(
            "Base {} (b/B)  Buff {:+} (u/U)  Pen {} (p/P)",
            app.calc.base, app.calc.buff, app.calc.pen
        )),
    ]));

    match calculate(app.calc.input()) {
        Some(outcome) => {
            let total_style = if outcome.crit {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::raw("Total Damage: "),
                Span::styled(outcome.total.to_string(), total_style),
                Span::raw("   [Enter] apply"),
            ]));
            lines.push(Line::from(Span::styled(outcome.text, DIM)));
        }
        None => {
            lines.push(Line::from(vec![
                Span::raw("Total Damage: "),
                Span::styled("—", DIM),
            ]));
            lines.push(Line::from(Span::styled("Select a hit tier", DIM)));
        }
    }
    lines
}

fn draw_editor(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.editor;
    let title = if form.selected_id.is_some() {
        " Edit Enemy "
    } else {
        " New Enemy "
    };

    let mut lines: Vec<Line> = Vec::new();
    for index in 0..form.field_count() {
        lines.push(field_line(form, index));
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = form.focus.saturating_sub(inner_height.saturating_sub(1)) as u16;

    let body = Paragraph::new(Text::from(lines))
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(body, area);
}

fn field_line(form: &EditorForm, index: usize) -> Line<'static> {
    let (label, value) = field_label_value(form, index);
    let focused = index == form.focus;
    let value_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<16}", label), DIM),
        Span::styled(format!("{}{}", value, cursor), value_style),
    ])
}

fn field_label_value(form: &EditorForm, index: usize) -> (String, String) {
    if index >= BASE_FIELDS {
        let rel = index - BASE_FIELDS;
        let (row, sub) = (rel / ATTACK_FIELDS, rel % ATTACK_FIELDS);
        let attack: &AttackDraft = &form.attacks[row];
        let label = |name: &str| format!("Atk {} {}", row + 1, name);
        return match sub {
            0 => (label("Name"), attack.name.clone()),
            1 => (label("Bonus"), attack.bonus.clone()),
            2 => (label("Aspect"), format!("‹ {} ›", attack.aspect.label())),
            3 => (label("Element"), format!("‹ {} ›", attack.element.label())),
            _ => (label("Effect"), attack.effect.clone()),
        };
    }
    match index {
        0 => ("Name".into(), form.name.clone()),
        1 => ("Type".into(), form.kind.clone()),
        2 => ("Max HP".into(), form.max_hp.clone()),
        3 => ("Current HP".into(), form.current_hp.clone()),
        4 => ("Size".into(), form.size.clone()),
        5 => ("Init".into(), form.init.clone()),
        6 => ("MOV".into(), form.mov.clone()),
        7 => ("EVA".into(), form.eva.clone()),
        8 => ("M.EVA".into(), form.meva.clone()),
        9 => ("Guard".into(), form.guard.clone()),
        10 => ("Barrier".into(), form.barrier.clone()),
        11 => ("Base Damage".into(), form.base_damage.clone()),
        12 => ("Weaknesses".into(), form.weaknesses.clone()),
        13 => ("Resistances".into(), form.resistances.clone()),
        14 => ("Immunities".into(), form.immunities.clone()),
        15 => ("Absorbs".into(), form.absorbs.clone()),
        _ => ("Abilities".into(), form.ability_desc.clone()),
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match app.tracker.mode() {
        Mode::Probing => ("Connecting to room…", DIM),
        Mode::Host => (
            "Connected to room - data synced",
            Style::default().fg(Color::Green),
        ),
        Mode::Local => (
            "Standalone mode - data saved locally",
            Style::default().fg(Color::Yellow),
        ),
    };
    let mut spans = vec![Span::styled("● ", style), Span::styled(text, style)];
    if let Some((message, severity)) = &app.tracker.notifier().last {
        let color = match severity {
            Severity::Success => Color::Green,
            Severity::Warning => Color::Red,
            Severity::Info => Color::Gray,
        };
        spans.push(Span::raw("   "));
        spans.push(Span::styled(message.clone(), Style::default().fg(color)));
    }

    let hints = match app.tab {
        Tab::List => {
            "j/k select  +/- HP  [/] step  a add  e edit  d del  1-3 tier  c crit  ⏎ apply  i import  x export  C clear  ⇥ tab  q quit"
        }
        Tab::Editor => {
            "↑/↓ field  ←/→ cycle  ^S save  ^A add atk  ^R del atk  ^D delete  Esc cancel  ⇥ tab"
        }
    };

    let status = Paragraph::new(vec![
        Line::from(spans),
        Line::from(Span::styled(hints, DIM)),
    ]);
    frame.render_widget(status, area);
}

fn draw_dialog(frame: &mut Frame, dialog: &Dialog) {
    let (title, lines): (&str, Vec<Line>) = match dialog {
        Dialog::ConfirmDelete { name, .. } => (
            " Delete Enemy ",
            vec![
                Line::raw(format!("Delete \"{}\"?", name)),
                Line::from(Span::styled("[y] delete   [n] keep", DIM)),
            ],
        ),
        Dialog::ConfirmClear { count } => (
            " Clear All ",
            vec![
                Line::raw(format!("Delete all {} enemies?", count)),
                Line::raw("This cannot be undone!"),
                Line::from(Span::styled("[y] clear   [n] keep", DIM)),
            ],
        ),
        Dialog::ImportPath { input } => (
            " Import Enemies ",
            vec![
                Line::raw("Path to document:"),
                Line::from(Span::styled(
                    format!("{}_", input),
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(Span::styled("[Enter] load   [Esc] cancel", DIM)),
            ],
        ),
        Dialog::ImportMode { .. } => (
            " Import Enemies ",
            vec![
                Line::raw("Replace all existing enemies?"),
                Line::from(Span::styled(
                    "[r] replace all   [a] add to existing   [Esc] cancel",
                    DIM,
                )),
            ],
        ),
        Dialog::Alert { message } => (
            " Notice ",
            vec![
                Line::raw(message.clone()),
                Line::from(Span::styled("press any key", DIM)),
            ],
        ),
    };

    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);
    let body = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(body, area);
}

fn hp_style(enemy: &EnemyRecord) -> Style {
    let pct = enemy.hp_percent();
    let color = if pct <= 25.0 {
        Color::Red
    } else if pct <= 60.0 {
        Color::Yellow
    } else {
        Color::Green
    };
    Style::default().fg(color)
}

fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
