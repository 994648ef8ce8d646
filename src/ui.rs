//! Terminal UI rendering for epinet.
//!
//! Layout, top to bottom:
//! - Settings on the left; network, predictions and results on the right
//! - Mean epidemic curve of the current results
//! - Progress gauge while a task runs, otherwise the status line
//! - Keymap / input line
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Gauge, Paragraph, Sparkline},
    Frame,
};

use crate::render::{FieldView, NetworkView, RenderState, ResultsView};
use crate::predict::Predictions;
use crate::results::SummaryStats;
use crate::tea::{Mode, Notification, NotificationLevel};

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_HEADING: Color = Color::Cyan;
const COLOR_ERROR: Color = Color::Red;
const COLOR_PROGRESS: Color = Color::Green;

// Layout constants
const LABEL_WIDTH: usize = 22;
const CURVE_HEIGHT: u16 = 6;
/// Sparkline bars are integers; mean counts are scaled to keep fractions.
const CURVE_SCALE: f64 = 100.0;

// -----------------------------------------------------------------------------
// Context-sensitive keymap system
// -----------------------------------------------------------------------------

/// Context for determining which keybindings to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    /// No task running; all actions available.
    Idle { has_network: bool },
    /// A task is running; only cancel and quit.
    Busy,
    /// Editing a field value.
    Editing,
}

impl KeymapContext {
    pub fn from_render_state(state: &RenderState) -> Self {
        match state.mode {
            Mode::Editing(_) => KeymapContext::Editing,
            Mode::Normal if state.running.is_some() => KeymapContext::Busy,
            Mode::Normal => KeymapContext::Idle {
                has_network: state.network.is_some(),
            },
        }
    }
}

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::Idle { has_network } => {
            let network_group = vec![
                Keybinding("g", "generate"),
                Keybinding("i", "import"),
            ];
            let analysis_group = if has_network {
                vec![
                    Keybinding("n", "rewire"),
                    Keybinding("e", "export"),
                    Keybinding("a", "components"),
                    Keybinding("m", "giant only"),
                    Keybinding("t", "transitivity"),
                    Keybinding("d", "distances"),
                    Keybinding("s", "simulate"),
                ]
            } else {
                vec![]
            };
            vec![
                KeybindingGroup(network_group),
                KeybindingGroup(analysis_group),
                KeybindingGroup(vec![
                    Keybinding("Enter", "edit"),
                    Keybinding("r", "retain"),
                    Keybinding("x", "clear net"),
                    Keybinding("z", "clear data"),
                    Keybinding("R", "defaults"),
                    Keybinding("w", "save"),
                ]),
                KeybindingGroup(vec![Keybinding("q", "quit")]),
            ]
        }
        KeymapContext::Busy => vec![
            KeybindingGroup(vec![Keybinding("c", "cancel")]),
            KeybindingGroup(vec![Keybinding("q", "quit")]),
        ],
        KeymapContext::Editing => vec![KeybindingGroup(vec![
            Keybinding("Enter", "apply"),
            Keybinding("Esc", "cancel"),
        ])],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    render_main_layout(frame, state);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, frame.area());
    }
}

fn render_main_layout(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();

    let curve_height = if area.height > CURVE_HEIGHT + 6 {
        CURVE_HEIGHT
    } else {
        0
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(curve_height),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    let columns = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);
    render_fields(frame, state, columns[0]);
    render_summary(frame, state, columns[1]);

    if curve_height > 0 {
        render_curve(frame, state.results.as_ref(), chunks[1]);
    }
    render_separator(frame, chunks[2]);
    render_progress(frame, state, chunks[3]);
    render_statusbar(frame, state, chunks[4]);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(COLOR_HEADING)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Settings list; the selected row is reversed, a field with an error gets
/// the message on the following line.
fn render_fields(frame: &mut Frame, state: &RenderState, area: Rect) {
    let enabled = state.running.is_none();
    let mut lines = vec![heading("Settings")];
    for (idx, field) in state.fields.iter().enumerate() {
        lines.push(render_field_row(
            field,
            idx == state.selected,
            enabled,
            area.width,
        ));
        if let Some(error) = &field.error {
            lines.push(Line::from(Span::styled(
                format!("  {}", truncate(error, area.width.saturating_sub(2) as usize)),
                Style::default().fg(COLOR_ERROR),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{:<width$}", "Retain data", width = LABEL_WIDTH),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ),
        Span::raw(if state.retain_data { "yes" } else { "no" }),
    ]));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_field_row(field: &FieldView, is_selected: bool, enabled: bool, width: u16) -> Line<'static> {
    let value_width = (width as usize).saturating_sub(LABEL_WIDTH);
    let label = format!("{:<width$}", truncate(&field.label, LABEL_WIDTH), width = LABEL_WIDTH);
    let value = if field.editing {
        "…".to_string()
    } else {
        truncate(&field.value, value_width)
    };

    let (label_style, value_style) = if !enabled {
        let muted = Style::default().fg(COLOR_TEXT_MUTED);
        (muted, muted)
    } else if is_selected {
        let selected = Style::default().add_modifier(Modifier::REVERSED);
        (selected, selected)
    } else if field.error.is_some() {
        (Style::default().fg(COLOR_ERROR), Style::default().fg(COLOR_ERROR))
    } else {
        (Style::default().fg(COLOR_TEXT_DIMMED), Style::default())
    };

    Line::from(vec![
        Span::styled(label, label_style),
        Span::styled(value, value_style),
    ])
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", label, width = LABEL_WIDTH),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ),
        Span::raw(value),
    ])
}

fn fmt_opt<T>(value: Option<T>, f: impl FnOnce(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| "-".to_string())
}

fn fmt_fraction(value: f64) -> String {
    format!("{:.4}", value)
}

fn network_lines(network: Option<&NetworkView>) -> Vec<Line<'static>> {
    let mut lines = vec![heading("Network")];
    let Some(net) = network else {
        lines.push(Line::from(Span::styled(
            "No network. Press 'g' to generate or 'i' to import.",
            Style::default().fg(COLOR_TEXT_DIMMED),
        )));
        return lines;
    };
    lines.push(stat_line("Nodes", net.nodes.to_string()));
    lines.push(stat_line("Edges", net.edges.to_string()));
    lines.push(stat_line("Mean degree", format!("{:.3}", net.mean_degree)));
    lines.push(stat_line(
        "Components",
        fmt_opt(net.components.as_ref(), |c| c.count.to_string()),
    ));
    lines.push(stat_line(
        "Largest component",
        fmt_opt(net.components.as_ref(), |c| c.giant.to_string()),
    ));
    lines.push(stat_line("Transitivity", fmt_opt(net.transitivity, fmt_fraction)));
    lines.push(stat_line(
        "Diameter",
        fmt_opt(net.distances.as_ref(), |d| d.diameter.to_string()),
    ));
    lines.push(stat_line(
        "Mean distance",
        fmt_opt(net.distances.as_ref(), |d| format!("{:.3}", d.mean)),
    ));
    lines
}

fn prediction_lines(predictions: Option<&Predictions>) -> Vec<Line<'static>> {
    let Some(p) = predictions else {
        return Vec::new();
    };
    let mut lines = vec![heading("Predictions")];
    lines.push(stat_line("R0", format!("{:.3}", p.r0)));
    lines.push(stat_line("Critical T", fmt_opt(p.t_crit, fmt_fraction)));
    if let Some(t_cb) = p.t_cb {
        lines.push(stat_line("Daily T", fmt_fraction(t_cb)));
    }
    lines.push(stat_line("Mass action size", fmt_fraction(p.mass_action_size)));
    lines.push(stat_line("Network size", fmt_fraction(p.network_size)));
    lines
}

fn summary_cell(stats: Option<&SummaryStats>) -> String {
    match stats {
        Some(s) => format!(
            "n={} min={} max={} mean={:.1} sd={:.1}",
            s.n, s.min, s.max, s.mean, s.sd
        ),
        None => "-".to_string(),
    }
}

fn results_lines(results: Option<&ResultsView>) -> Vec<Line<'static>> {
    let Some(r) = results else {
        return Vec::new();
    };
    let mut lines = vec![heading("Results")];
    lines.push(stat_line(
        "Runs",
        format!("{} ({})", r.runs, r.sim_type.label()),
    ));
    if let Some(analysis) = &r.analysis {
        lines.push(stat_line(
            "Epidemic threshold",
            fmt_opt(analysis.threshold, |t| t.to_string()),
        ));
        lines.push(stat_line("Outbreaks", summary_cell(analysis.outbreaks.as_ref())));
        lines.push(stat_line("Epidemics", summary_cell(analysis.epidemics.as_ref())));
        lines.push(stat_line("All runs", summary_cell(analysis.all.as_ref())));
    }
    lines
}

fn render_summary(frame: &mut Frame, state: &RenderState, area: Rect) {
    let mut lines = network_lines(state.network.as_ref());
    for section in [
        prediction_lines(state.predictions.as_ref()),
        results_lines(state.results.as_ref()),
    ] {
        if !section.is_empty() {
            lines.push(Line::raw(""));
            lines.extend(section);
        }
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn curve_bars(curve: &[f64], width: usize) -> Vec<u64> {
    curve
        .iter()
        .take(width)
        .map(|&v| (v * CURVE_SCALE).round() as u64)
        .collect()
}

fn render_curve(frame: &mut Frame, results: Option<&ResultsView>, area: Rect) {
    let Some(results) = results else {
        return;
    };
    let bars = curve_bars(&results.mean_curve, area.width as usize);
    let sparkline = Sparkline::default()
        .data(&bars)
        .style(Style::default().fg(COLOR_PROGRESS));
    frame.render_widget(sparkline, area);
}

fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Gauge while a task runs, status text otherwise.
fn render_progress(frame: &mut Frame, state: &RenderState, area: Rect) {
    if state.running.is_none() {
        let line = Line::from(Span::styled(
            state.status.clone(),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    match state.progress_ratio() {
        Some(ratio) => {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(COLOR_PROGRESS).bg(Color::DarkGray))
                .ratio(ratio)
                .label(format!("{} {}%", state.status, state.progress));
            frame.render_widget(gauge, area);
        }
        None => {
            let line = Line::from(Span::styled(
                state.status.clone(),
                Style::default().fg(COLOR_PROGRESS),
            ));
            frame.render_widget(Paragraph::new(line), area);
        }
    }
}

fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = match state.mode {
        Mode::Editing(_) => render_input_line(state),
        Mode::Normal => render_keymap_line(state),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render keybindings legend for the bottom line.
/// When show_keymap is false: Shows just "?" (grayed out)
/// When show_keymap is true: Shows "? │ <full keymap legend>" with bright "?"
fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let ctx = KeymapContext::from_render_state(state);
    let groups = keybindings_for_context(ctx);

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let help_style = if state.show_keymap {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };
    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];

    if state.show_keymap {
        for group in groups.iter().filter(|g| !g.0.is_empty()) {
            spans.push(Span::styled(" │ ", sep_style));
            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    Line::from(spans)
}

/// Input prompt for the bottom line (replaces keymap while editing).
fn render_input_line(state: &RenderState) -> Line<'static> {
    let hint_style = Style::default().fg(COLOR_TEXT_MUTED);
    let cursor_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::SLOW_BLINK);

    let label = state
        .fields
        .iter()
        .find(|f| f.editing)
        .map(|f| f.label.clone())
        .unwrap_or_default();

    Line::from(vec![
        Span::styled("Enter • Esc  ", hint_style),
        Span::styled(format!("{label}: "), Style::default().fg(Color::Reset)),
        Span::styled(state.input_buffer.clone(), Style::default().fg(Color::White)),
        Span::styled("_", cursor_style),
    ])
}

/// Render notification message on the bottom line of the screen.
///
/// - Error: Red text with "Error:" prefix and bold styling
/// - Info: Green text without prefix
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
