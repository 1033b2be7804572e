use chatpane_core::{Role, Session, Turn};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::App;

pub(super) const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) const ACCENT: Color = Color::Rgb(59, 130, 246);

const PANEL_W: u16 = 64;
const CHAT_PANEL_H: u16 = 28;
const CAPTURE_PANEL_H: u16 = 11;
const MAX_INPUT_ROWS: u16 = 6;

pub(super) fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let session = app.widget.session();

    if !session.is_open() {
        render_launcher(frame, area);
        return;
    }
    if session.is_capture_active() {
        render_capture(session, frame, area);
    } else {
        render_chat(app, frame, area);
    }
}

/// Bottom-right rectangle clamped to `area`.
fn anchored(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect::new(
        area.x + area.width - w,
        area.y + area.height - h,
        w,
        h,
    )
}

fn title(text: &str) -> Span<'_> {
    Span::styled(
        text,
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )
}

// ── closed ───────────────────────────────────────────────────────────────────

fn render_launcher(frame: &mut Frame, area: Rect) {
    let rect = anchored(area, 22, 3);
    let button = Paragraph::new(Line::from(vec![
        Span::styled(" 💬 chat ", Style::default().fg(Color::White).bg(ACCENT)),
        Span::styled(" ctrl+o", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(button, rect);
}

// ── capture mode ─────────────────────────────────────────────────────────────

fn render_capture(session: &Session, frame: &mut Frame, area: Rect) {
    let rect = anchored(area, PANEL_W, CAPTURE_PANEL_H);
    frame.render_widget(Clear, rect);

    let draft = &session.state.capture_draft;
    let mut lines = vec![Line::raw("")];
    lines.extend(draft_lines(draft.text(), draft.cursor(), true));
    lines.push(Line::raw(""));
    if let Some(notice) = &session.state.validation_notice {
        lines.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        " The key is stored unencrypted on this machine.",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        " Do not use this in production.",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        " enter save · esc close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(title(" API key ")),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(form, rect);
}

// ── chat mode ────────────────────────────────────────────────────────────────

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let rect = anchored(area, PANEL_W, CHAT_PANEL_H);
    frame.render_widget(Clear, rect);

    let session = app.widget.session();
    let busy = session.is_in_flight();
    let draft = &session.state.draft;
    let input = draft_lines(draft.text(), draft.cursor(), false);
    let input_h = (input.len() as u16).clamp(1, MAX_INPUT_ROWS) + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(input_h)])
        .split(rect);

    // ── transcript ────────────────────────────────────────────────────────────
    let mut lines: Vec<Line> = vec![Line::raw("")];
    for turn in session.transcript().turns() {
        lines.extend(turn_lines(turn));
    }
    if busy {
        lines.push(Line::from(Span::styled(
            format!("  {} typing…", SPINNER[app.spin_i % SPINNER.len()]),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let header = Line::from(vec![
        title(" Claude Chat "),
        Span::styled(
            format!("{}  ctrl+r reset key · esc close ", app.model),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(header),
        )
        .wrap(Wrap { trim: false });

    // Scroll limits are in wrapped rows, not logical lines.
    let inner_w = chunks[0].width.saturating_sub(2);
    let view_h = chunks[0].height.saturating_sub(2);
    let total = u16::try_from(log.line_count(inner_w)).unwrap_or(u16::MAX);
    // line_count includes the block's borders.
    let max_scroll = total.saturating_sub(2).saturating_sub(view_h);
    app.max_scroll = max_scroll;
    if app.scroll == u16::MAX {
        app.scroll = max_scroll;
    }
    app.scroll = app.scroll.min(max_scroll);
    let log = log.scroll((app.scroll, 0));
    frame.render_widget(log, chunks[0]);

    // ── input box ─────────────────────────────────────────────────────────────
    let border_col = if busy { Color::DarkGray } else { ACCENT };
    let label = if busy {
        " sending… "
    } else {
        " message · shift+enter newline "
    };
    let rows = input.len() as u16;
    let input_scroll = rows.saturating_sub(MAX_INPUT_ROWS);
    let input_widget = Paragraph::new(input)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_col))
                .title(Span::styled(label, Style::default().fg(border_col))),
        )
        .scroll((input_scroll, 0));
    frame.render_widget(input_widget, chunks[1]);
}

pub(super) fn turn_lines(turn: &Turn) -> Vec<Line<'static>> {
    let (style, alignment) = match turn.role {
        Role::User => (Style::default().fg(Color::White).bg(ACCENT), Alignment::Right),
        Role::Assistant => (
            Style::default().fg(Color::Black).bg(Color::Gray),
            Alignment::Left,
        ),
    };
    let mut lines: Vec<Line<'static>> = turn
        .content
        .split('\n')
        .map(|l| Line::from(Span::styled(format!(" {l} "), style)).alignment(alignment))
        .collect();
    lines.push(Line::raw(""));
    lines
}

/// Draft text split into rows with the cursor drawn as an inverted cell.
/// `masked` replaces every character with a bullet.
pub(super) fn draft_lines(text: &str, cursor: usize, masked: bool) -> Vec<Line<'static>> {
    let shown = |s: &str| -> String {
        if masked {
            "•".repeat(s.chars().count())
        } else {
            s.to_string()
        }
    };
    let cursor_style = Style::default().fg(Color::Black).bg(Color::White);

    let mut lines = Vec::new();
    let mut start = 0;
    for row in text.split('\n') {
        let end = start + row.len();
        let mut spans = vec![Span::raw(" ")];
        if (start..=end).contains(&cursor) {
            let at = cursor - start;
            let (before, rest) = row.split_at(at);
            let mut chars = rest.chars();
            let cur = chars.next();
            spans.push(Span::raw(shown(before)));
            spans.push(Span::styled(
                cur.map(|c| shown(&c.to_string())).unwrap_or_else(|| " ".into()),
                cursor_style,
            ));
            spans.push(Span::raw(shown(chars.as_str())));
        } else {
            spans.push(Span::raw(shown(row)));
        }
        lines.push(Line::from(spans));
        start = end + 1;
    }
    lines
}
