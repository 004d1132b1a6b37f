use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::domain::{ConversationLog, Role};

use super::app::{App, Overlay};

pub fn draw(frame: &mut Frame, app: &App, log: &ConversationLog, pending: usize) {
    let [header, body, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_header(frame, header, app, pending);
    draw_transcript(frame, body, app, log);
    draw_input(frame, input, app);

    match app.overlay() {
        Overlay::None => {}
        Overlay::History(text) => draw_popup(frame, "Chat History", text, Color::Cyan, 80, 70),
        Overlay::ConfirmQuit => draw_popup(
            frame,
            "Quit",
            "Do you really want to quit? (y/n)",
            Color::Yellow,
            50,
            20,
        ),
        Overlay::ConfirmPrintHistory => draw_popup(
            frame,
            "History",
            "Print chat history to console before exit? (y/n)",
            Color::Yellow,
            50,
            20,
        ),
    }

    if let Some(error) = app.current_error() {
        draw_popup(frame, error.title(), error.message(), Color::Red, 60, 30);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, pending: usize) {
    let mut spans = vec![
        Span::raw("Model: "),
        Span::styled(
            app.model().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if pending > 0 {
        spans.push(Span::styled(
            format!("  waiting for {pending} repl{}", if pending == 1 { "y" } else { "ies" }),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        "  F2 History  Ctrl+L Reset  Esc Quit",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, app: &App, log: &ConversationLog) {
    let lines: Vec<Line> = log
        .entries()
        .iter()
        .flat_map(|entry| {
            let style = match entry.role() {
                Role::User => Style::default().fg(Color::Green),
                Role::Model => Style::default(),
            };
            entry
                .display_line()
                .lines()
                .map(|l| Line::styled(l.to_string(), style))
                .collect::<Vec<_>>()
        })
        .collect();

    let block = Block::bordered().title(" Conversation ");
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let inner_height = area.height.saturating_sub(2);

    let total_rows = wrapped_rows(&lines, inner_width);
    let bottom = total_rows.saturating_sub(inner_height);
    let offset = bottom.saturating_sub(app.scroll_back());

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(app.input()).block(Block::bordered().title(" Message "));
    frame.render_widget(paragraph, area);

    if matches!(app.overlay(), Overlay::None) && app.current_error().is_none() {
        let cursor_x = area.x + 1 + app.input().chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_popup(
    frame: &mut Frame,
    title: &str,
    body: &str,
    color: Color,
    percent_x: u16,
    percent_y: u16,
) {
    let area = centered(frame.area(), percent_x, percent_y);
    let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(color));
    let paragraph = Paragraph::new(body.to_string())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Approximate row count after wrapping at `width` columns.
fn wrapped_rows(lines: &[Line], width: usize) -> u16 {
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}
