use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use sprig_core::logging::{LogEntry, LogLevel};

use crate::layout::StageRects;

/// Everything the chrome around the stage displays.
pub struct ShellView<'a> {
    pub title: &'a str,
    pub status_line: &'a str,
    pub hud_status: Vec<String>,
    pub logs: Vec<LogEntry>,
}

/// Draw the top bar and HUD, and hand the stage area to `stage`.
pub fn render_shell(
    f: &mut Frame,
    rects: StageRects,
    view: ShellView<'_>,
    stage: impl FnOnce(&mut Frame, Rect),
) {
    let top = Paragraph::new(Line::from(vec![
        Span::styled(" SPRIG ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("| {} | {}", view.title, view.status_line)),
    ]));
    f.render_widget(top, rects.top);

    stage(f, rects.stage);

    let status = Paragraph::new(Text::from(
        view.hud_status.into_iter().map(Line::from).collect::<Vec<_>>(),
    ))
    .block(Block::default().borders(Borders::ALL).title("SPRITE"));
    f.render_widget(status, rects.hud_status);

    let visible = rects.hud_logs.height.saturating_sub(2) as usize;
    let skip = view.logs.len().saturating_sub(visible);
    let logs = Paragraph::new(
        view.logs
            .iter()
            .skip(skip)
            .map(log_line)
            .collect::<Vec<_>>(),
    )
    .block(Block::default().borders(Borders::ALL).title("LOG"));
    f.render_widget(logs, rects.hud_logs);
}

fn log_line(entry: &LogEntry) -> Line<'_> {
    let color = match entry.level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    };
    Line::from(vec![
        Span::styled(
            format!("{:5} ", entry.level),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(entry.message.as_str()),
    ])
}
