use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRects {
    pub top: Rect,
    pub stage: Rect,
    pub hud: Rect,
    pub hud_status: Rect,
    pub hud_logs: Rect,
}

/// Split the terminal into a one-line top bar, the stage and a HUD strip.
pub fn stage_layout(area: Rect, hud_height: u16, status_width: u16) -> StageRects {
    let hud_height = hud_height.max(4).min(area.height.saturating_sub(3).max(4));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // top bar
            Constraint::Min(1),             // stage
            Constraint::Length(hud_height), // hud
        ])
        .split(area);

    let hud = chunks[2];
    let hud_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(status_width), Constraint::Min(1)])
        .split(hud);

    StageRects {
        top: chunks[0],
        stage: chunks[1],
        hud,
        hud_status: hud_cols[0],
        hud_logs: hud_cols[1],
    }
}
