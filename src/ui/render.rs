use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::auth::Session;

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(5),    // Session panel
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_session_panel(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title_line = Line::from(Span::styled("  Signon", styles::title_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_session_panel(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = vec![Line::raw("")];

    match (&app.state, &app.session) {
        (AppState::SigningIn, _) => {
            lines.push(Line::from(Span::styled(
                "Signing in...",
                styles::muted_style(),
            )));
        }
        (_, Session::Authenticated(profile)) => {
            lines.push(Line::from(Span::styled(
                "User Authenticated",
                styles::success_style(),
            )));
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled("Signed in as ", styles::muted_style()),
                Span::raw(profile.display_name().to_string()),
            ]));
        }
        (_, Session::Unauthenticated) => {
            lines.push(Line::from(Span::styled(
                "Not signed in",
                styles::muted_style(),
            )));
            if let Some(ref error) = app.last_error {
                lines.push(Line::raw(""));
                lines.push(Line::from(Span::styled(
                    error.clone(),
                    styles::error_style(),
                )));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.state == AppState::SigningIn {
        vec![Span::styled("[q] Quit", styles::key_hint_style())]
    } else if app.is_signed_in() {
        vec![
            Span::styled("[s] Sign out", styles::key_hint_style()),
            Span::raw("  "),
            Span::styled("[q] Quit", styles::key_hint_style()),
        ]
    } else {
        vec![
            Span::styled("[enter] Sign in", styles::key_hint_style()),
            Span::raw("  "),
            Span::styled("[q] Quit", styles::key_hint_style()),
        ]
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(hints)).block(block), area);
}
