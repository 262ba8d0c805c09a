//! # flowlens-tui - Terminal User Interface
//!
//! Renders the flow table and body panel with ratatui and drives the
//! synchronous event loop: poll a key, route it through
//! [`AppState::handle_key`], redraw. All widgets are pure; every frame
//! is derived fresh from [`AppState`].
//!
//! ## Public API
//!
//! - [`run`] - Blocking event loop over an [`AppState`]
//! - [`widgets`] - Pure widgets, renderable into any buffer

pub mod event;
pub mod terminal;
pub mod widgets;

use flowlens_app::AppState;
use flowlens_core::prelude::*;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::Frame;

use crate::terminal::TerminalGuard;
use crate::widgets::{BodyPanel, FlowTable};

/// Key hints shown in the footer.
const HELP_LINE: &str =
    " q quit  ↑/↓ move  ⏎/space select  ^a all  / filter  t kind  p pin  P pinned  f format  ⇥ req/resp  d/D delete ";

/// Run the blocking event loop until the user quits.
///
/// The terminal is restored even on early error return because the
/// guard restores it on drop.
pub fn run(state: &mut AppState) -> Result<()> {
    let mut guard = TerminalGuard::init()?;
    info!("terminal ui started");

    let mut scroll_offset: usize = 0;
    while !state.should_quit {
        let scroll_request = state.scroll_to.take();
        guard.terminal.draw(|frame| {
            draw(frame, state, &mut scroll_offset, scroll_request);
        })?;

        if let Some(key) = event::poll()? {
            state.handle_key(&key, false);
        }
    }

    info!("terminal ui stopped");
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, scroll_offset: &mut usize, scroll_request: Option<usize>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Percentage(40),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let rows = state.table.visible(state.store.list());

    // Rows above the data area: header bar + column headers.
    let view_height = chunks[0].height.saturating_sub(2) as usize;
    if let Some(target) = scroll_request {
        *scroll_offset = clamp_scroll(*scroll_offset, target, view_height);
    }
    if *scroll_offset >= rows.len() {
        *scroll_offset = rows.len().saturating_sub(1);
    }

    frame.render_widget(
        FlowTable::new(&rows, &state.table, *scroll_offset),
        chunks[0],
    );

    let body = state.formatted_body();
    frame.render_widget(
        BodyPanel::new(body.as_ref(), state.body_tab, state.body_format),
        chunks[1],
    );

    render_footer(frame, chunks[2]);
}

/// Move the scroll window the minimal distance that brings `target`
/// into view.
fn clamp_scroll(offset: usize, target: usize, view_height: usize) -> usize {
    if view_height == 0 {
        return offset;
    }
    if target < offset {
        target
    } else if target >= offset + view_height {
        target + 1 - view_height
    } else {
        offset
    }
}

fn render_footer(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        ratatui::widgets::Paragraph::new(HELP_LINE)
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll_keeps_visible_target() {
        // Target already in the window: no movement.
        assert_eq!(clamp_scroll(5, 7, 10), 5);
        // Target above the window scrolls up exactly to it.
        assert_eq!(clamp_scroll(5, 2, 10), 2);
        // Target below the window scrolls down the minimal amount.
        assert_eq!(clamp_scroll(0, 12, 10), 3);
    }

    #[test]
    fn test_clamp_scroll_zero_height_is_noop() {
        assert_eq!(clamp_scroll(4, 9, 0), 4);
    }
}
