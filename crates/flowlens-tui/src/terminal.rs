//! Terminal setup and teardown
//!
//! Raw mode and the alternate screen are entered on init and restored
//! on drop, so a panic or early return cannot leave the user's shell
//! in a broken state.

use std::io::Stdout;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use flowlens_core::prelude::*;

/// Owns the ratatui terminal and restores the host terminal on drop.
pub struct TerminalGuard {
    pub terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn init() -> Result<Self> {
        enable_raw_mode().terminal_context("enabling raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).terminal_context("entering alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| Error::TerminalInit(e.to_string()))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("failed to disable raw mode: {e}");
        }
        if let Err(e) = execute!(std::io::stdout(), LeaveAlternateScreen) {
            warn!("failed to leave alternate screen: {e}");
        }
    }
}
