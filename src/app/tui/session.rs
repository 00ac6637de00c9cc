use std::io;

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Owns raw mode, the alternate screen and (while the viewer is open) mouse
/// capture. Whatever is still held is released on drop.
pub(super) struct TuiSession {
    active: bool,
    mouse_captured: bool,
}

impl TuiSession {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
        Ok(Self {
            active: true,
            mouse_captured: false,
        })
    }

    /// Viewer-open hook: taps on the story surface arrive as mouse events.
    pub(super) fn on_viewer_open(&mut self) -> Result<()> {
        if self.mouse_captured {
            return Ok(());
        }
        execute!(io::stdout(), EnableMouseCapture).context("failed to enable mouse capture")?;
        self.mouse_captured = true;
        Ok(())
    }

    /// Viewer-close hook: hand the mouse back to the terminal.
    pub(super) fn on_viewer_close(&mut self) -> Result<()> {
        if !self.mouse_captured {
            return Ok(());
        }
        execute!(io::stdout(), DisableMouseCapture).context("failed to disable mouse capture")?;
        self.mouse_captured = false;
        Ok(())
    }

    pub(super) fn leave(&mut self) -> Result<()> {
        self.on_viewer_close()?;
        if !self.active {
            return Ok(());
        }
        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(io::stdout(), LeaveAlternateScreen).context("failed to leave alternate screen")?;
        self.active = false;
        Ok(())
    }
}

impl Drop for TuiSession {
    fn drop(&mut self) {
        if self.mouse_captured {
            let _ = execute!(io::stdout(), DisableMouseCapture);
        }
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}
