//! crossterm-backed [`Terminal`] adapter.

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::tty::IsTty;
use crossterm::{execute, queue};
use dispatch::Terminal;

/// Draws frames on an output stream.
///
/// Only an interactive stream gets the alternate screen and in-place redraws;
/// otherwise frames are appended as plain text.
pub struct ScreenTerminal<W: Write> {
    out: W,
    interactive: bool,
    in_alternate: bool,
}

impl ScreenTerminal<Stdout> {
    /// Draws on stdout, redrawing in place only when it is a TTY.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let interactive = out.is_tty();
        Self::new(out, interactive)
    }
}

impl<W: Write> ScreenTerminal<W> {
    /// Draws on `out`; `interactive` enables the alternate screen and in-place redraws.
    pub fn new(out: W, interactive: bool) -> Self {
        Self {
            out,
            interactive,
            in_alternate: false,
        }
    }
}

impl<W: Write> Terminal for ScreenTerminal<W> {
    fn enter_alternate_screen(&mut self) -> io::Result<()> {
        if self.interactive && !self.in_alternate {
            execute!(self.out, EnterAlternateScreen)?;
            self.in_alternate = true;
        }
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> io::Result<()> {
        if self.in_alternate {
            execute!(self.out, LeaveAlternateScreen)?;
            self.in_alternate = false;
        }
        Ok(())
    }

    fn refresh_screen(&mut self) -> io::Result<()> {
        if self.in_alternate {
            queue!(self.out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> Drop for ScreenTerminal<W> {
    fn drop(&mut self) {
        if self.in_alternate {
            let _ = execute!(self.out, LeaveAlternateScreen);
        }
    }
}

/// Leaves the alternate screen on stdout regardless of who entered it.
pub fn force_restore() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
