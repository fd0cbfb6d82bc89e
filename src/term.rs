use std::io::{self, stdout, Stdout};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, terminal};

/// Where key presses come from.
pub trait InputSource {
    /// Returns the next pending key press, or `None` right away if there is none.
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>>;

    /// Blocks until a key is pressed.
    fn wait_key(&mut self) -> io::Result<KeyEvent>;
}

/// Owns the raw-mode, alternate-screen terminal for the lifetime of the program.
pub struct TermManager {
    stdout: Stdout,
    active: bool,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout(), active: false }
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::DisableBlinking)?;
        self.active = true;
        Ok(())
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }
}

impl InputSource for TermManager {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        while poll(Duration::ZERO)? {
            if let Some(ev) = key_press(read()?) {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn wait_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Some(ev) = key_press(read()?) {
                return Ok(ev);
            }
        }
    }
}

fn key_press(ev: Event) -> Option<KeyEvent> {
    match ev {
        // Some platforms report releases too, only act on presses
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(key),
        _ => None,
    }
}

/// Picks the grid size for the session: the terminal size unless overridden,
/// reduced to odd dimensions so the grid has a true center cell.
pub fn session_size(rows: Option<u16>, cols: Option<u16>) -> io::Result<(usize, usize)> {
    let (rows, cols) = match (rows, cols) {
        (Some(r), Some(c)) => (r, c),
        (r, c) => {
            let (width, height) = terminal::size()?;
            (r.unwrap_or(height), c.unwrap_or(width))
        }
    };

    Ok((to_odd(rows as usize), to_odd(cols as usize)))
}

fn to_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n.saturating_sub(1)
    } else {
        n
    }
}
