//! Fixed-size grid of styled character cells, presented in one write per frame.

use std::io::{self, Write};

use crossterm::cursor::{self, MoveTo};
use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{execute, Command};
use serde::{Deserialize, Serialize};

use crate::error::DisplayError;

pub const MIN_ROWS: usize = 12;
pub const MIN_COLS: usize = 40;

/// Text attributes plus 256-colour palette indices for one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub fg: u8,
    pub bg: u8,
}

impl Style {
    pub const fn colors(fg: u8, bg: u8) -> Self {
        Style { bold: false, italic: false, underline: false, blink: false, fg, bg }
    }

    /// Appends the escape sequences that switch the terminal to this style.
    fn write_open(&self, out: &mut String) {
        // Writing into a String cannot fail
        let attrs = [
            (self.bold, Attribute::Bold),
            (self.italic, Attribute::Italic),
            (self.underline, Attribute::Underlined),
            (self.blink, Attribute::SlowBlink),
        ];
        for (on, attr) in attrs.iter() {
            if *on {
                let _ = SetAttribute(*attr).write_ansi(out);
            }
        }
        let _ = SetForegroundColor(Color::AnsiValue(self.fg)).write_ansi(out);
        let _ = SetBackgroundColor(Color::AnsiValue(self.bg)).write_ansi(out);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub fn blank(style: Style) -> Self {
        Cell { ch: ' ', style }
    }
}

/// The character grid the game draws into.
///
/// Every mutation goes through [`DisplaySurface::set_char`], which rejects
/// coordinates outside the grid instead of clamping them. Nothing reaches the
/// terminal until [`DisplaySurface::draw`] serializes the whole grid into a
/// single buffer and flushes it, which keeps rapid redraws from flickering.
pub struct DisplaySurface<W: Write> {
    rows: usize,
    cols: usize,
    blank: Cell,
    cells: Vec<Cell>,
    cursor_visible: bool,
    sink: W,
}

impl DisplaySurface<io::Stdout> {
    pub fn stdout(rows: usize, cols: usize, background: Style) -> Result<Self, DisplayError> {
        Self::with_sink(rows, cols, background, io::stdout())
    }
}

impl<W: Write> DisplaySurface<W> {
    /// Creates a surface writing frames to `sink`, every cell blank in the `background` style.
    pub fn with_sink(
        rows: usize,
        cols: usize,
        background: Style,
        sink: W,
    ) -> Result<Self, DisplayError> {
        if rows < MIN_ROWS || cols < MIN_COLS {
            return Err(DisplayError::TooSmall {
                rows,
                cols,
                min_rows: MIN_ROWS,
                min_cols: MIN_COLS,
            });
        }

        let blank = Cell::blank(background);
        Ok(DisplaySurface {
            rows,
            cols,
            blank,
            cells: vec![blank; rows * cols],
            // A fresh terminal shows its cursor
            cursor_visible: true,
            sink,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Integer-divided center. Only a true center cell when both dimensions are odd.
    pub fn find_center(&self) -> (i32, i32) {
        ((self.rows / 2) as i32, (self.cols / 2) as i32)
    }

    #[cfg(test)]
    pub fn cell(&self, row: i32, col: i32) -> Result<&Cell, DisplayError> {
        let idx = self.index(row, col)?;
        Ok(&self.cells[idx])
    }

    pub fn set_char(
        &mut self,
        row: i32,
        col: i32,
        ch: char,
        style: Style,
    ) -> Result<(), DisplayError> {
        let idx = self.index(row, col)?;
        self.cells[idx] = Cell { ch, style };
        Ok(())
    }

    /// Writes `text` left to right starting at `(row, col)`.
    pub fn put_str(
        &mut self,
        row: i32,
        col: i32,
        text: &str,
        style: Style,
    ) -> Result<(), DisplayError> {
        for (offset, ch) in text.chars().enumerate() {
            self.set_char(row, col + offset as i32, ch, style)?;
        }
        Ok(())
    }

    pub fn clear_grid(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = self.blank;
        }
    }

    /// Serializes the whole grid and emits it as one write, then flushes.
    pub fn draw(&mut self) -> Result<(), DisplayError> {
        let frame = self.render_frame();
        self.sink.write_all(frame.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }

    pub fn set_cursor_visibility(&mut self, visible: bool) -> Result<(), DisplayError> {
        if self.cursor_visible == visible {
            return Ok(());
        }

        if visible {
            execute!(self.sink, cursor::Show)?;
        } else {
            execute!(self.sink, cursor::Hide)?;
        }
        self.cursor_visible = visible;
        Ok(())
    }

    #[cfg(test)]
    pub fn sink(&self) -> &W {
        &self.sink
    }

    fn render_frame(&self) -> String {
        // Every cell costs roughly two colour sequences plus a reset
        let mut out = String::with_capacity(self.cells.len() * 24);
        let _ = MoveTo(0, 0).write_ansi(&mut out);

        for (row, line) in self.cells.chunks(self.cols).enumerate() {
            if row > 0 {
                // Raw mode: a bare \n would not return the carriage
                out.push_str("\r\n");
            }
            for cell in line {
                cell.style.write_open(&mut out);
                out.push(cell.ch);
                let _ = SetAttribute(Attribute::Reset).write_ansi(&mut out);
            }
        }

        // No trailing newline: it would scroll the bottom row off screen
        out
    }

    fn index(&self, row: i32, col: i32) -> Result<usize, DisplayError> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return Err(DisplayError::OutOfRange { row, col, rows: self.rows, cols: self.cols });
        }
        Ok(row as usize * self.cols + col as usize)
    }
}
