use std::io::Write;

use crossterm::event::KeyCode;

use crate::clock::is_ctrl_c;
use crate::config::GameConfig;
use crate::display::DisplaySurface;
use crate::error::DisplayError;
use crate::term::InputSource;

/// Blank rows between the header and the first option.
const HEADER_GAP: i32 = 1;
/// Columns between the cursor glyph and the option text.
const CURSOR_GAP: i32 = 2;

/// A centred list of header lines and selectable options.
pub struct Menu {
    header: Vec<String>,
    options: Vec<String>,
    /// 1-based index of the highlighted option.
    cursor: usize,
}

impl Menu {
    pub fn new<S: Into<String>>(header: Vec<S>, options: Vec<S>) -> Self {
        Menu {
            header: header.into_iter().map(Into::into).collect(),
            options: options.into_iter().map(Into::into).collect(),
            cursor: 1,
        }
    }

    pub fn selection(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor, ignoring moves past either end.
    pub fn move_cursor(&mut self, offset: i32) {
        let to = self.cursor as i32 + offset;
        if to >= 1 && to <= self.options.len() as i32 {
            self.cursor = to as usize;
        }
    }

    pub fn render<W: Write>(
        &self,
        surface: &mut DisplaySurface<W>,
        config: &GameConfig,
    ) -> Result<(), DisplayError> {
        let styles = &config.styles;
        surface.clear_grid();

        let (center_row, center_col) = surface.find_center();
        let lines = self.header.len() + self.options.len();
        let widest = self
            .header
            .iter()
            .chain(self.options.iter())
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        let left = center_col - widest as i32 / 2;
        let mut row = center_row - (lines / 2) as i32 - HEADER_GAP;

        for line in &self.header {
            surface.put_str(row, left, line, styles.menu_text)?;
            row += 1;
        }
        row += HEADER_GAP;

        for (i, option) in self.options.iter().enumerate() {
            surface.put_str(row, left, option, styles.menu_option)?;
            if i + 1 == self.cursor {
                surface.set_char(row, left - CURSOR_GAP, config.glyphs.cursor, styles.cursor)?;
            }
            row += 1;
        }
        Ok(())
    }

    /// Shows the menu until an option is picked. `None` means Ctrl+C.
    pub fn choose<W, I>(
        &mut self,
        surface: &mut DisplaySurface<W>,
        input: &mut I,
        config: &GameConfig,
    ) -> Result<Option<usize>, DisplayError>
    where
        W: Write,
        I: InputSource,
    {
        loop {
            self.render(surface, config)?;
            surface.draw()?;

            let ev = input.wait_key()?;
            if is_ctrl_c(&ev) {
                return Ok(None);
            }

            let keys = &config.keys;
            match ev.code {
                KeyCode::Up => self.move_cursor(-1),
                KeyCode::Down => self.move_cursor(1),
                KeyCode::Char(c) if c.to_ascii_lowercase() == keys.up => self.move_cursor(-1),
                KeyCode::Char(c) if c.to_ascii_lowercase() == keys.down => self.move_cursor(1),
                KeyCode::Enter => return Ok(Some(self.selection())),
                _ => {}
            }
        }
    }
}
