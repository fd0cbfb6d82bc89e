use std::io::Write;

use crate::display::{DisplaySurface, Style};
use crate::error::DisplayError;

const SCORE_PREFIX: &str = "SCORE / TOTAL-FOOD: ";
const SPEED_PREFIX: &str = "SPEED   (TILE/SEC): ";

/// The two lines above the playfield: food eaten and current speed.
pub struct ScoreBoard {
    score: u32,
    speed: u64,
    high_score: u32,
}

impl ScoreBoard {
    /// Starts a fresh score, carrying over the best score seen so far.
    pub fn new(high_score: u32) -> Self {
        ScoreBoard { score: 0, speed: 0, high_score }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> u64 {
        self.speed
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn score_event(&mut self) {
        self.score += 1;
        self.high_score = self.high_score.max(self.score);
    }

    pub fn set_speed(&mut self, tiles_per_sec: u64) {
        self.speed = tiles_per_sec;
    }

    pub fn render<W: Write>(
        &self,
        surface: &mut DisplaySurface<W>,
        style: Style,
    ) -> Result<(), DisplayError> {
        let (_, center_col) = surface.find_center();
        let col = center_col - ((SCORE_PREFIX.len() + SPEED_PREFIX.len()) / 4) as i32;

        // Pad so a shorter number overwrites the digits of a longer one
        surface.put_str(0, col, &format!("{}{:<5}", SCORE_PREFIX, self.score), style)?;
        surface.put_str(1, col, &format!("{}{:<5}", SPEED_PREFIX, self.speed), style)?;
        Ok(())
    }
}
