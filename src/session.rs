//! One game of Snake, from the first move to the crash.
//!
//! [`Session`] owns all per-game state and advances it one tick at a time
//! with [`Session::step`]. Drawing is a separate call, [`Session::render`],
//! and waiting for the next tick is left to the caller (see
//! [`crate::clock::TickScheduler`]), so the rules can be driven directly in
//! tests without a terminal or real time.

use std::io::Write;
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::clock::Speed;
use crate::config::GameConfig;
use crate::display::DisplaySurface;
use crate::error::DisplayError;
use crate::food::{Food, Powerup};
use crate::scoreboard::ScoreBoard;
use crate::snake::{Direction, Playfield, Snake};
use crate::Coords;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    Crashed,
    /// No free cell is left for food.
    Won,
}

pub struct Session<R: Rng = ThreadRng> {
    config: GameConfig,
    rng: R,
    field: Playfield,
    snake: Snake,
    food: Food,
    powerup: Powerup,
    speed: Speed,
    self_collision: bool,
    scoreboard: ScoreBoard,
    pending_turn: Option<Direction>,
    state: GameState,
    needs_repaint: bool,
}

impl Session<ThreadRng> {
    pub fn new(config: GameConfig, rows: usize, cols: usize, high_score: u32) -> Self {
        Session::new_with_rng(config, rows, cols, high_score, rand::thread_rng())
    }
}

impl<R: Rng> Session<R> {
    pub fn new_with_rng(
        config: GameConfig,
        rows: usize,
        cols: usize,
        high_score: u32,
        rng: R,
    ) -> Session<R> {
        let field = Playfield::for_grid(rows, cols);
        let start = field.interior_center();

        // Keep the whole starting body off the left border
        let room = (start.1 - field.left - 1).max(1) as u16;
        let length = config.initial_length.min(room);
        if length < config.initial_length {
            log::warn!(
                "initial length {} does not fit, starting with {}",
                config.initial_length,
                length
            );
        }

        let speed = Speed::new(&config.speed);
        let mut scoreboard = ScoreBoard::new(high_score);
        scoreboard.set_speed(speed.tiles_per_sec());

        Session {
            snake: Snake::new(start, length, Direction::Right),
            self_collision: config.self_collision,
            config,
            rng,
            field,
            food: Food::default(),
            powerup: Powerup::new(),
            speed,
            scoreboard,
            pending_turn: None,
            state: GameState::Playing,
            needs_repaint: true,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    pub fn interval(&self) -> Duration {
        self.speed.interval()
    }

    /// Remembers a turn for the next step. A later turn before that step
    /// replaces it, unless it would reverse the snake.
    pub fn queue_turn(&mut self, dir: Direction) {
        if dir != self.snake.get_direction().opposite() {
            self.pending_turn = Some(dir);
        }
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
        }
    }

    /// Back to playing; the next render repaints the whole grid.
    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
            self.needs_repaint = true;
        }
    }

    pub fn end(&mut self) {
        self.state = GameState::GameOver;
    }

    /// Advances the game by one tick. `now` is session time, used for powerup timing.
    pub fn step(&mut self, now: Duration) -> StepOutcome {
        if let Some(dir) = self.pending_turn.take() {
            self.snake.set_direction(dir);
        }
        self.snake.move_step();

        if self.food.pos().is_none() && !self.respawn_food() {
            return self.finish(StepOutcome::Won);
        }

        if self.config.powerups.enabled {
            let cooldown = self.config.powerup_cooldown();
            let food = self.food.pos();
            self.powerup.try_spawn(&mut self.rng, &self.field, &self.snake, food, now, cooldown);
        }

        let head = self.snake.head();

        if self.food.is_at(head) {
            self.scoreboard.score_event();
            self.snake.grow();
            self.speed.speed_up();
            self.scoreboard.set_speed(self.speed.tiles_per_sec());
            log::debug!(
                "score {}, speed {} tiles/s",
                self.scoreboard.score(),
                self.scoreboard.speed()
            );
            if !self.respawn_food() {
                return self.finish(StepOutcome::Won);
            }
        }

        if self.powerup.is_at(head) {
            let factor = self.config.powerups.slow_motion_factor;
            self.powerup.activate(now, &mut self.speed, &mut self.self_collision, factor);
            self.scoreboard.set_speed(self.speed.tiles_per_sec());
        }

        let duration = self.config.powerup_duration();
        if self.powerup.is_active() && self.powerup.is_expired(now, duration) {
            let factor = self.config.powerups.slow_motion_factor;
            let configured = self.config.self_collision;
            self.powerup
                .deactivate(now, &mut self.speed, &mut self.self_collision, configured, factor);
            self.scoreboard.set_speed(self.speed.tiles_per_sec());
        }

        if self.snake.hits_self(self.self_collision) || self.snake.hits_boundary(&self.field) {
            return self.finish(StepOutcome::Crashed);
        }

        StepOutcome::Alive
    }

    /// Draws the current frame and flushes it.
    pub fn render<W: Write>(
        &mut self,
        surface: &mut DisplaySurface<W>,
    ) -> Result<(), DisplayError> {
        if self.needs_repaint {
            surface.clear_grid();
            self.draw_border(surface)?;
            self.needs_repaint = false;
        }

        let glyphs = &self.config.glyphs;
        let styles = &self.config.styles;

        self.erase(surface, self.snake.prev_tail())?;

        if let Some((row, col)) = self.food.pos() {
            surface.set_char(row, col, glyphs.food, styles.food)?;
        }
        if let Some((row, col)) = self.powerup.pos() {
            let kind = self.powerup.kind();
            surface.set_char(row, col, kind.glyph(glyphs), kind.style(styles))?;
        }

        for &(row, col) in self.snake.body().iter().skip(1) {
            surface.set_char(row, col, glyphs.body, styles.snake_body)?;
        }
        let (row, col) = self.snake.head();
        surface.set_char(row, col, self.snake.head_char(glyphs), styles.snake_head)?;

        self.scoreboard.render(surface, styles.scoreboard)?;
        surface.draw()
    }

    fn respawn_food(&mut self) -> bool {
        let avoid = self.powerup.pos();
        self.food.spawn(&mut self.rng, &self.field, &self.snake, avoid).is_some()
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.state = GameState::GameOver;
        log::info!(
            "session over: {:?}, score {}, length {}",
            outcome,
            self.scoreboard.score(),
            self.snake.len()
        );
        outcome
    }

    fn draw_border<W: Write>(&self, surface: &mut DisplaySurface<W>) -> Result<(), DisplayError> {
        let f = &self.field;
        let (ch, style) = (self.config.glyphs.border, self.config.styles.border);

        for row in f.top..=f.bottom {
            surface.set_char(row, f.left, ch, style)?;
            surface.set_char(row, f.right, ch, style)?;
        }
        for col in f.left..=f.right {
            surface.set_char(f.top, col, ch, style)?;
            surface.set_char(f.bottom, col, ch, style)?;
        }
        Ok(())
    }

    /// Blanks a vacated cell, or puts the border back if a tail was lying on it.
    fn erase<W: Write>(
        &self,
        surface: &mut DisplaySurface<W>,
        (row, col): Coords,
    ) -> Result<(), DisplayError> {
        if self.field.is_interior((row, col)) {
            surface.set_char(row, col, ' ', self.config.styles.background)
        } else {
            surface.set_char(row, col, self.config.glyphs.border, self.config.styles.border)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::food::PowerupKind;

    const ROWS: usize = 13;
    const COLS: usize = 41;

    fn config() -> GameConfig {
        let mut config = GameConfig::default();
        config.powerups.enabled = false;
        config
    }

    fn session(config: GameConfig) -> Session<StdRng> {
        Session::new_with_rng(config, ROWS, COLS, 0, StdRng::seed_from_u64(42))
    }

    fn surface() -> DisplaySurface<Vec<u8>> {
        let background = GameConfig::default().styles.background;
        DisplaySurface::with_sink(ROWS, COLS, background, Vec::new()).unwrap()
    }

    #[test]
    fn starts_centered_heading_right() {
        let s = session(config());
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.snake().body(), &[(7, 20)]);
        assert_eq!(s.snake().get_direction(), Direction::Right);
        assert_eq!(s.scoreboard().speed(), 5);
    }

    #[test]
    fn first_step_spawns_food_off_the_snake() {
        let mut s = session(config());
        assert_eq!(s.step(Duration::ZERO), StepOutcome::Alive);
        let food = s.food.pos().unwrap();
        assert!(s.field.is_interior(food));
        assert!(!s.snake().contains(food));
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let mut c = config();
        c.initial_length = 3;
        let mut s = session(c);
        s.food.place((7, 21));

        assert_eq!(s.step(Duration::ZERO), StepOutcome::Alive);
        assert_eq!(s.snake().body(), &[(7, 21), (7, 20), (7, 19), (7, 18)]);
        assert_eq!(s.scoreboard().score(), 1);
        assert_eq!(s.interval(), Duration::from_millis(170));
        assert_eq!(s.scoreboard().speed(), 5);

        let food = s.food.pos().unwrap();
        assert!(!s.snake().contains(food));
    }

    #[test]
    fn interval_bottoms_out_at_the_floor() {
        let mut c = config();
        c.speed.initial_interval_ms = 100;
        let mut s = session(c);

        let mut seen = vec![];
        for _ in 0..8 {
            let head = s.snake().head();
            s.food.place((head.0, head.1 + 1));
            assert_eq!(s.step(Duration::ZERO), StepOutcome::Alive);
            seen.push(s.interval().as_millis());
        }
        assert_eq!(seen, vec![85, 72, 61, 52, 50, 50, 50, 50]);
        assert_eq!(s.snake().len(), 9);
    }

    #[test]
    fn runs_into_the_right_border() {
        let mut s = session(config());
        let mut steps = 0;
        loop {
            steps += 1;
            // park the food where it cannot be reached
            s.food.place((4, 1));
            match s.step(Duration::ZERO) {
                StepOutcome::Alive => continue,
                outcome => {
                    assert_eq!(outcome, StepOutcome::Crashed);
                    break;
                }
            }
        }
        assert_eq!(steps, 20);
        assert_eq!(s.snake().head(), (7, 40));
        assert_eq!(s.state(), GameState::GameOver);
    }

    #[test]
    fn queued_turns_obey_reversal_rule() {
        let mut s = session(config());
        s.food.place((4, 1));

        s.queue_turn(Direction::Left);
        s.step(Duration::ZERO);
        assert_eq!(s.snake().head(), (7, 21));

        s.queue_turn(Direction::Up);
        s.queue_turn(Direction::Down);
        s.step(Duration::ZERO);
        assert_eq!(s.snake().head(), (8, 21));
    }

    #[test]
    fn reversal_does_not_drop_an_earlier_turn() {
        let mut c = config();
        c.initial_length = 3;
        let mut s = session(c);
        s.food.place((4, 1));

        s.queue_turn(Direction::Up);
        s.queue_turn(Direction::Left);
        s.step(Duration::ZERO);
        assert_eq!(s.snake().get_direction(), Direction::Up);
        assert_eq!(s.snake().head(), (6, 20));
    }

    #[test]
    fn filling_the_board_wins() {
        let mut s = session(config());
        // interior is the 1x2 strip (4,1)-(4,2)
        s.field = Playfield { top: 3, bottom: 5, left: 0, right: 3 };
        s.snake = Snake::new((4, 1), 1, Direction::Right);
        s.food.place((4, 2));

        assert_eq!(s.step(Duration::ZERO), StepOutcome::Won);
        assert_eq!(s.state(), GameState::GameOver);
        assert_eq!(s.scoreboard().score(), 1);
        assert_eq!(s.snake().body(), &[(4, 2), (4, 1)]);
    }

    fn curl(s: &mut Session<StdRng>) -> StepOutcome {
        // a 5-long snake turning down, left, up bites its own tail
        let mut last = StepOutcome::Alive;
        for &dir in [Direction::Down, Direction::Left, Direction::Up].iter() {
            s.food.place((4, 1));
            s.queue_turn(dir);
            last = s.step(Duration::ZERO);
        }
        last
    }

    #[test]
    fn self_collision_ends_the_game() {
        let mut c = config();
        c.initial_length = 5;
        let mut s = session(c);
        assert_eq!(curl(&mut s), StepOutcome::Crashed);
    }

    #[test]
    fn self_collision_can_be_disabled() {
        let mut c = config();
        c.initial_length = 5;
        c.self_collision = false;
        let mut s = session(c);
        assert_eq!(curl(&mut s), StepOutcome::Alive);
        assert!(s.snake().body()[1..].contains(&s.snake().head()));
    }

    #[test]
    fn slow_motion_powerup_wears_off() {
        let mut c = GameConfig::default();
        c.speed.initial_interval_ms = 50;
        let mut s = session(c);
        s.food.place((4, 1));
        s.powerup.place((7, 21), PowerupKind::SlowMotion);

        s.step(Duration::from_secs(1));
        assert!(s.powerup.is_active());
        assert_eq!(s.interval(), Duration::from_millis(100));
        assert_eq!(s.scoreboard().speed(), 10);

        s.step(Duration::from_secs(5));
        assert_eq!(s.interval(), Duration::from_millis(100));

        s.step(Duration::from_secs(11));
        assert!(!s.powerup.is_active());
        assert_eq!(s.interval(), Duration::from_millis(50));
    }

    #[test]
    fn no_collision_powerup_suspends_self_check() {
        let mut c = GameConfig::default();
        c.initial_length = 5;
        let mut s = session(c);
        s.food.place((4, 1));
        s.powerup.place((8, 20), PowerupKind::NoCollision);

        assert_eq!(curl(&mut s), StepOutcome::Alive);
        assert!(!s.self_collision);

        s.food.place((4, 1));
        s.step(Duration::from_secs(10));
        assert!(s.self_collision);
    }

    #[test]
    fn render_draws_frame_and_erases_tail() {
        let mut c = config();
        c.initial_length = 2;
        let mut s = session(c);
        let mut out = surface();
        s.food.place((4, 1));

        s.render(&mut out).unwrap();
        assert_eq!(out.cell(3, 0).unwrap().ch, '#');
        assert_eq!(out.cell(12, 40).unwrap().ch, '#');
        assert_eq!(out.cell(7, 19).unwrap().ch, '*');

        s.step(Duration::ZERO);
        s.render(&mut out).unwrap();
        assert_eq!(out.cell(7, 21).unwrap().ch, '>');
        assert_eq!(out.cell(7, 20).unwrap().ch, '*');
        assert_eq!(out.cell(7, 19).unwrap().ch, ' ');
        assert_eq!(out.cell(4, 1).unwrap().ch, '*');
        assert_eq!(out.cell(0, 10).unwrap().ch, 'S');
    }

    #[test]
    fn resume_repaints_everything() {
        let mut s = session(config());
        let mut out = surface();
        s.render(&mut out).unwrap();

        s.pause();
        assert_eq!(s.state(), GameState::Paused);
        // a pause screen drawn over the grid
        out.clear_grid();
        out.put_str(6, 10, "PAUSED", GameConfig::default().styles.menu_text).unwrap();

        s.resume();
        assert_eq!(s.state(), GameState::Playing);
        s.render(&mut out).unwrap();
        assert_eq!(out.cell(6, 10).unwrap().ch, ' ');
        assert_eq!(out.cell(3, 0).unwrap().ch, '#');
    }
}
