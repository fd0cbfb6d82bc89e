use std::io::{Stdout, Write};

use anyhow::Result;

use crate::clock::{Clock, SystemClock, TickScheduler, Wake};
use crate::config::GameConfig;
use crate::display::DisplaySurface;
use crate::menu::Menu;
use crate::session::{GameState, Session, StepOutcome};
use crate::term::{InputSource, TermManager};

/// Whether the program keeps going after a screen closes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the menus and hands control to a fresh [`Session`] for every game.
pub struct SnakeGame<W: Write, I: InputSource, C: Clock> {
    config: GameConfig,
    surface: DisplaySurface<W>,
    input: I,
    clock: C,
    high_score: u32,
    state: GameState,
}

impl SnakeGame<Stdout, TermManager, SystemClock> {
    pub fn new(config: GameConfig, rows: usize, cols: usize) -> Result<Self> {
        let surface = DisplaySurface::stdout(rows, cols, config.styles.background)?;
        SnakeGame::with_io(config, surface, TermManager::new(), SystemClock::new())
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.input.setup()?;
        self.surface.set_cursor_visibility(false)?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.surface.set_cursor_visibility(true)?;
        self.input.restore()?;
        Ok(())
    }
}

impl<W: Write, I: InputSource, C: Clock> SnakeGame<W, I, C> {
    pub fn with_io(
        config: GameConfig,
        surface: DisplaySurface<W>,
        input: I,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        Ok(SnakeGame {
            config,
            surface,
            input,
            clock,
            high_score: 0,
            state: GameState::Menu,
        })
    }

    /// Main menu loop. Returns once the player picks EXIT or presses Ctrl+C.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.set_state(GameState::Menu);

            let header = vec!["S N A K E".to_string(), format!("HIGH SCORE: {}", self.high_score)];
            let mut menu = Menu::new(header, vec!["PLAY".to_string(), "EXIT".to_string()]);
            if menu.choose(&mut self.surface, &mut self.input, &self.config)? != Some(1) {
                return Ok(());
            }

            if self.play()? == Flow::Quit {
                return Ok(());
            }
        }
    }

    fn play(&mut self) -> Result<Flow> {
        let rows = self.surface.rows();
        let cols = self.surface.cols();
        let mut session = Session::new(self.config.clone(), rows, cols, self.high_score);
        let scheduler = TickScheduler::new(self.config.poll_granularity());

        self.set_state(session.state());
        log::info!(
            "new game, interval {:?}, length {}",
            session.interval(),
            session.snake().len()
        );

        // None when the player walked away from the pause menu
        let outcome = loop {
            let outcome = session.step(self.clock.now());
            if outcome != StepOutcome::Alive {
                break Some(outcome);
            }
            session.render(&mut self.surface)?;

            let wake = scheduler.wait(
                session.interval(),
                &self.config.keys,
                &mut self.input,
                &self.clock,
                |dir| session.queue_turn(dir),
            )?;

            match wake {
                Wake::Elapsed => {}
                Wake::Quit => return Ok(Flow::Quit),
                Wake::Paused => {
                    session.pause();
                    self.set_state(session.state());

                    let mut menu = Menu::new(vec!["GAME CURRENTLY PAUSED"], vec!["RESUME", "QUIT"]);
                    match menu.choose(&mut self.surface, &mut self.input, &self.config)? {
                        Some(1) => {
                            session.resume();
                            self.set_state(session.state());
                            session.render(&mut self.surface)?;
                        }
                        Some(_) => {
                            session.end();
                            break None;
                        }
                        None => return Ok(Flow::Quit),
                    }
                }
            }
        };

        self.high_score = self.high_score.max(session.scoreboard().high_score());
        self.set_state(session.state());

        match outcome {
            Some(outcome) => self.game_over(outcome, session.scoreboard().score()),
            None => Ok(Flow::Continue),
        }
    }

    fn game_over(&mut self, outcome: StepOutcome, score: u32) -> Result<Flow> {
        let title = if outcome == StepOutcome::Won { "YOU WON!" } else { "GAME OVER!" };
        let header = vec![
            title.to_string(),
            format!("SCORE: {}", score),
            format!("HIGH SCORE: {}", self.high_score),
        ];

        let mut menu = Menu::new(header, vec!["CONTINUE".to_string()]);
        match menu.choose(&mut self.surface, &mut self.input, &self.config)? {
            Some(_) => Ok(Flow::Continue),
            None => Ok(Flow::Quit),
        }
    }

    fn set_state(&mut self, state: GameState) {
        log::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
