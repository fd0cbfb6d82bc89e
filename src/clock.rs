//! Time sources, the tick interval, and the wait phase between ticks.

use std::io;
use std::thread::sleep;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{KeyBindings, SpeedConfig};
use crate::snake::Direction;
use crate::term::InputSource;

/// Session time. Injected so the loop can be driven without real sleeps.
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    fn sleep(&self, d: Duration);
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, d: Duration) {
        sleep(d);
    }
}

/// Milliseconds between ticks. Eating food shrinks it, never below the floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Speed {
    interval_ms: u64,
    min_interval_ms: u64,
    speed_up_percent: u8,
}

impl Speed {
    pub fn new(config: &SpeedConfig) -> Self {
        Speed {
            interval_ms: config.initial_interval_ms,
            min_interval_ms: config.min_interval_ms,
            speed_up_percent: config.speed_up_percent,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn tiles_per_sec(&self) -> u64 {
        1000 / self.interval_ms.max(1)
    }

    pub fn speed_up(&mut self) {
        let percent = self.speed_up_percent as f64 / 100.0;
        let scaled = (self.interval_ms as f64 * percent).round() as u64;
        self.interval_ms = scaled.max(self.min_interval_ms);
    }

    pub fn slow_down(&mut self, factor: u64) {
        self.interval_ms = self.interval_ms.saturating_mul(factor);
    }

    /// Undoes [`Speed::slow_down`], clamped to the floor.
    pub fn restore(&mut self, factor: u64) {
        self.interval_ms = (self.interval_ms / factor.max(1)).max(self.min_interval_ms);
    }
}

/// What a key press asks for during play.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Pause,
    Quit,
}

impl Command {
    pub fn from_key(ev: &KeyEvent, keys: &KeyBindings) -> Option<Command> {
        if is_ctrl_c(ev) {
            return Some(Command::Quit);
        }

        match ev.code {
            KeyCode::Up => Some(Command::Turn(Direction::Up)),
            KeyCode::Down => Some(Command::Turn(Direction::Down)),
            KeyCode::Left => Some(Command::Turn(Direction::Left)),
            KeyCode::Right => Some(Command::Turn(Direction::Right)),
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if c == keys.up {
                    Some(Command::Turn(Direction::Up))
                } else if c == keys.down {
                    Some(Command::Turn(Direction::Down))
                } else if c == keys.left {
                    Some(Command::Turn(Direction::Left))
                } else if c == keys.right {
                    Some(Command::Turn(Direction::Right))
                } else if c == keys.pause {
                    Some(Command::Pause)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wake {
    /// The interval ran out; time for the next tick.
    Elapsed,
    Paused,
    Quit,
}

/// Runs the gap between two ticks: check input, sleep one slice, repeat.
pub struct TickScheduler {
    granularity: Duration,
}

impl TickScheduler {
    pub fn new(granularity: Duration) -> Self {
        TickScheduler { granularity }
    }

    /// Waits out `interval`, handing every steering command to `turn` as it arrives.
    ///
    /// Returns early on pause or quit. Input is only looked at here, so a
    /// pause never interrupts a frame that is being rendered.
    pub fn wait<I, C, F>(
        &self,
        interval: Duration,
        keys: &KeyBindings,
        input: &mut I,
        clock: &C,
        mut turn: F,
    ) -> io::Result<Wake>
    where
        I: InputSource,
        C: Clock,
        F: FnMut(Direction),
    {
        let deadline = clock.now() + interval;

        loop {
            while let Some(ev) = input.poll_key()? {
                match Command::from_key(&ev, keys) {
                    Some(Command::Turn(dir)) => turn(dir),
                    Some(Command::Pause) => return Ok(Wake::Paused),
                    Some(Command::Quit) => return Ok(Wake::Quit),
                    None => {}
                }
            }

            let now = clock.now();
            if now >= deadline {
                return Ok(Wake::Elapsed);
            }
            clock.sleep(self.granularity.min(deadline - now));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use crate::term::testing::ScriptedInput;

    fn speed(initial: u64, min: u64, percent: u8) -> Speed {
        Speed::new(&SpeedConfig {
            initial_interval_ms: initial,
            min_interval_ms: min,
            speed_up_percent: percent,
        })
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn speed_up_rounds_and_clamps() {
        let mut s = speed(100, 50, 85);
        s.speed_up();
        assert_eq!(s.interval_ms(), 85);

        let mut seen = vec![];
        for _ in 0..10 {
            s.speed_up();
            seen.push(s.interval_ms());
        }
        // 85 -> 72 -> 61 -> 52 -> 50 (44 clamped)
        assert_eq!(&seen[..4], &[72, 61, 52, 50]);
        assert!(seen[4..].iter().all(|&ms| ms == 50));
    }

    #[test]
    fn slow_motion_round_trip() {
        let mut s = speed(50, 50, 85);
        s.slow_down(2);
        assert_eq!(s.interval_ms(), 100);
        s.restore(2);
        assert_eq!(s.interval_ms(), 50);
    }

    #[test]
    fn restore_never_undershoots_floor() {
        let mut s = speed(60, 50, 85);
        s.slow_down(2);
        assert_eq!(s.interval_ms(), 120);
        // food eaten while slowed
        s.speed_up();
        assert_eq!(s.interval_ms(), 102);
        s.restore(2);
        assert_eq!(s.interval_ms(), 51);

        let mut s = speed(50, 50, 85);
        s.slow_down(3);
        s.speed_up();
        s.speed_up();
        s.restore(3);
        assert_eq!(s.interval_ms(), 50);
    }

    #[test]
    fn tiles_per_sec() {
        assert_eq!(speed(200, 50, 85).tiles_per_sec(), 5);
        assert_eq!(speed(50, 50, 85).tiles_per_sec(), 20);
    }

    #[test]
    fn key_mapping() {
        let keys = KeyBindings::default();
        assert_eq!(Command::from_key(&key('w'), &keys), Some(Command::Turn(Direction::Up)));
        assert_eq!(Command::from_key(&key('D'), &keys), Some(Command::Turn(Direction::Right)));
        assert_eq!(
            Command::from_key(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE), &keys),
            Some(Command::Turn(Direction::Left))
        );
        assert_eq!(Command::from_key(&key('p'), &keys), Some(Command::Pause));
        assert_eq!(
            Command::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &keys),
            Some(Command::Quit)
        );
        assert_eq!(Command::from_key(&key('q'), &keys), None);
    }

    #[test]
    fn wait_runs_full_interval_in_slices() {
        let clock = ManualClock::new();
        let mut input = ScriptedInput::default();
        let scheduler = TickScheduler::new(Duration::from_millis(3));

        let wake = scheduler
            .wait(Duration::from_millis(10), &KeyBindings::default(), &mut input, &clock, |_| {})
            .unwrap();

        assert_eq!(wake, Wake::Elapsed);
        assert_eq!(clock.now(), Duration::from_millis(10));
        // four slices of 3, 3, 3, 1 ms, each preceded by a poll, plus the final one
        assert_eq!(input.polls(), 5);
    }

    #[test]
    fn wait_forwards_turns_and_stops_on_pause() {
        let clock = ManualClock::new();
        let mut input = ScriptedInput::new(vec![key('s'), key('a'), key('x'), key('p'), key('w')]);
        let scheduler = TickScheduler::new(Duration::from_millis(1));

        let mut turns = vec![];
        let keys = KeyBindings::default();
        let wake = scheduler
            .wait(Duration::from_millis(100), &keys, &mut input, &clock, |d| turns.push(d))
            .unwrap();

        assert_eq!(wake, Wake::Paused);
        assert_eq!(turns, vec![Direction::Down, Direction::Left]);
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn wait_stops_on_quit() {
        let clock = ManualClock::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let mut input = ScriptedInput::new(vec![ctrl_c]);
        let scheduler = TickScheduler::new(Duration::from_millis(1));

        let wake = scheduler
            .wait(Duration::from_millis(100), &KeyBindings::default(), &mut input, &clock, |_| {})
            .unwrap();
        assert_eq!(wake, Wake::Quit);
    }
}
