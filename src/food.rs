//! Food and powerups: placement by rejection sampling, and the timed powerup effects.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use crate::clock::Speed;
use crate::config::{Glyphs, Styles};
use crate::display::Style;
use crate::snake::{Playfield, Snake};
use crate::Coords;

/// Draws random interior cells until one is free of the snake and of `avoid`.
///
/// Returns `None` when no free cell is left, instead of sampling forever.
pub fn random_free_cell<R: Rng>(
    rng: &mut R,
    field: &Playfield,
    snake: &Snake,
    avoid: Option<Coords>,
) -> Option<Coords> {
    let mut taken: HashSet<Coords> =
        snake.body().iter().copied().filter(|p| field.is_interior(*p)).collect();
    taken.extend(avoid.filter(|p| field.is_interior(*p)));
    if taken.len() >= field.interior_cells() {
        return None;
    }

    loop {
        let pos = (
            rng.gen_range(field.top + 1..field.bottom),
            rng.gen_range(field.left + 1..field.right),
        );
        if !snake.contains(pos) && avoid != Some(pos) {
            return Some(pos);
        }
    }
}

/// The single food item. `None` means eaten and not yet respawned.
#[derive(Default)]
pub struct Food {
    pos: Option<Coords>,
}

impl Food {
    pub fn pos(&self) -> Option<Coords> {
        self.pos
    }

    pub fn is_at(&self, pos: Coords) -> bool {
        self.pos == Some(pos)
    }

    /// Places the food on a free cell. Leaves it unset if the board is full.
    pub fn spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        field: &Playfield,
        snake: &Snake,
        avoid: Option<Coords>,
    ) -> Option<Coords> {
        self.pos = random_free_cell(rng, field, snake, avoid);
        self.pos
    }

    #[cfg(test)]
    pub fn place(&mut self, pos: Coords) {
        self.pos = Some(pos);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PowerupKind {
    /// Stretches the tick interval for a while.
    SlowMotion,
    /// Lets the snake pass through itself for a while.
    NoCollision,
}

impl PowerupKind {
    pub fn glyph(self, glyphs: &Glyphs) -> char {
        match self {
            PowerupKind::SlowMotion => glyphs.slow_motion,
            PowerupKind::NoCollision => glyphs.no_collision,
        }
    }

    pub fn style(self, styles: &Styles) -> Style {
        match self {
            PowerupKind::SlowMotion => styles.slow_motion,
            PowerupKind::NoCollision => styles.no_collision,
        }
    }
}

/// Powerup state for one session.
///
/// At most one powerup is on the board or in effect at a time. After an
/// effect wears off, the next one only appears once the cooldown has passed.
pub struct Powerup {
    pos: Option<Coords>,
    kind: PowerupKind,
    active: bool,
    activated_at: Duration,
    ended_at: Option<Duration>,
    spawned_once: bool,
}

impl Powerup {
    pub fn new() -> Self {
        Powerup {
            pos: None,
            kind: PowerupKind::SlowMotion,
            active: false,
            activated_at: Duration::ZERO,
            ended_at: None,
            spawned_once: false,
        }
    }

    pub fn pos(&self) -> Option<Coords> {
        self.pos
    }

    pub fn kind(&self) -> PowerupKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_at(&self, pos: Coords) -> bool {
        self.pos == Some(pos)
    }

    #[cfg(test)]
    pub fn place(&mut self, pos: Coords, kind: PowerupKind) {
        self.pos = Some(pos);
        self.kind = kind;
        self.spawned_once = true;
    }

    pub fn should_spawn(&self, now: Duration, cooldown: Duration) -> bool {
        if !self.spawned_once {
            return true;
        }
        if self.active || self.pos.is_some() {
            return false;
        }
        self.ended_at.map_or(false, |end| now.saturating_sub(end) >= cooldown)
    }

    /// Places a powerup of a random kind if the timing allows it.
    pub fn try_spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        field: &Playfield,
        snake: &Snake,
        avoid: Option<Coords>,
        now: Duration,
        cooldown: Duration,
    ) -> Option<Coords> {
        if !self.should_spawn(now, cooldown) {
            return None;
        }

        let pos = random_free_cell(rng, field, snake, avoid)?;
        self.kind = if rng.gen_bool(0.5) {
            PowerupKind::SlowMotion
        } else {
            PowerupKind::NoCollision
        };
        self.pos = Some(pos);
        self.spawned_once = true;
        log::debug!("spawned {:?} powerup at {:?}", self.kind, pos);
        Some(pos)
    }

    /// Picks the powerup up and starts its effect.
    pub fn activate(
        &mut self,
        now: Duration,
        speed: &mut Speed,
        self_collision: &mut bool,
        slow_factor: u64,
    ) {
        match self.kind {
            PowerupKind::SlowMotion => speed.slow_down(slow_factor),
            PowerupKind::NoCollision => *self_collision = false,
        }
        self.pos = None;
        self.active = true;
        self.activated_at = now;
        log::debug!("{:?} active, interval {} ms", self.kind, speed.interval_ms());
    }

    /// Whether an effect started at the last pickup has run for `duration`.
    pub fn is_expired(&self, now: Duration, duration: Duration) -> bool {
        now.saturating_sub(self.activated_at) >= duration
    }

    /// Reverses the running effect. `configured_collision` is the flag to return to.
    pub fn deactivate(
        &mut self,
        now: Duration,
        speed: &mut Speed,
        self_collision: &mut bool,
        configured_collision: bool,
        slow_factor: u64,
    ) {
        match self.kind {
            PowerupKind::SlowMotion => speed.restore(slow_factor),
            PowerupKind::NoCollision => *self_collision = configured_collision,
        }
        self.active = false;
        self.ended_at = Some(now);
        log::debug!("{:?} expired, interval {} ms", self.kind, speed.interval_ms());
    }
}
