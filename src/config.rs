//! Game parameters, glyphs, colours and key bindings.
//!
//! Everything the engine would otherwise hard-code lives in [`GameConfig`],
//! which is built once at startup (defaults, optionally overlaid by a JSON
//! file) and handed to each session.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::Style;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    /// Whether the head running into the body ends the game.
    pub self_collision: bool,
    pub powerups: PowerupConfig,
    /// Segments the snake starts with, head included.
    pub initial_length: u16,
    /// Sleep slice between input checks while waiting for the next tick.
    pub poll_granularity_ms: u64,
    pub glyphs: Glyphs,
    pub styles: Styles,
    pub keys: KeyBindings,
}

/// Tick timing. Intervals are in milliseconds, shorter means faster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub initial_interval_ms: u64,
    /// Floor the interval never drops below, i.e. the top speed.
    pub min_interval_ms: u64,
    /// The interval is multiplied by this percentage each time food is eaten.
    pub speed_up_percent: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub enabled: bool,
    pub duration_secs: u64,
    /// Wait after an effect wears off before another powerup may appear.
    pub cooldown_secs: u64,
    pub slow_motion_factor: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glyphs {
    pub head_up: char,
    pub head_down: char,
    pub head_left: char,
    pub head_right: char,
    pub body: char,
    pub food: char,
    pub border: char,
    pub slow_motion: char,
    pub no_collision: char,
    pub cursor: char,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styles {
    pub menu_text: Style,
    pub menu_option: Style,
    pub cursor: Style,
    pub scoreboard: Style,
    pub snake_body: Style,
    pub snake_head: Style,
    pub food: Style,
    pub border: Style,
    pub slow_motion: Style,
    pub no_collision: Style,
    pub background: Style,
}

/// Letter keys for steering and pausing. The arrow keys always steer as well.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
    pub pause: char,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            speed: SpeedConfig::default(),
            self_collision: true,
            powerups: PowerupConfig::default(),
            initial_length: 1,
            poll_granularity_ms: 1,
            glyphs: Glyphs::default(),
            styles: Styles::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig { initial_interval_ms: 200, min_interval_ms: 50, speed_up_percent: 85 }
    }
}

impl Default for PowerupConfig {
    fn default() -> Self {
        PowerupConfig { enabled: true, duration_secs: 10, cooldown_secs: 15, slow_motion_factor: 2 }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Glyphs {
            head_up: '^',
            head_down: 'v',
            head_left: '<',
            head_right: '>',
            body: '*',
            food: '*',
            border: '#',
            slow_motion: '+',
            no_collision: 'x',
            cursor: '>',
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Styles {
            menu_text: Style::colors(184, 234),
            menu_option: Style::colors(214, 234),
            cursor: Style::colors(202, 234),
            scoreboard: Style::colors(231, 23),
            snake_body: Style::colors(231, 233),
            snake_head: Style::colors(231, 233),
            food: Style::colors(231, 233),
            border: Style::colors(231, 23),
            slow_motion: Style::colors(231, 232),
            no_collision: Style::colors(231, 232),
            background: Style::colors(231, 232),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings { up: 'w', down: 's', left: 'a', right: 'd', pause: 'p' }
    }
}

impl GameConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = &self.speed;
        if speed.min_interval_ms == 0 {
            return Err(invalid("speed.min_interval_ms must be positive"));
        }
        if speed.initial_interval_ms < speed.min_interval_ms {
            return Err(invalid(
                "speed.initial_interval_ms must not be below speed.min_interval_ms",
            ));
        }
        if speed.speed_up_percent == 0 || speed.speed_up_percent > 100 {
            return Err(invalid("speed.speed_up_percent must be within 1..=100"));
        }
        if self.powerups.slow_motion_factor == 0 {
            return Err(invalid("powerups.slow_motion_factor must be at least 1"));
        }
        if self.poll_granularity_ms == 0 {
            return Err(invalid("poll_granularity_ms must be positive"));
        }
        if self.initial_length == 0 {
            return Err(invalid("initial_length must be at least 1"));
        }

        let keys = [self.keys.up, self.keys.down, self.keys.left, self.keys.right, self.keys.pause];
        for (i, key) in keys.iter().enumerate() {
            // pressed keys are lowercased before matching
            if key.is_uppercase() {
                return Err(invalid(&format!("key '{}' must be lowercase", key)));
            }
            if keys[i + 1..].contains(key) {
                return Err(invalid(&format!("key '{}' is bound twice", key)));
            }
        }

        Ok(())
    }

    pub fn poll_granularity(&self) -> Duration {
        Duration::from_millis(self.poll_granularity_ms)
    }

    pub fn powerup_duration(&self) -> Duration {
        Duration::from_secs(self.powerups.duration_secs)
    }

    pub fn powerup_cooldown(&self) -> Duration {
        Duration::from_secs(self.powerups.cooldown_secs)
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation { message: message.to_string() }
}
