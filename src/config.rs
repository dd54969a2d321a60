//! World configuration
//!
//! Every tunable of the decision core in one serializable tree. Files are
//! RON by default (JSON is accepted too); every section falls back to its
//! defaults when omitted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::{MazeOptions, WorldFrame};
use crate::search::HeuristicKind;
use crate::steering::{Align, Arrive, MotionBounds};

/// Grid extents and maze generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Seed for maze carving
    pub seed: u64,
    /// Carving tunables
    pub maze: MazeOptions,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 15,
            cols: 20,
            cell_size: 32.0,
            seed: 1,
            maze: MazeOptions::default(),
        }
    }
}

/// Speed limits and world border
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Maximum linear speed
    pub max_speed: f32,
    /// Maximum angular speed, degrees per second
    pub max_rotation: f32,
    /// Margin kept from the world edge
    pub border: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 120.0,
            max_rotation: 360.0,
            border: 4.0,
        }
    }
}

/// Arrive tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArriveConfig {
    pub max_acceleration: f32,
    pub time_to_target: f32,
    pub arrival_radius: f32,
    pub slow_radius: f32,
}

impl Default for ArriveConfig {
    fn default() -> Self {
        Self {
            max_acceleration: 600.0,
            time_to_target: 0.1,
            arrival_radius: 2.0,
            slow_radius: 40.0,
        }
    }
}

/// Align tunables; angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub max_angular_acceleration: f32,
    pub time_to_target: f32,
    pub arrival_angle: f32,
    pub slow_angle: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            max_angular_acceleration: 1440.0,
            time_to_target: 0.1,
            arrival_angle: 2.0,
            slow_angle: 45.0,
        }
    }
}

/// Wander tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Distance of the wander circle ahead of the agent
    pub offset: f32,
    /// Radius of the wander circle
    pub radius: f32,
    /// Maximum drift per tick, degrees
    pub rate: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            offset: 48.0,
            radius: 24.0,
            rate: 30.0,
        }
    }
}

/// Path-following tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Seconds of velocity projected ahead
    pub prediction_time: f32,
    /// Records to aim ahead of the nearest one
    pub path_offset: usize,
    /// Push of the terminal target along the final step
    pub terminal_nudge: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            prediction_time: 0.1,
            path_offset: 1,
            terminal_nudge: 2.0,
        }
    }
}

/// Decision engine tunables; caps, pauses and cooldowns count ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Distance in cells under which the target is "nearby"
    pub nearby_threshold: f32,
    /// Chase ticks before a cooldown starts
    pub chase_cap: u32,
    /// Wander ticks before a pause starts
    pub wander_cap: u32,
    /// Guess ticks before a pause starts
    pub guess_cap: u32,
    /// Ticks during which chasing is refused after a chase bout
    pub chase_cooldown: u32,
    /// Ticks the agent rests after a wander bout
    pub wander_pause: u32,
    /// Ticks the agent rests after a guess bout
    pub guess_pause: u32,
    /// Random-selector cooldown above which a new child may be picked
    pub selector_threshold: u32,
    /// Random-selector cooldown added per guessing tick
    pub guessing_step: u32,
    /// Random-selector cooldown added per wandering tick
    pub wandering_step: u32,
    /// Guess sampling radius in cells
    pub guess_radius: f32,
    /// Samples tried before a guess falls back to staying put
    pub guess_retries: u32,
    /// Heuristic used when planning a chase
    pub chase_heuristic: HeuristicKind,
    /// Seed for the engine's random source
    pub seed: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            nearby_threshold: 6.0,
            chase_cap: 300,
            wander_cap: 240,
            guess_cap: 120,
            chase_cooldown: 120,
            wander_pause: 60,
            guess_pause: 30,
            selector_threshold: 200,
            guessing_step: 2,
            wandering_step: 1,
            guess_radius: 3.0,
            guess_retries: 10,
            chase_heuristic: HeuristicKind::Custom,
            seed: 7,
        }
    }
}

/// All tunables of the decision core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub grid: GridConfig,
    pub motion: MotionConfig,
    pub arrive: ArriveConfig,
    pub align: AlignConfig,
    pub wander: WanderConfig,
    pub follow: FollowConfig,
    pub decision: DecisionConfig,
}

impl WorldConfig {
    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig =
            ron::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: WorldConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load by extension: `.json` as JSON, anything else as RON
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::load_json(path)
        } else {
            Self::load_ron(path)
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one cell, got {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        positive("grid.cell_size", self.grid.cell_size)?;
        positive("motion.max_speed", self.motion.max_speed)?;
        positive("motion.max_rotation", self.motion.max_rotation)?;
        if self.motion.border < 0.0 || 2.0 * self.motion.border >= self.grid.cell_size {
            return Err(ConfigError::Invalid(format!(
                "motion.border must be in [0, cell_size / 2), got {}",
                self.motion.border
            )));
        }
        positive("arrive.max_acceleration", self.arrive.max_acceleration)?;
        positive("arrive.time_to_target", self.arrive.time_to_target)?;
        positive("arrive.slow_radius", self.arrive.slow_radius)?;
        if self.arrive.arrival_radius > self.arrive.slow_radius {
            return Err(ConfigError::Invalid(
                "arrive.arrival_radius must not exceed arrive.slow_radius".into(),
            ));
        }
        positive("align.max_angular_acceleration", self.align.max_angular_acceleration)?;
        positive("align.time_to_target", self.align.time_to_target)?;
        positive("align.slow_angle", self.align.slow_angle)?;
        if self.align.arrival_angle > self.align.slow_angle {
            return Err(ConfigError::Invalid(
                "align.arrival_angle must not exceed align.slow_angle".into(),
            ));
        }
        positive("decision.nearby_threshold", self.decision.nearby_threshold)?;
        positive("decision.guess_radius", self.decision.guess_radius)?;
        let caps = [
            ("decision.chase_cap", self.decision.chase_cap),
            ("decision.wander_cap", self.decision.wander_cap),
            ("decision.guess_cap", self.decision.guess_cap),
            ("decision.selector_threshold", self.decision.selector_threshold),
        ];
        for (name, value) in caps {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }

    /// Arrive behavior at full agent speed
    #[must_use]
    pub fn arrive(&self) -> Arrive {
        Arrive::new(self.arrive.max_acceleration, self.motion.max_speed)
            .with_radii(self.arrive.arrival_radius, self.arrive.slow_radius)
            .with_time_to_target(self.arrive.time_to_target)
    }

    /// Align behavior at full agent rotation
    #[must_use]
    pub fn align(&self) -> Align {
        Align::new(self.align.max_angular_acceleration, self.motion.max_rotation)
            .with_angles(self.align.arrival_angle, self.align.slow_angle)
            .with_time_to_target(self.align.time_to_target)
    }

    /// Motion limits inside a world frame
    #[must_use]
    pub fn motion_bounds(&self, frame: &WorldFrame) -> MotionBounds {
        MotionBounds {
            min: frame.world_min(),
            max: frame.world_max(),
            border: self.motion.border,
            max_speed: self.motion.max_speed,
            max_rotation: self.motion.max_rotation,
        }
    }
}

/// Errors that can occur loading or saving configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error reading or writing the file
    IoError(String),
    /// The document could not be parsed
    ParseError(String),
    /// The config could not be serialized
    SerializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialize error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
