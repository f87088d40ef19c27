use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::peep::animator::WalkSettings;
use crate::peep::PeepSettings;
use crate::render::pipeline::MAX_INSTANCES;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "peeps.toml";

/// Command-line flags. Anything given here overrides the config file.
#[derive(Debug, Default, Parser)]
#[command(name = "desktop-peeps", version, about = "Animated sprite peeps wandering your desktop")]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of peeps to spawn.
    #[arg(long)]
    pub peeps: Option<usize>,
    /// Uniform sprite scale factor.
    #[arg(long)]
    pub scale: Option<f32>,
    /// Start with the music muted.
    #[arg(long)]
    pub muted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub peep_count: usize,
    /// Candidate base sprite ids; each peep picks one at random.
    pub base_sprite_ids: Vec<u32>,
    pub scale_factor: f32,
    pub assets: AssetPaths,
    pub animation: AnimationConfig,
    pub fallback: FallbackConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetPaths {
    pub metadata: PathBuf,
    pub sprite_dir: PathBuf,
    pub music: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub frames_per_direction: u32,
    pub frame_duration_ms: u64,
    /// Pixels per tick along each axis.
    pub walk_speed: f32,
    pub tick_ms: u64,
    pub turn_min_ms: u64,
    pub turn_max_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    /// Square edge before scaling.
    pub size: u32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
    pub start_muted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peep_count: 10,
            base_sprite_ids: vec![11301, 6409, 6505],
            scale_factor: 1.0,
            assets: AssetPaths::default(),
            animation: AnimationConfig::default(),
            fallback: FallbackConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            metadata: PathBuf::from("./output/sprites.nfo"),
            sprite_dir: PathBuf::from("./output/"),
            music: PathBuf::from("RollerCoaster Tycoon - Merry go round music.mp3"),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames_per_direction: 5,
            frame_duration_ms: 100,
            walk_speed: 0.5,
            tick_ms: 16,
            turn_min_ms: 1000,
            turn_max_ms: 3000,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            size: 64,
            color: [255, 255, 0],
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: crate::audio::DEFAULT_VOLUME,
            start_muted: false,
        }
    }
}

impl Config {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Resolve the effective config: explicit `--config`, else `peeps.toml`
    /// when present, else defaults; then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_path(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(n) = cli.peeps {
            self.peep_count = n;
        }
        if let Some(scale) = cli.scale {
            self.scale_factor = scale;
        }
        if cli.muted {
            self.audio.start_muted = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.peep_count == 0 || self.peep_count > MAX_INSTANCES {
            return invalid(format!("peep_count must be in 1..={MAX_INSTANCES}, got {}", self.peep_count));
        }
        if self.base_sprite_ids.is_empty() {
            return invalid("base_sprite_ids must not be empty".into());
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return invalid(format!("scale_factor must be positive, got {}", self.scale_factor));
        }

        let anim = &self.animation;
        if anim.frames_per_direction == 0 {
            return invalid("animation.frames_per_direction must be at least 1".into());
        }
        if anim.frame_duration_ms == 0 || anim.tick_ms == 0 {
            return invalid("animation.frame_duration_ms and animation.tick_ms must be positive".into());
        }
        if !anim.walk_speed.is_finite() || anim.walk_speed < 0.0 {
            return invalid(format!("animation.walk_speed must be >= 0, got {}", anim.walk_speed));
        }
        if anim.turn_min_ms > anim.turn_max_ms {
            return invalid(format!(
                "animation.turn_min_ms ({}) exceeds turn_max_ms ({})",
                anim.turn_min_ms, anim.turn_max_ms
            ));
        }

        if self.fallback.size == 0 {
            return invalid("fallback.size must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return invalid(format!("audio.volume must be in [0, 1], got {}", self.audio.volume));
        }

        Ok(())
    }

    pub fn walk_settings(&self) -> WalkSettings {
        WalkSettings {
            frame_duration_ms: self.animation.frame_duration_ms,
            move_speed: self.animation.walk_speed,
            turn_min_ms: self.animation.turn_min_ms,
            turn_max_ms: self.animation.turn_max_ms,
        }
    }

    pub fn peep_settings(&self) -> PeepSettings {
        let [r, g, b] = self.fallback.color;
        PeepSettings {
            count: self.peep_count,
            base_sprite_ids: self.base_sprite_ids.clone(),
            frames_per_direction: self.animation.frames_per_direction,
            walk: self.walk_settings(),
            fallback_size: (self.fallback.size as f32 * self.scale_factor).floor().max(1.0),
            fallback_color: (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | 0xFF,
        }
    }
}
