use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::{Canvas, Rgba8, Vec2};
use crate::foundation::error::{StageError, StageResult};

const DEFAULT_SUGGESTION_INSTRUCTION: &str = "Suggest up to five short remix ideas for this game \
asset. Each idea is a few words describing a visual variation of the same object.";

/// Stage-wide tuning knobs.
///
/// Every field has a default, so a config file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Viewport size.
    pub canvas: Canvas,
    /// Clear colour, straight RGBA.
    pub background_rgba: [u8; 4],
    /// Guide grid stroke colour, straight RGBA.
    pub grid_rgba: [u8; 4],
    /// Perpendicular distance between neighbouring grid lines.
    pub grid_spacing: f64,
    /// Extra coverage beyond the viewport, as a fraction of its diagonal.
    pub grid_overscan: f64,
    /// Fit width for finished sprites.
    pub target_width: f64,
    /// RGB distance to the sampled background under which a pixel is matted away.
    pub matte_threshold: f64,
    /// Footprint of a sprite that has no image yet.
    pub placeholder_size: f64,
    /// Edge length of the bordered input preview.
    pub preview_size: f64,
    /// Offset applied to duplicates.
    pub duplicate_offset: Vec2,
    /// Arrow-key nudge distance.
    pub nudge_step: f64,
    /// Selection ring radius relative to the smaller sprite dimension.
    pub ring_radius_ratio: f64,
    /// Period of the loader / suggestion tick.
    pub tick_interval_ms: u64,
    /// Ticks each remix suggestion stays on screen.
    pub suggestion_ticks: u64,
    /// Instruction prompt sent with remix-suggestion requests.
    pub suggestion_instruction: String,
    /// Font used for on-canvas text. Without it text ops are skipped.
    pub font_path: Option<PathBuf>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 800,
            },
            background_rgba: [244, 241, 234, 255],
            grid_rgba: [0, 0, 0, 28],
            grid_spacing: 48.0,
            grid_overscan: 1.0,
            target_width: 375.0,
            matte_threshold: 40.0,
            placeholder_size: 200.0,
            preview_size: 96.0,
            duplicate_offset: Vec2::new(24.0, 24.0),
            nudge_step: 10.0,
            ring_radius_ratio: 0.6,
            tick_interval_ms: 400,
            suggestion_ticks: 8,
            suggestion_instruction: DEFAULT_SUGGESTION_INSTRUCTION.to_string(),
            font_path: None,
        }
    }
}

impl StageConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(s: &str) -> StageResult<Self> {
        serde_json::from_str(s).map_err(|e| StageError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StageError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            StageError::serde(format!("parse config JSON '{}': {e}", path.display()))
        })
    }

    /// Apply `SPRITESTAGE_*` environment overrides. Unparseable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("SPRITESTAGE_MATTE_THRESHOLD")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
        {
            self.matte_threshold = v;
        }
        if let Some(v) = lookup("SPRITESTAGE_TARGET_WIDTH")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.target_width = v;
        }
        if let Some(v) = lookup("SPRITESTAGE_FONT").filter(|v| !v.is_empty()) {
            self.font_path = Some(PathBuf::from(v));
        }
        self
    }

    /// Check the config for values the stage cannot work with.
    pub fn validate(&self) -> StageResult<()> {
        self.canvas.validate()?;
        fn positive(name: &str, v: f64) -> StageResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(StageError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
            Ok(())
        }
        positive("target_width", self.target_width)?;
        positive("grid_spacing", self.grid_spacing)?;
        positive("placeholder_size", self.placeholder_size)?;
        positive("preview_size", self.preview_size)?;
        positive("nudge_step", self.nudge_step)?;
        positive("ring_radius_ratio", self.ring_radius_ratio)?;
        if !self.matte_threshold.is_finite() || self.matte_threshold < 0.0 {
            return Err(StageError::validation(
                "matte_threshold must be finite and >= 0",
            ));
        }
        if !self.grid_overscan.is_finite() || self.grid_overscan < 0.0 {
            return Err(StageError::validation(
                "grid_overscan must be finite and >= 0",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(StageError::validation("tick_interval_ms must be > 0"));
        }
        if self.suggestion_ticks == 0 {
            return Err(StageError::validation("suggestion_ticks must be > 0"));
        }
        Ok(())
    }

    /// Tick period as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Background colour.
    pub fn background(&self) -> Rgba8 {
        Rgba8::from_array(self.background_rgba)
    }

    /// Grid line colour.
    pub fn grid_color(&self) -> Rgba8 {
        Rgba8::from_array(self.grid_rgba)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
