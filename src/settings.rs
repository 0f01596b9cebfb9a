use crate::draw::model::{Color, StrokeStyle};
use crate::draw::render::RenderMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

const MAX_STROKE_WIDTH: u32 = 64;
const MAX_SURFACE_SIDE: u32 = 8192;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SurfaceSettings {
    /// Surface width in pixels, fixed for the session.
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Color,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Color the bitmap returns to on clear. Transparent by default.
    #[serde(default)]
    pub background: Color,
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Folder exports are written to. `None` uses the user's download folder.
    #[serde(default)]
    pub export_dir: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    500
}

fn default_stroke_color() -> Color {
    Color::BLACK
}

fn default_stroke_width() -> u32 {
    1
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            background: Color::TRANSPARENT,
            render_mode: RenderMode::default(),
            export_dir: None,
            debug_logging: false,
            log_file: None,
        }
    }
}

impl SurfaceSettings {
    /// Missing or empty files yield defaults.
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut loaded: Self = serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))?;
        loaded.sanitize();
        Ok(loaded)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings parent folder {}", parent.display()))?;
        }
        let mut sanitized = self.clone();
        sanitized.sanitize();
        let json = serde_json::to_string_pretty(&sanitized).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }

    pub fn sanitize(&mut self) {
        self.width = self.width.clamp(1, MAX_SURFACE_SIDE);
        self.height = self.height.clamp(1, MAX_SURFACE_SIDE);
        self.stroke_width = self.stroke_width.clamp(1, MAX_STROKE_WIDTH);
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.stroke_width,
            color: self.stroke_color,
        }
    }
}
