//! Configuration types for Cloudgram diagram rendering.
//!
//! This module provides configuration structures that control where diagrams
//! are written, how long they are kept, how they are laid out and how they
//! look. All types implement [`serde::Deserialize`] so the binary can load
//! them from the `[render]` table of its settings file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`OutputConfig`] - Output directory, PNG scale and retention bounds.
//! - [`RetentionConfig`] - Age and count limits for rendered files.
//! - [`StyleConfig`] - Background color and label font.
//! - [`LayoutConfig`] - Spacing used by the layered layout.
//!
//! # Example
//!
//! ```
//! # use cloudgram::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.output().directory(), std::path::Path::new("outputs"));
//! assert!(config.style().background_color().is_ok());
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use cloudgram_core::{color::Color, draw::TextDefinition};

use crate::output::RetentionPolicy;

/// Top-level configuration combining output, style and layout settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(output: OutputConfig, style: StyleConfig, layout: LayoutConfig) -> Self {
        Self {
            output,
            style,
            layout,
        }
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Replaces the output directory, keeping every other setting.
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }
}

/// Where and how rendered diagrams are stored.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the rendered PNG files.
    #[serde(default = "default_directory")]
    directory: PathBuf,

    /// Pixel scale applied when rasterising the SVG.
    #[serde(default = "default_scale")]
    scale: f32,

    #[serde(default)]
    retention: RetentionConfig,
}

fn default_directory() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_scale() -> f32 {
    1.0
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            scale: default_scale(),
            retention: RetentionConfig::default(),
        }
    }
}

impl OutputConfig {
    pub fn new(directory: impl Into<PathBuf>, scale: f32, retention: RetentionConfig) -> Self {
        Self {
            directory: directory.into(),
            scale,
            retention,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }
}

/// Retention bounds for rendered files. A value of `0` disables that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_max_files")]
    max_files: usize,

    #[serde(default = "default_max_age_secs")]
    max_age_secs: u64,
}

fn default_max_files() -> usize {
    500
}

fn default_max_age_secs() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl RetentionConfig {
    pub fn new(max_files: usize, max_age_secs: u64) -> Self {
        Self {
            max_files,
            max_age_secs,
        }
    }

    /// Converts the configured bounds to a [`RetentionPolicy`].
    pub fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(
            (self.max_files > 0).then_some(self.max_files),
            (self.max_age_secs > 0).then(|| Duration::from_secs(self.max_age_secs)),
        )
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for diagrams, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Font family used for titles and labels.
    #[serde(default)]
    font_family: Option<String>,

    /// Label font size in pixels.
    #[serde(default)]
    font_size: Option<u16>,
}

impl StyleConfig {
    pub fn new(
        background_color: Option<String>,
        font_family: Option<String>,
        font_size: Option<u16>,
    ) -> Self {
        Self {
            background_color,
            font_family,
            font_size,
        }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// Builds the label [`TextDefinition`] with the configured overrides.
    pub fn label_text(&self) -> TextDefinition {
        let mut text = TextDefinition::new();
        if let Some(family) = &self.font_family {
            text.set_font_family(family.as_str());
        }
        if let Some(size) = self.font_size.filter(|size| *size > 0) {
            text.set_font_size(size);
        }
        text
    }
}

/// Spacing used by the layered layout, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LayoutConfig {
    /// Gap between consecutive layers (left to right).
    #[serde(default = "default_horizontal_spacing")]
    horizontal_spacing: f32,

    /// Gap between nodes stacked in the same layer.
    #[serde(default = "default_vertical_spacing")]
    vertical_spacing: f32,

    /// Padding between cluster frames and their members.
    #[serde(default = "default_cluster_padding")]
    cluster_padding: f32,
}

fn default_horizontal_spacing() -> f32 {
    90.0
}

fn default_vertical_spacing() -> f32 {
    40.0
}

fn default_cluster_padding() -> f32 {
    20.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: default_horizontal_spacing(),
            vertical_spacing: default_vertical_spacing(),
            cluster_padding: default_cluster_padding(),
        }
    }
}

impl LayoutConfig {
    pub fn new(horizontal_spacing: f32, vertical_spacing: f32, cluster_padding: f32) -> Self {
        Self {
            horizontal_spacing,
            vertical_spacing,
            cluster_padding,
        }
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn cluster_padding(&self) -> f32 {
        self.cluster_padding
    }
}
