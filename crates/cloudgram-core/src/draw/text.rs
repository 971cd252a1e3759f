//! Text definitions for node labels, cluster labels and diagram titles.
//!
//! - [`TextDefinition`] - Reusable text style configuration
//! - [`Text`] - A renderable text element combining content with a [`TextDefinition`]
//!
//! ```
//! # use cloudgram_core::draw::{Text, TextDefinition};
//! let mut style = TextDefinition::new();
//! style.set_font_size(13);
//!
//! let text = Text::new(&style, "Web Server 1");
//! assert!(text.calculate_size().width() > 0.0);
//! ```
//!
//! Measurement uses `cosmic-text` shaping against the system fonts. When no
//! font is available the size is estimated from the character count.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;
use svg::node::element as svg_element;

use crate::{
    color::Color,
    geometry::{Point, Size},
};

/// Text style configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: u16,
    color: Option<Color>,
    bold: bool,
}

impl TextDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        self.font_family = family.into();
    }

    pub fn set_font_size(&mut self, size: u16) {
        self.font_size = size;
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12,
            color: None,
            bold: false,
        }
    }
}

/// A piece of text with its style.
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
}

impl<'a> Text<'a> {
    pub fn new(definition: &'a TextDefinition, content: &'a str) -> Self {
        Self {
            definition,
            content,
        }
    }

    /// Measures the rendered size of the text in pixels.
    pub fn calculate_size(&self) -> Size {
        TEXT_MANAGER
            .get_or_init(TextManager::new)
            .calculate_text_size(self.content, self.definition)
    }

    /// Renders the text horizontally centered on `center`.
    ///
    /// The vertical offset approximates a middle baseline so that rasterisers
    /// without `dominant-baseline` support place the text the same way.
    pub fn render_to_svg(&self, center: Point) -> svg_element::Text {
        let font_size = f32::from(self.definition.font_size());
        let mut text = svg_element::Text::new(self.content)
            .set("x", center.x())
            .set("y", center.y() + font_size * 0.35)
            .set("text-anchor", "middle")
            .set("font-family", self.definition.font_family())
            .set("font-size", self.definition.font_size());

        if self.definition.is_bold() {
            text = text.set("font-weight", "bold");
        }

        if let Some(color) = self.definition.color() {
            text = text
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        text
    }
}

/// Holds one reusable `FontSystem`; creating it scans the system fonts.
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    fn calculate_text_size(&self, text: &str, text_def: &TextDefinition) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let font_size_px = f32::from(text_def.font_size()) * 1.33;
        let line_height = font_size_px * 1.15;
        let estimate = Size::new(
            text.chars().count() as f32 * font_size_px * 0.55,
            line_height,
        );

        // A poisoned lock only means another measurement panicked
        let Ok(mut font_system) = self.font_system.lock() else {
            return estimate;
        };

        let metrics = Metrics::new(font_size_px, line_height);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let family = match text_def.font_family() {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        let attrs = Attrs::new().family(family);

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            total_height += metrics.line_height;
        }

        if max_width <= 0.0 || total_height <= 0.0 {
            return estimate;
        }

        Size::new(max_width, total_height)
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_definition_defaults() {
        let def = TextDefinition::default();
        assert_eq!(def.font_family(), "sans-serif");
        assert_eq!(def.font_size(), 12);
        assert!(def.color().is_none());
        assert!(!def.is_bold());
    }

    #[test]
    fn test_empty_text_has_zero_size() {
        let def = TextDefinition::default();
        assert_eq!(Text::new(&def, "").calculate_size(), Size::default());
    }

    #[test]
    fn test_longer_text_is_wider() {
        let def = TextDefinition::default();
        let short = Text::new(&def, "DB").calculate_size();
        let long = Text::new(&def, "Authentication Service").calculate_size();
        assert!(long.width() > short.width());
        assert!(short.height() > 0.0);
    }

    #[test]
    fn test_render_centers_text() {
        let mut def = TextDefinition::default();
        def.set_bold(true);
        let rendered = Text::new(&def, "Order Service")
            .render_to_svg(Point::new(50.0, 10.0))
            .to_string();
        assert!(rendered.contains("text-anchor=\"middle\""));
        assert!(rendered.contains("font-weight=\"bold\""));
        assert!(rendered.contains("Order Service"));
    }
}
