//! Color handling for Cloudgram diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Icons, cluster frames and arrows all carry their
//! palette as [`Color`] values so that the rendered SVG gets consistent
//! `fill`/`stroke` and matching opacity attributes.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff9900"`,
    /// `"rgb(255, 153, 0)"` or `"orange"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudgram_core::color::Color;
    ///
    /// let orange = Color::new("#ff9900").unwrap();
    /// assert!(Color::new("definitely-not-a-color").is_err());
    /// # let _ = orange;
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Creates a new color with the specified alpha value (0.0 to 1.0).
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha (transparency) component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}

/// Builds a [`Color`] from a string literal known to be a valid CSS color.
///
/// Only used for the built-in icon palette.
pub(crate) fn palette(color_str: &str) -> Color {
    Color::new(color_str).unwrap_or_default()
}
