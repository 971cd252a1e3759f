//! PNG rasterisation of SVG documents with `resvg`.

use std::{fmt, sync::Arc};

use log::debug;
use resvg::{
    tiny_skia::{Pixmap, Transform},
    usvg::{self, fontdb},
};

use crate::error::CloudgramError;

/// Converts SVG text to PNG bytes.
///
/// The system font database is loaded once on construction and shared by
/// every conversion.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    font_family: String,
    scale: f32,
}

impl Rasterizer {
    /// Creates a rasteriser drawing at `scale` pixels per SVG unit.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Config`] if `scale` is not a positive,
    /// finite number.
    pub fn new(font_family: impl Into<String>, scale: f32) -> Result<Self, CloudgramError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CloudgramError::Config(format!(
                "PNG scale must be a positive number, got {scale}"
            )));
        }

        let mut database = fontdb::Database::new();
        database.load_system_fonts();
        debug!(faces = database.len(); "Loaded system fonts");

        Ok(Self {
            fontdb: Arc::new(database),
            font_family: font_family.into(),
            scale,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Renders `svg` and encodes the result as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Raster`] if the SVG cannot be parsed, the
    /// scaled canvas is empty or too large, or PNG encoding fails.
    pub fn to_png(&self, svg: &str) -> Result<Vec<u8>, CloudgramError> {
        let mut options = usvg::Options::default();
        options.font_family = self.font_family.clone();
        options.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|err| CloudgramError::Raster(format!("failed to parse SVG: {err}")))?;

        let size = tree.size();
        let width = (size.width() * self.scale).ceil();
        let height = (size.height() * self.scale).ceil();
        if width < 1.0 || height < 1.0 || width > u32::MAX as f32 || height > u32::MAX as f32 {
            return Err(CloudgramError::Raster(format!(
                "cannot rasterise a {width}x{height} canvas"
            )));
        }

        let (width, height) = (width as u32, height as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            CloudgramError::Raster(format!("failed to allocate a {width}x{height} canvas"))
        })?;

        resvg::render(
            &tree,
            Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|err| CloudgramError::Raster(format!("failed to encode PNG: {err}")))?;
        debug!(width = width, height = height, bytes = png.len(); "Rasterised diagram");

        Ok(png)
    }
}

impl fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rasterizer")
            .field("font_faces", &self.fontdb.len())
            .field("font_family", &self.font_family)
            .field("scale", &self.scale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20"><rect x="0" y="0" width="40" height="20" fill="#ED7100"/></svg>"##;

    /// Reads the width and height from the IHDR chunk.
    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (width, height)
    }

    #[test]
    fn test_to_png_writes_png_signature() {
        let rasterizer = Rasterizer::new("sans-serif", 1.0).unwrap();
        let png = rasterizer.to_png(SQUARE).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
        assert_eq!(png_dimensions(&png), (40, 20));
    }

    #[test]
    fn test_to_png_applies_scale() {
        let rasterizer = Rasterizer::new("sans-serif", 2.0).unwrap();
        let png = rasterizer.to_png(SQUARE).unwrap();
        assert_eq!(png_dimensions(&png), (80, 40));
    }

    #[test]
    fn test_invalid_svg_is_a_raster_error() {
        let rasterizer = Rasterizer::new("sans-serif", 1.0).unwrap();
        let err = rasterizer.to_png("<not svg").unwrap_err();
        assert!(matches!(err, CloudgramError::Raster(_)));
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                Rasterizer::new("sans-serif", scale),
                Err(CloudgramError::Config(_))
            ));
        }
    }
}
