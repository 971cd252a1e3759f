use svg::node::element::{self as svg_element, path::Data};

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// API gateway: a pair of angle brackets around a slash.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayIcon;

impl Icon for GatewayIcon {
    fn name(&self) -> &'static str {
        "gateway"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);
        let at = |ux: f32, uy: f32| {
            let p = unit_point(center, size, ux, uy);
            (p.x(), p.y())
        };

        let glyph = Data::new()
            // <
            .move_to(at(0.35, 0.3))
            .line_to(at(0.2, 0.5))
            .line_to(at(0.35, 0.7))
            // >
            .move_to(at(0.65, 0.3))
            .line_to(at(0.8, 0.5))
            .line_to(at(0.65, 0.7))
            // /
            .move_to(at(0.56, 0.28))
            .line_to(at(0.44, 0.72));
        let glyph = svg_element::Path::new().set("d", glyph).set("fill", "none");

        let group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#A166FF")))
            .add(apply_stroke!(glyph, &stroke));

        Box::new(group)
    }
}
