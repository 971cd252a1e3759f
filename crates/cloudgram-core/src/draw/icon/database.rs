use svg::node::element as svg_element;

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// Relational database: a cylinder on a blue tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseIcon;

impl Icon for DatabaseIcon {
    fn name(&self) -> &'static str {
        "database"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);
        let rx = size.width() * 0.25;
        let ry = size.height() * 0.08;

        let top = unit_point(center, size, 0.5, 0.3);
        let bottom = unit_point(center, size, 0.5, 0.7);
        let left = top.x() - rx;
        let right = top.x() + rx;

        let lid = svg_element::Ellipse::new()
            .set("cx", top.x())
            .set("cy", top.y())
            .set("rx", rx)
            .set("ry", ry)
            .set("fill", "none");

        // Side walls and the lower half of the base ellipse
        let body = format!(
            "M {left} {top_y} L {left} {bottom_y} A {rx} {ry} 0 0 0 {right} {bottom_y} L {right} {top_y}",
            top_y = top.y(),
            bottom_y = bottom.y(),
        );
        let body = svg_element::Path::new().set("d", body).set("fill", "none");

        let group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#3B48CC")))
            .add(apply_stroke!(lid, &stroke))
            .add(apply_stroke!(body, &stroke));

        Box::new(group)
    }
}
