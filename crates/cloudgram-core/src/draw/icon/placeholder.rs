use svg::node::element as svg_element;

use super::Icon;
use crate::{
    apply_stroke,
    color::palette,
    draw::{StrokeDefinition, layer::SvgNode},
    geometry::{Point, Size},
};

/// Blank dashed frame for node kinds without a dedicated icon.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderIcon;

impl Icon for PlaceholderIcon {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let bounds = center.to_bounds(size);
        let stroke = StrokeDefinition::dashed(palette("#7D8998"), 1.5);

        let frame = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", 4.0)
            .set("fill", "white");

        let group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(apply_stroke!(frame, &stroke));

        Box::new(group)
    }
}
