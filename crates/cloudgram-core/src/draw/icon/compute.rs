use svg::node::element as svg_element;

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// Virtual machine / compute instance: a processor chip on an orange tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeIcon;

impl Icon for ComputeIcon {
    fn name(&self) -> &'static str {
        "compute"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);
        let chip_min = unit_point(center, size, 0.3, 0.3);
        let chip_size = Size::new(size.width() * 0.4, size.height() * 0.4);

        let chip = svg_element::Rectangle::new()
            .set("x", chip_min.x())
            .set("y", chip_min.y())
            .set("width", chip_size.width())
            .set("height", chip_size.height())
            .set("fill", "none");

        let mut group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#ED7100")))
            .add(apply_stroke!(chip, &stroke));

        // Three pins on every side of the chip
        for offset in [0.4, 0.5, 0.6] {
            let pins = [
                ((offset, 0.18), (offset, 0.3)),
                ((offset, 0.7), (offset, 0.82)),
                ((0.18, offset), (0.3, offset)),
                ((0.7, offset), (0.82, offset)),
            ];
            for ((x1, y1), (x2, y2)) in pins {
                let start = unit_point(center, size, x1, y1);
                let end = unit_point(center, size, x2, y2);
                let pin = svg_element::Line::new()
                    .set("x1", start.x())
                    .set("y1", start.y())
                    .set("x2", end.x())
                    .set("y2", end.y());
                group = group.add(apply_stroke!(pin, &stroke));
            }
        }

        Box::new(group)
    }
}
