use svg::node::element as svg_element;

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// Message queue: a row of message slots on a pink tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueIcon;

impl Icon for QueueIcon {
    fn name(&self) -> &'static str {
        "queue"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);
        let slot_size = Size::new(size.width() * 0.12, size.height() * 0.36);

        let mut group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#E7157B")));

        for ux in [0.22, 0.4, 0.58] {
            let min = unit_point(center, size, ux, 0.32);
            let slot = svg_element::Rectangle::new()
                .set("x", min.x())
                .set("y", min.y())
                .set("width", slot_size.width())
                .set("height", slot_size.height())
                .set("fill", "white")
                .set("fill-opacity", 0.35);
            group = group.add(apply_stroke!(slot, &stroke));
        }

        // Outgoing arrow head after the last slot
        let tip = unit_point(center, size, 0.86, 0.5);
        let arrow = svg_element::Polyline::new()
            .set(
                "points",
                format!(
                    "{},{} {},{} {},{}",
                    tip.x() - size.width() * 0.08,
                    tip.y() - size.height() * 0.1,
                    tip.x(),
                    tip.y(),
                    tip.x() - size.width() * 0.08,
                    tip.y() + size.height() * 0.1,
                ),
            )
            .set("fill", "none");
        group = group.add(apply_stroke!(arrow, &stroke));

        Box::new(group)
    }
}
