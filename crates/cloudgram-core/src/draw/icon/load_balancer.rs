use svg::node::element as svg_element;

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// Load balancer: a hub fanning out to three targets on a purple tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadBalancerIcon;

impl Icon for LoadBalancerIcon {
    fn name(&self) -> &'static str {
        "load-balancer"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);
        let radius = size.width().min(size.height()) * 0.1;
        let hub = unit_point(center, size, 0.3, 0.5);

        let mut group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#8C4FFF")));

        let hub_circle = svg_element::Circle::new()
            .set("cx", hub.x())
            .set("cy", hub.y())
            .set("r", radius)
            .set("fill", "none");
        group = group.add(apply_stroke!(hub_circle, &stroke));

        for uy in [0.25, 0.5, 0.75] {
            let target = unit_point(center, size, 0.75, uy);
            let spoke = svg_element::Line::new()
                .set("x1", hub.x() + radius)
                .set("y1", hub.y())
                .set("x2", target.x() - radius)
                .set("y2", target.y());
            let node = svg_element::Circle::new()
                .set("cx", target.x())
                .set("cy", target.y())
                .set("r", radius * 0.6)
                .set("fill", "white");
            group = group
                .add(apply_stroke!(spoke, &stroke))
                .add(apply_stroke!(node, &stroke));
        }

        Box::new(group)
    }
}
