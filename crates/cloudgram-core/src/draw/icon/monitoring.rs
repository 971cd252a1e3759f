use svg::node::element as svg_element;

use super::{Icon, glyph_stroke, tile, unit_point};
use crate::{
    apply_stroke,
    color::palette,
    draw::layer::SvgNode,
    geometry::{Point, Size},
};

/// Monitoring service: a metric pulse inside a gauge ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoringIcon;

impl Icon for MonitoringIcon {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode {
        let stroke = glyph_stroke(size);

        let ring = svg_element::Circle::new()
            .set("cx", center.x())
            .set("cy", center.y())
            .set("r", size.width().min(size.height()) * 0.3)
            .set("fill", "none");

        let points = [
            (0.25, 0.52),
            (0.38, 0.52),
            (0.45, 0.36),
            (0.55, 0.66),
            (0.62, 0.48),
            (0.75, 0.48),
        ]
        .iter()
        .map(|&(ux, uy)| {
            let p = unit_point(center, size, ux, uy);
            format!("{},{}", p.x(), p.y())
        })
        .collect::<Vec<_>>()
        .join(" ");
        let pulse = svg_element::Polyline::new()
            .set("points", points)
            .set("fill", "none");

        let group = svg_element::Group::new()
            .set("data-icon", self.name())
            .add(tile(center, size, palette("#D6246E")))
            .add(apply_stroke!(ring, &stroke))
            .add(apply_stroke!(pulse, &stroke));

        Box::new(group)
    }
}
