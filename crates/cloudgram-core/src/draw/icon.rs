//! Icon definitions for node categories.
//!
//! Every [`NodeKind`](crate::spec::NodeKind) resolves to exactly one
//! `&'static dyn Icon`. Icons are stateless: they render themselves into a box
//! of a given size around a center point and report where an incoming or
//! outgoing edge meets their outline.
//!
//! The built-in icons follow the usual cloud-architecture convention of a
//! colored rounded tile with a white glyph. Unknown node kinds get the
//! [`PlaceholderIcon`], a dashed blank frame.

use std::fmt;

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    color::Color,
    draw::{StrokeDefinition, layer::SvgNode},
    geometry::{Point, Size, rectangle_intersection},
};

mod compute;
mod database;
mod gateway;
mod load_balancer;
mod monitoring;
mod placeholder;
mod queue;

pub use compute::ComputeIcon;
pub use database::DatabaseIcon;
pub use gateway::GatewayIcon;
pub use load_balancer::LoadBalancerIcon;
pub use monitoring::MonitoringIcon;
pub use placeholder::PlaceholderIcon;
pub use queue::QueueIcon;

/// Rendering capability of a node category.
pub trait Icon: fmt::Debug + Send + Sync {
    /// Short, stable name used in the `data-icon` attribute of rendered nodes.
    fn name(&self) -> &'static str;

    /// Renders the icon into a box of `size` centered on `center`.
    fn render_to_svg(&self, center: Point, size: Size) -> SvgNode;

    /// Point where the ray from `a` towards `b` leaves this icon when it is
    /// drawn at `a` with `a_size`.
    fn find_intersection(&self, a: Point, b: Point, a_size: Size) -> Point {
        rectangle_intersection(a, b, a_size)
    }
}

/// Colored rounded tile that backs every built-in icon.
fn tile(center: Point, size: Size, fill: Color) -> svg_element::Rectangle {
    let bounds = center.to_bounds(size);
    let outline = StrokeDefinition::solid(fill, 1.0);
    let rect = svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", size.width())
        .set("height", size.height())
        .set("rx", size.width().min(size.height()) * 0.12)
        .set("fill", fill.to_string())
        .set("fill-opacity", fill.alpha());
    apply_stroke!(rect, &outline)
}

/// White stroke used for the glyph drawn on top of a tile.
fn glyph_stroke(size: Size) -> StrokeDefinition {
    StrokeDefinition::solid(
        Color::new("white").unwrap_or_default(),
        (size.width().min(size.height()) * 0.045).max(1.0),
    )
}

/// Maps unit coordinates (0..1 across the icon box) to diagram space.
fn unit_point(center: Point, size: Size, ux: f32, uy: f32) -> Point {
    let bounds = center.to_bounds(size);
    Point::new(
        bounds.min_x() + ux * size.width(),
        bounds.min_y() + uy * size.height(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_icons() -> Vec<&'static dyn Icon> {
        vec![
            &ComputeIcon,
            &DatabaseIcon,
            &GatewayIcon,
            &LoadBalancerIcon,
            &MonitoringIcon,
            &QueueIcon,
            &PlaceholderIcon,
        ]
    }

    #[test]
    fn test_icon_names_are_unique() {
        let mut names: Vec<_> = all_icons().iter().map(|icon| icon.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all_icons().len());
    }

    #[test]
    fn test_single_placeholder_icon() {
        let placeholders = all_icons()
            .into_iter()
            .filter(|icon| icon.name() == "placeholder")
            .count();
        assert_eq!(placeholders, 1);
        assert_eq!(PlaceholderIcon.name(), "placeholder");
    }

    #[test]
    fn test_icons_render_non_empty_svg() {
        for icon in all_icons() {
            let rendered = icon
                .render_to_svg(Point::new(40.0, 40.0), Size::new(64.0, 64.0))
                .to_string();
            assert!(rendered.starts_with("<g"), "{} should render a group", icon.name());
            assert!(rendered.len() > 20);
        }
    }

    #[test]
    fn test_unit_point_maps_corners() {
        let center = Point::new(50.0, 50.0);
        let size = Size::new(20.0, 10.0);
        assert_eq!(unit_point(center, size, 0.0, 0.0), Point::new(40.0, 45.0));
        assert_eq!(unit_point(center, size, 1.0, 1.0), Point::new(60.0, 55.0));
    }
}
