//! SVG export of laid-out diagrams.
//!
//! [`SvgExporter`] turns a [`Layout`] into an `svg::Document`. Everything is
//! drawn in absolute coordinates through a [`LayeredOutput`], so the z-order
//! is fixed: background, cluster frames, nodes, arrows, then the title.
//!
//! Each node becomes a `<g class="node">` holding its icon group and label;
//! each cluster a `<g class="cluster">` holding its dashed frame and label.
//! Labels only ever appear as text content, never inside attributes.

use log::debug;
use svg::{Document, node::element as svg_element};

use cloudgram_core::{
    apply_stroke,
    color::Color,
    draw::{LayeredOutput, RenderLayer, StrokeDefinition, Text, TextDefinition},
    geometry::{Bounds, Point},
};

use crate::layout::{ClusterFrame, EdgeLayout, ICON_SIZE, Layout, NodeLayout};

/// Space around the diagram content.
const MARGIN: f32 = 24.0;

/// Space between the title and the content.
const TITLE_GAP: f32 = 16.0;

/// Fill of the title and cluster labels.
const HEADING_COLOR: &str = "#232F3E";

/// Id of the shared arrow head marker.
const ARROW_MARKER_ID: &str = "arrow-head";

/// Renders [`Layout`]s to SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    background: Color,
    label_text: TextDefinition,
    cluster_text: TextDefinition,
    title_text: TextDefinition,
    edge_stroke: StrokeDefinition,
    cluster_stroke: StrokeDefinition,
    cluster_fill: Color,
}

impl SvgExporter {
    pub fn new(
        background: Color,
        label_text: TextDefinition,
        mut cluster_text: TextDefinition,
    ) -> Self {
        let heading_color = Color::new(HEADING_COLOR).unwrap_or_default();

        let mut title_text = label_text.clone();
        title_text.set_bold(true);
        title_text.set_font_size(label_text.font_size().saturating_add(6));
        title_text.set_color(Some(heading_color));
        cluster_text.set_color(Some(heading_color));

        let edge_color = Color::new("#545B64").unwrap_or_default();
        let cluster_color = Color::new("#7D8998").unwrap_or_default();

        Self {
            background,
            label_text,
            cluster_text,
            title_text,
            edge_stroke: StrokeDefinition::solid(edge_color, 1.5),
            cluster_stroke: StrokeDefinition::dashed(cluster_color, 1.5),
            cluster_fill: cluster_color.with_alpha(0.08),
        }
    }

    /// Builds the complete document for `layout` under `title`.
    pub fn render(&self, title: &str, layout: &Layout<'_>) -> Document {
        let content = layout.bounds();
        let title_size = Text::new(&self.title_text, title).calculate_size();

        let inner_width = content.to_size().max(title_size).width();
        let width = inner_width + MARGIN * 2.0;
        let height = MARGIN * 2.0 + title_size.height() + TITLE_GAP + content.height();

        // Content is centered horizontally below the title
        let offset = Point::new(
            MARGIN + (inner_width - content.width()) / 2.0 - content.min_x(),
            MARGIN + title_size.height() + TITLE_GAP - content.min_y(),
        );

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Background, self.render_background(width, height));

        for frame in layout.clusters() {
            output.add_to_layer(RenderLayer::Cluster, self.render_cluster(frame, offset));
        }

        for node in layout.nodes() {
            output.add_to_layer(RenderLayer::Content, self.render_node(node, offset));
        }

        let mut arrows = 0;
        for edge in layout.edges() {
            if let Some(arrow) = self.render_edge(layout.nodes(), *edge, offset) {
                output.add_to_layer(RenderLayer::Arrow, arrow);
                arrows += 1;
            }
        }

        let title_center = Point::new(width / 2.0, MARGIN + title_size.height() / 2.0);
        output.add_to_layer(
            RenderLayer::Text,
            Box::new(Text::new(&self.title_text, title).render_to_svg(title_center)),
        );

        debug!(width = width, height = height, arrows = arrows; "SVG document assembled");

        let mut document = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(self.render_marker_definitions());

        for group in output.render() {
            document = document.add(group);
        }

        document
    }

    fn render_background(&self, width: f32, height: f32) -> Box<dyn svg::Node> {
        Box::new(
            svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", self.background.to_string())
                .set("fill-opacity", self.background.alpha()),
        )
    }

    fn render_cluster(&self, frame: &ClusterFrame<'_>, offset: Point) -> Box<dyn svg::Node> {
        let bounds: Bounds = frame.bounds().translate(offset);
        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 8)
            .set("fill", self.cluster_fill.to_string())
            .set("fill-opacity", self.cluster_fill.alpha());
        let rect = apply_stroke!(rect, &self.cluster_stroke);

        let label = Text::new(&self.cluster_text, frame.label())
            .render_to_svg(frame.label_center().add_point(offset));

        Box::new(
            svg_element::Group::new()
                .set("class", "cluster")
                .add(rect)
                .add(label),
        )
    }

    fn render_node(&self, node: &NodeLayout<'_>, offset: Point) -> Box<dyn svg::Node> {
        let icon = node
            .node()
            .kind()
            .icon()
            .render_to_svg(node.icon_center().add_point(offset), ICON_SIZE);
        let label = Text::new(&self.label_text, node.node().label())
            .render_to_svg(node.label_center().add_point(offset));

        Box::new(
            svg_element::Group::new()
                .set("class", "node")
                .add(icon)
                .add(label),
        )
    }

    /// Draws a straight arrow between the outlines of two icons.
    ///
    /// Self-loops have no visible extent and are skipped.
    fn render_edge(
        &self,
        nodes: &[NodeLayout<'_>],
        edge: EdgeLayout,
        offset: Point,
    ) -> Option<Box<dyn svg::Node>> {
        if edge.source() == edge.target() {
            return None;
        }

        let source = nodes.get(edge.source())?;
        let target = nodes.get(edge.target())?;
        let source_center = source.icon_center().add_point(offset);
        let target_center = target.icon_center().add_point(offset);

        let start = source
            .node()
            .kind()
            .icon()
            .find_intersection(source_center, target_center, ICON_SIZE);
        let end = target
            .node()
            .kind()
            .icon()
            .find_intersection(target_center, source_center, ICON_SIZE);

        let line = svg_element::Line::new()
            .set("x1", start.x())
            .set("y1", start.y())
            .set("x2", end.x())
            .set("y2", end.y())
            .set("marker-end", format!("url(#{ARROW_MARKER_ID})"));

        Some(Box::new(apply_stroke!(line, &self.edge_stroke)))
    }

    fn render_marker_definitions(&self) -> svg_element::Definitions {
        let color = self.edge_stroke.color();
        let marker = svg_element::Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha()),
            );

        svg_element::Definitions::new().add(marker)
    }
}
