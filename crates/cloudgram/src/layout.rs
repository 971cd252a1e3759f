//! Layered left-to-right layout.
//!
//! The layout is intentionally simple and fully deterministic:
//!
//! 1. Nodes without incoming edges form layer 0; a breadth-first walk over
//!    a `petgraph` graph puts every other reachable node one layer after the
//!    node that first reached it. Nodes only reachable through cycles are
//!    seeded in declaration order.
//! 2. Inside a layer, members of the same cluster are kept together (in
//!    cluster declaration order), unclustered nodes come last, and ties keep
//!    declaration order.
//! 3. Layers are placed left to right and centered vertically on the
//!    tallest one.
//! 4. Cluster frames are the padded union of their members' bounds.

use std::collections::VecDeque;

use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use cloudgram_core::{
    draw::{Text, TextDefinition},
    geometry::{Bounds, Insets, Point, Size},
    spec::{DiagramSpec, Node},
};

use crate::{config::LayoutConfig, error::CloudgramError};

/// Side length of the box every icon is drawn in.
pub const ICON_SIZE: Size = Size::new(64.0, 64.0);

/// Gap between an icon and its label.
const LABEL_GAP: f32 = 6.0;

/// Extra gap between nodes of different clusters in the same layer.
const CLUSTER_GAP_FACTOR: f32 = 2.0;

/// A node with its final position.
#[derive(Debug, Clone)]
pub struct NodeLayout<'a> {
    node: &'a Node,
    bounds: Bounds,
    icon_center: Point,
    label_center: Point,
}

impl<'a> NodeLayout<'a> {
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Bounds of the icon and its label together.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn icon_center(&self) -> Point {
        self.icon_center
    }

    pub fn label_center(&self) -> Point {
        self.label_center
    }
}

/// A positioned edge between two laid-out nodes, by index into
/// [`Layout::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLayout {
    source: usize,
    target: usize,
}

impl EdgeLayout {
    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

/// A cluster frame around its members.
#[derive(Debug, Clone)]
pub struct ClusterFrame<'a> {
    label: &'a str,
    bounds: Bounds,
    label_center: Point,
}

impl<'a> ClusterFrame<'a> {
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn label_center(&self) -> Point {
        self.label_center
    }
}

/// The complete positioned diagram.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    nodes: Vec<NodeLayout<'a>>,
    edges: Vec<EdgeLayout>,
    clusters: Vec<ClusterFrame<'a>>,
}

impl<'a> Layout<'a> {
    /// Laid-out nodes in declaration order.
    pub fn nodes(&self) -> &[NodeLayout<'a>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeLayout] {
        &self.edges
    }

    pub fn clusters(&self) -> &[ClusterFrame<'a>] {
        &self.clusters
    }

    /// Bounds covering every node and cluster frame.
    pub fn bounds(&self) -> Bounds {
        self.nodes
            .iter()
            .map(NodeLayout::bounds)
            .chain(self.clusters.iter().map(ClusterFrame::bounds))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
    }
}

/// Computes [`Layout`]s for validated specifications.
#[derive(Debug, Clone)]
pub struct Engine {
    config: LayoutConfig,
    label_text: TextDefinition,
    cluster_text: TextDefinition,
}

impl Engine {
    pub fn new(config: LayoutConfig, label_text: TextDefinition) -> Self {
        let mut cluster_text = label_text.clone();
        cluster_text.set_bold(true);
        Self {
            config,
            label_text,
            cluster_text,
        }
    }

    /// Text style used for cluster labels.
    pub fn cluster_text(&self) -> &TextDefinition {
        &self.cluster_text
    }

    /// Positions every node, edge and cluster of `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Export`] if an edge or cluster refers to a
    /// node that is not declared; validate the spec first.
    pub fn calculate<'a>(&self, spec: &'a DiagramSpec) -> Result<Layout<'a>, CloudgramError> {
        let indices = spec.node_indices();
        let lookup = |id: &str| {
            indices
                .get(id)
                .copied()
                .ok_or_else(|| CloudgramError::Export(format!("node `{id}` not found in layout")))
        };

        let mut edges = Vec::new();
        for edge in spec.edges() {
            let source = lookup(edge.source())?;
            for target in edge.targets() {
                edges.push(EdgeLayout {
                    source,
                    target: lookup(target)?,
                });
            }
        }

        let mut cluster_of = vec![None; spec.nodes().len()];
        for (cluster_idx, cluster) in spec.clusters().iter().enumerate() {
            for member in cluster.members() {
                cluster_of[lookup(member)?] = Some(cluster_idx);
            }
        }

        let layers = assign_layers(spec.nodes().len(), &edges);
        let ordered = order_layers(&layers, &cluster_of);
        debug!(layers = ordered.len(), edges = edges.len(); "Layers assigned");

        let sizes: Vec<(Size, Size)> = spec
            .nodes()
            .iter()
            .map(|node| {
                let label = Text::new(&self.label_text, node.label()).calculate_size();
                (label, node_size(label))
            })
            .collect();

        let nodes = self.place(spec, &ordered, &cluster_of, &sizes);
        let clusters = self.frame_clusters(spec, &nodes, &cluster_of);

        Ok(Layout {
            nodes,
            edges,
            clusters,
        })
    }

    fn place<'a>(
        &self,
        spec: &'a DiagramSpec,
        ordered: &[Vec<usize>],
        cluster_of: &[Option<usize>],
        sizes: &[(Size, Size)],
    ) -> Vec<NodeLayout<'a>> {
        let cluster_gap = self.config.cluster_padding() * CLUSTER_GAP_FACTOR
            + f32::from(self.cluster_text.font_size());

        // Height of each layer column, with the gaps between its nodes
        let column_heights: Vec<f32> = ordered
            .iter()
            .map(|members| {
                let mut height = 0.0;
                for (pos, &idx) in members.iter().enumerate() {
                    if pos > 0 {
                        let previous = cluster_of[members[pos - 1]];
                        height += self.gap_between(previous, cluster_of[idx], cluster_gap);
                    }
                    height += sizes[idx].1.height();
                }
                height
            })
            .collect();
        let tallest = column_heights.iter().copied().fold(0.0, f32::max);

        let mut centers = vec![Point::default(); spec.nodes().len()];
        let mut left = 0.0;
        for (members, column_height) in ordered.iter().zip(&column_heights) {
            let column_width = members
                .iter()
                .map(|&idx| sizes[idx].1.width())
                .fold(0.0, f32::max);
            let x = left + column_width / 2.0;

            let mut top = (tallest - column_height) / 2.0;
            for (pos, &idx) in members.iter().enumerate() {
                if pos > 0 {
                    let previous = cluster_of[members[pos - 1]];
                    top += self.gap_between(previous, cluster_of[idx], cluster_gap);
                }
                let height = sizes[idx].1.height();
                centers[idx] = Point::new(x, top + height / 2.0);
                top += height;
            }

            left += column_width + self.config.horizontal_spacing();
        }

        spec.nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let (label_size, size) = sizes[idx];
                let bounds = Bounds::new_from_center(centers[idx], size);
                let icon_center = Point::new(
                    bounds.center().x(),
                    bounds.min_y() + ICON_SIZE.height() / 2.0,
                );
                let label_center = Point::new(
                    bounds.center().x(),
                    bounds.min_y() + ICON_SIZE.height() + LABEL_GAP + label_size.height() / 2.0,
                );
                NodeLayout {
                    node,
                    bounds,
                    icon_center,
                    label_center,
                }
            })
            .collect()
    }

    fn gap_between(
        &self,
        previous: Option<usize>,
        current: Option<usize>,
        cluster_gap: f32,
    ) -> f32 {
        if previous == current {
            self.config.vertical_spacing()
        } else {
            self.config.vertical_spacing() + cluster_gap
        }
    }

    fn frame_clusters<'a>(
        &self,
        spec: &'a DiagramSpec,
        nodes: &[NodeLayout<'a>],
        cluster_of: &[Option<usize>],
    ) -> Vec<ClusterFrame<'a>> {
        let padding = self.config.cluster_padding();

        spec.clusters()
            .iter()
            .enumerate()
            .filter_map(|(cluster_idx, cluster)| {
                let members = nodes
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| cluster_of[*idx] == Some(cluster_idx))
                    .map(|(_, node)| node.bounds())
                    .reduce(|acc, bounds| acc.merge(&bounds));

                // A cluster without members has nothing to frame
                let members = members?;

                let label_size = Text::new(&self.cluster_text, cluster.label()).calculate_size();
                let mut bounds = members.add_padding(Insets::new(
                    padding + label_size.height(),
                    padding,
                    padding,
                    padding,
                ));
                let width = label_size.width() + padding * 2.0;
                if bounds.width() < width {
                    let extra = (width - bounds.width()) / 2.0;
                    bounds = bounds.add_padding(Insets::new(0.0, extra, 0.0, extra));
                }

                Some(ClusterFrame {
                    label: cluster.label(),
                    bounds,
                    label_center: Point::new(
                        bounds.center().x(),
                        bounds.min_y() + padding / 2.0 + label_size.height() / 2.0,
                    ),
                })
            })
            .collect()
    }
}

/// Size of a node box: the icon stacked above its label.
fn node_size(label: Size) -> Size {
    ICON_SIZE
        .merge_vertical(Size::new(0.0, LABEL_GAP))
        .merge_vertical(label)
}

/// Assigns a layer to every node by breadth-first search from the roots.
fn assign_layers(node_count: usize, edges: &[EdgeLayout]) -> Vec<usize> {
    let mut graph = DiGraph::<usize, ()>::with_capacity(node_count, edges.len());
    let handles: Vec<NodeIndex> = (0..node_count).map(|idx| graph.add_node(idx)).collect();
    for edge in edges {
        graph.add_edge(handles[edge.source], handles[edge.target], ());
    }

    let mut layers: Vec<Option<usize>> = vec![None; node_count];
    let mut queue = VecDeque::new();

    for &handle in &handles {
        if graph
            .neighbors_directed(handle, Direction::Incoming)
            .next()
            .is_none()
        {
            layers[graph[handle]] = Some(0);
            queue.push_back(handle);
        }
    }

    loop {
        while let Some(current) = queue.pop_front() {
            let next_layer = layers[graph[current]].unwrap_or_default() + 1;

            let mut successors: Vec<NodeIndex> = graph
                .neighbors_directed(current, Direction::Outgoing)
                .collect();
            successors.sort_unstable();
            successors.dedup();

            for successor in successors {
                let slot = &mut layers[graph[successor]];
                if slot.is_none() {
                    *slot = Some(next_layer);
                    queue.push_back(successor);
                }
            }
        }

        // Nodes only reachable through a cycle
        match layers.iter().position(Option::is_none) {
            Some(idx) => {
                layers[idx] = Some(0);
                queue.push_back(handles[idx]);
            }
            None => break,
        }
    }

    layers.into_iter().map(Option::unwrap_or_default).collect()
}

/// Groups node indices by layer, ordered by cluster then declaration.
fn order_layers(layers: &[usize], cluster_of: &[Option<usize>]) -> Vec<Vec<usize>> {
    let layer_count = layers.iter().max().map_or(0, |max| max + 1);
    let mut ordered = vec![Vec::new(); layer_count];
    for (idx, &layer) in layers.iter().enumerate() {
        ordered[layer].push(idx);
    }
    for members in &mut ordered {
        members.sort_by_key(|&idx| (cluster_of[idx].unwrap_or(usize::MAX), idx));
    }
    ordered
}
