//! Diagram specification model.
//!
//! A [`DiagramSpec`] is the typed graph a caller hands to the renderer: a
//! title, typed [`Node`]s, directed [`Edge`]s and optional cosmetic
//! [`Cluster`]s. The JSON form matches what the HTTP layer and the
//! conversational assistant exchange:
//!
//! ```
//! # use cloudgram_core::spec::{DiagramSpec, NodeKind};
//! let spec: DiagramSpec = serde_json::from_str(r#"{
//!     "title": "Basic Web App",
//!     "nodes": [
//!         {"id": "alb", "type": "ALB", "label": "Load Balancer"},
//!         {"id": "web", "type": "EC2", "label": "Web Server"}
//!     ],
//!     "edges": [{"from": "alb", "to": ["web"]}]
//! }"#).unwrap();
//!
//! assert_eq!(spec.nodes()[0].kind(), &NodeKind::Alb);
//! assert!(spec.clusters().is_empty());
//! assert!(spec.validate().is_ok());
//! ```

use std::fmt;

use indexmap::{IndexMap, map::Entry};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    draw::icon::{
        ComputeIcon, DatabaseIcon, GatewayIcon, Icon, LoadBalancerIcon, MonitoringIcon,
        PlaceholderIcon, QueueIcon,
    },
    error::SpecError,
};

/// Icon category of a node.
///
/// The set is closed: any other type string is kept verbatim in
/// [`NodeKind::Unknown`] and drawn with the placeholder icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Ec2,
    Rds,
    Alb,
    Elb,
    ApiGateway,
    Sqs,
    CloudWatch,
    Unknown(String),
}

impl NodeKind {
    /// Canonical type string, as accepted in JSON.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ec2 => "EC2",
            Self::Rds => "RDS",
            Self::Alb => "ALB",
            Self::Elb => "ELB",
            Self::ApiGateway => "APIGateway",
            Self::Sqs => "SQS",
            Self::CloudWatch => "CloudWatch",
            Self::Unknown(name) => name,
        }
    }

    /// Resolves the icon used to draw nodes of this kind.
    pub fn icon(&self) -> &'static dyn Icon {
        match self {
            Self::Ec2 => &ComputeIcon,
            Self::Rds => &DatabaseIcon,
            Self::Alb | Self::Elb => &LoadBalancerIcon,
            Self::ApiGateway => &GatewayIcon,
            Self::Sqs => &QueueIcon,
            Self::CloudWatch => &MonitoringIcon,
            Self::Unknown(_) => &PlaceholderIcon,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for NodeKind {
    fn from(value: &str) -> Self {
        const KNOWN: [NodeKind; 7] = [
            NodeKind::Ec2,
            NodeKind::Rds,
            NodeKind::Alb,
            NodeKind::Elb,
            NodeKind::ApiGateway,
            NodeKind::Sqs,
            NodeKind::CloudWatch,
        ];

        let trimmed = value.trim();
        KNOWN
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Unknown(value.to_string()))
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, labelled vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    label: String,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A directed connection from one node to one or more nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    from: String,
    to: Vec<String>,
}

impl Edge {
    pub fn new<I, S>(from: impl Into<String>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Id of the node the edge starts from.
    pub fn source(&self) -> &str {
        &self.from
    }

    /// Ids of the nodes the edge points to.
    pub fn targets(&self) -> &[String] {
        &self.to
    }
}

/// A labelled visual grouping of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    label: String,
    members: Vec<String>,
}

impl Cluster {
    pub fn new<I, S>(label: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

/// A complete diagram description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    title: String,
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    clusters: Vec<Cluster>,
}

impl DiagramSpec {
    pub fn new(title: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            title: title.into(),
            nodes,
            edges,
            clusters: Vec::new(),
        }
    }

    pub fn with_clusters(mut self, clusters: Vec<Cluster>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Checks the structural invariants required for rendering.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant, checked in this order: title,
    /// node presence, id uniqueness, edge references, cluster references,
    /// single cluster membership.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.title.trim().is_empty() {
            return Err(SpecError::EmptyTitle);
        }

        if self.nodes.is_empty() {
            return Err(SpecError::NoNodes);
        }

        let mut ids = IndexMap::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            if ids.insert(node.id(), idx).is_some() {
                return Err(SpecError::DuplicateNodeId(node.id().to_string()));
            }
        }

        for edge in &self.edges {
            let dangling = std::iter::once(edge.source())
                .chain(edge.targets().iter().map(String::as_str))
                .find(|id| !ids.contains_key(id));
            if let Some(id) = dangling {
                return Err(SpecError::UnknownNodeReference {
                    edge_from: edge.source().to_string(),
                    id: id.to_string(),
                });
            }
        }

        let mut membership: IndexMap<&str, &str> = IndexMap::new();
        for cluster in &self.clusters {
            for member in cluster.members() {
                if !ids.contains_key(member.as_str()) {
                    return Err(SpecError::UnknownClusterMember {
                        cluster: cluster.label().to_string(),
                        id: member.clone(),
                    });
                }

                match membership.entry(member.as_str()) {
                    Entry::Vacant(entry) => {
                        entry.insert(cluster.label());
                    }
                    Entry::Occupied(entry) if *entry.get() != cluster.label() => {
                        return Err(SpecError::NodeInMultipleClusters {
                            id: member.clone(),
                            first: entry.get().to_string(),
                            second: cluster.label().to_string(),
                        });
                    }
                    // Listed twice in the same cluster
                    Entry::Occupied(_) => {}
                }
            }
        }

        for node in self.nodes.iter().filter(|node| node.kind().is_unknown()) {
            warn!(node_id = node.id(), node_type = node.kind().as_str(); "Unknown node type, using placeholder icon");
        }

        Ok(())
    }

    /// Maps node ids to their declaration index.
    ///
    /// Only meaningful on a validated spec; a duplicate id keeps its last index.
    pub fn node_indices(&self) -> IndexMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id(), idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_app() -> DiagramSpec {
        DiagramSpec::new(
            "Web",
            vec![
                Node::new("alb", NodeKind::Alb, "Load Balancer"),
                Node::new("web", NodeKind::Ec2, "Web Server"),
                Node::new("db", NodeKind::Rds, "Database"),
            ],
            vec![Edge::new("alb", ["web"]), Edge::new("web", ["db"])],
        )
    }

    #[test]
    fn test_node_kind_parsing_is_case_insensitive() {
        assert_eq!(NodeKind::from("EC2"), NodeKind::Ec2);
        assert_eq!(NodeKind::from("ec2"), NodeKind::Ec2);
        assert_eq!(NodeKind::from("apigateway"), NodeKind::ApiGateway);
        assert_eq!(NodeKind::from(" CloudWatch "), NodeKind::CloudWatch);
        assert_eq!(
            NodeKind::from("Lambda"),
            NodeKind::Unknown("Lambda".to_string())
        );
    }

    #[test]
    fn test_node_kind_icons() {
        assert_eq!(NodeKind::Alb.icon().name(), NodeKind::Elb.icon().name());
        assert_eq!(NodeKind::Ec2.icon().name(), "compute");
        assert_eq!(NodeKind::from("Lambda").icon().name(), "placeholder");
        assert_eq!(NodeKind::Sqs.icon().name(), "queue");
    }

    #[test]
    fn test_unknown_kind_round_trips_through_json() {
        let node = Node::new("fn", NodeKind::from("Lambda"), "Function");
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""type":"Lambda""#));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_edge_uses_from_field_name() {
        let edge: Edge = serde_json::from_str(r#"{"from": "a", "to": ["b", "c"]}"#).unwrap();
        assert_eq!(edge.source(), "a");
        assert_eq!(edge.targets(), ["b", "c"]);
    }

    #[test]
    fn test_edges_and_clusters_default_to_empty() {
        let spec: DiagramSpec = serde_json::from_str(
            r#"{"title": "Lonely", "nodes": [{"id": "a", "type": "EC2", "label": "A"}]}"#,
        )
        .unwrap();
        assert!(spec.edges().is_empty());
        assert!(spec.clusters().is_empty());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_valid_spec() {
        assert_eq!(web_app().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let spec = DiagramSpec::new("   ", web_app().nodes().to_vec(), vec![]);
        assert_eq!(spec.validate(), Err(SpecError::EmptyTitle));
    }

    #[test]
    fn test_validate_rejects_no_nodes() {
        let spec = DiagramSpec::new("Empty", vec![], vec![]);
        assert_eq!(spec.validate(), Err(SpecError::NoNodes));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let spec = DiagramSpec::new(
            "Dup",
            vec![
                Node::new("a", NodeKind::Ec2, "A"),
                Node::new("a", NodeKind::Rds, "A again"),
            ],
            vec![],
        );
        assert_eq!(
            spec.validate(),
            Err(SpecError::DuplicateNodeId("a".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_unknown_edge_target() {
        let mut spec = web_app();
        spec.edges.push(Edge::new("web", ["cache"]));
        let err = spec.validate().unwrap_err();
        assert!(err.is_reference_error());
        assert_eq!(
            err,
            SpecError::UnknownNodeReference {
                edge_from: "web".to_string(),
                id: "cache".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_unknown_edge_source() {
        let mut spec = web_app();
        spec.edges.push(Edge::new("ghost", ["web"]));
        assert!(matches!(
            spec.validate(),
            Err(SpecError::UnknownNodeReference { id, .. }) if id == "ghost"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_cluster_member() {
        let spec = web_app().with_clusters(vec![Cluster::new("Tier", ["web", "nope"])]);
        let err = spec.validate().unwrap_err();
        assert!(err.is_reference_error());
    }

    #[test]
    fn test_validate_rejects_node_in_two_clusters() {
        let spec = web_app().with_clusters(vec![
            Cluster::new("Front", ["alb", "web"]),
            Cluster::new("Back", ["web", "db"]),
        ]);
        assert!(matches!(
            spec.validate(),
            Err(SpecError::NodeInMultipleClusters { id, .. }) if id == "web"
        ));
    }

    #[test]
    fn test_empty_edge_targets_are_allowed() {
        let mut spec = web_app();
        spec.edges.push(Edge::new("db", Vec::<String>::new()));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_node_indices_follow_declaration_order() {
        let spec = web_app();
        let indices = spec.node_indices();
        assert_eq!(indices.get_index(0), Some((&"alb", &0)));
        assert_eq!(indices["db"], 2);
    }
}
