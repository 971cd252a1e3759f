//! The canned topologies produced by the keyword classifier.

use cloudgram_core::spec::{Cluster, DiagramSpec, Edge, Node, NodeKind};

use crate::classify::Blueprint;

/// File stem used for microservices diagrams.
pub const MICROSERVICES_STEM: &str = "micro";

/// An API gateway routing to three clustered services that share a queue,
/// a database and monitoring.
pub fn microservices() -> Blueprint {
    let services = ["auth", "payment", "order"];

    let mut edges = vec![
        Edge::new("gateway", services),
        Edge::new("order", ["queue"]),
        Edge::new("payment", ["queue"]),
    ];
    edges.extend(
        services
            .iter()
            .map(|service| Edge::new(*service, ["database", "monitoring"])),
    );

    let spec = DiagramSpec::new(
        "Microservices Architecture",
        vec![
            Node::new("gateway", NodeKind::ApiGateway, "API Gateway"),
            Node::new("queue", NodeKind::Sqs, "SQS Queue"),
            Node::new("database", NodeKind::Rds, "Shared RDS"),
            Node::new("monitoring", NodeKind::CloudWatch, "CloudWatch"),
            Node::new("auth", NodeKind::Ec2, "Authentication Service"),
            Node::new("payment", NodeKind::Ec2, "Payment Service"),
            Node::new("order", NodeKind::Ec2, "Order Service"),
        ],
        edges,
    )
    .with_clusters(vec![Cluster::new("Microservices", services)]);

    Blueprint::new(spec, MICROSERVICES_STEM)
}

/// A load balancer in front of two web servers backed by one database.
pub fn basic_web_app() -> Blueprint {
    let spec = DiagramSpec::new(
        "Basic Web App",
        vec![
            Node::new("alb", NodeKind::Alb, "Load Balancer"),
            Node::new("web1", NodeKind::Ec2, "Web Server 1"),
            Node::new("web2", NodeKind::Ec2, "Web Server 2"),
            Node::new("db", NodeKind::Rds, "Database"),
        ],
        vec![
            Edge::new("alb", ["web1", "web2"]),
            Edge::new("web1", ["db"]),
            Edge::new("web2", ["db"]),
        ],
    );

    Blueprint::from_spec(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(spec: &DiagramSpec, kind: NodeKind) -> usize {
        spec.nodes().iter().filter(|node| *node.kind() == kind).count()
    }

    #[test]
    fn test_microservices_shape() {
        let blueprint = microservices();
        let spec = blueprint.spec();

        assert_eq!(spec.validate(), Ok(()));
        assert_eq!(blueprint.stem(), "micro");
        assert_eq!(count(spec, NodeKind::Ec2), 3);
        assert_eq!(count(spec, NodeKind::ApiGateway), 1);
        assert_eq!(count(spec, NodeKind::Sqs), 1);
        assert_eq!(count(spec, NodeKind::Rds), 1);
        assert_eq!(count(spec, NodeKind::CloudWatch), 1);

        assert_eq!(spec.clusters().len(), 1);
        let members = spec.clusters()[0].members();
        assert_eq!(members.len(), 3);
        for member in members {
            let node = spec.nodes().iter().find(|node| node.id() == member).unwrap();
            assert_eq!(node.kind(), &NodeKind::Ec2);
        }
    }

    #[test]
    fn test_microservices_edges() {
        let blueprint = microservices();
        let pairs: Vec<(&str, &str)> = blueprint
            .spec()
            .edges()
            .iter()
            .flat_map(|edge| {
                edge.targets()
                    .iter()
                    .map(move |target| (edge.source(), target.as_str()))
            })
            .collect();

        // 3 routes, 2 queue writers, 3 x (database + monitoring)
        assert_eq!(pairs.len(), 11);
        assert!(pairs.contains(&("gateway", "auth")));
        assert!(pairs.contains(&("order", "queue")));
        assert!(pairs.contains(&("payment", "queue")));
        assert!(!pairs.contains(&("auth", "queue")));
        assert!(pairs.contains(&("auth", "monitoring")));
    }

    #[test]
    fn test_basic_web_app_shape() {
        let blueprint = basic_web_app();
        let spec = blueprint.spec();

        assert_eq!(spec.validate(), Ok(()));
        assert_eq!(blueprint.stem(), "basic_web_app");
        assert_eq!(count(spec, NodeKind::Alb), 1);
        assert_eq!(count(spec, NodeKind::Ec2), 2);
        assert_eq!(count(spec, NodeKind::Rds), 1);
        assert!(spec.clusters().is_empty());
    }
}
