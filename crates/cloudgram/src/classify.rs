//! Mapping free-text descriptions to diagrams.
//!
//! A [`TopologyClassifier`] turns a description into a [`Blueprint`]: the
//! specification to render and the file stem to name it by. The default
//! [`KeywordClassifier`] only recognises two canned topologies.

use std::fmt;

use log::debug;

use cloudgram_core::spec::DiagramSpec;

use crate::{output::slugify, topology};

/// A specification together with the file stem of its rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    spec: DiagramSpec,
    stem: String,
}

impl Blueprint {
    pub fn new(spec: DiagramSpec, stem: impl Into<String>) -> Self {
        Self {
            spec,
            stem: stem.into(),
        }
    }

    /// Uses the slug of the spec's title as file stem.
    pub fn from_spec(spec: DiagramSpec) -> Self {
        let stem = slugify(spec.title());
        Self { spec, stem }
    }

    pub fn spec(&self) -> &DiagramSpec {
        &self.spec
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }
}

/// Strategy that picks a diagram for a free-text description.
pub trait TopologyClassifier: fmt::Debug + Send + Sync {
    fn classify(&self, description: &str) -> Blueprint;
}

/// Keyword heuristic: any mention of services yields the microservices
/// topology, everything else the basic web app.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    const MICROSERVICE_KEYWORDS: [&'static str; 2] = ["microservices", "service"];
}

impl TopologyClassifier for KeywordClassifier {
    fn classify(&self, description: &str) -> Blueprint {
        let description = description.to_lowercase();

        match Self::MICROSERVICE_KEYWORDS
            .iter()
            .find(|keyword| description.contains(*keyword))
        {
            Some(keyword) => {
                debug!(keyword = keyword; "Description matched microservices topology");
                topology::microservices()
            }
            None => {
                debug!("Description matched no keyword, using basic web app");
                topology::basic_web_app()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let classifier = KeywordClassifier;
        assert_eq!(classifier.classify("Our MICROSERVICES platform").stem(), "micro");
        assert_eq!(classifier.classify("a payment Service").stem(), "micro");
        assert_eq!(classifier.classify("several services").stem(), "micro");
    }

    #[test]
    fn test_fallback_is_basic_web_app() {
        let classifier = KeywordClassifier;
        for description in ["a blog with a database", "", "servers behind a balancer"] {
            let blueprint = classifier.classify(description);
            assert_eq!(blueprint.spec().title(), "Basic Web App");
            assert_eq!(blueprint.stem(), "basic_web_app");
        }
    }

    #[test]
    fn test_blueprint_from_spec_uses_slug() {
        let blueprint = Blueprint::from_spec(DiagramSpec::new("My Stack!", vec![], vec![]));
        assert_eq!(blueprint.stem(), "my_stack_");
    }
}
