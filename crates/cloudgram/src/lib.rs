//! Cloudgram - render cloud architecture diagrams.
//!
//! Validation, layout, SVG export, PNG rasterisation and output management
//! for typed architecture specifications, plus the keyword classifier that
//! maps free-text descriptions to canned topologies.

pub mod classify;
pub mod config;
pub mod output;
pub mod topology;

mod error;
mod export;
mod layout;
mod raster;

pub use cloudgram_core::{SpecError, color, draw, geometry, spec};

pub use error::CloudgramError;

use std::{
    io,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use classify::{Blueprint, KeywordClassifier, TopologyClassifier};
use config::AppConfig;
use export::SvgExporter;
use layout::Engine;
use output::{OutputDir, RetentionPolicy, SweepReport, slugify};
use raster::Rasterizer;
use spec::DiagramSpec;

/// Renders diagram specifications to PNG files.
///
/// A `Renderer` owns everything that is expensive to set up: the output
/// directory (created once, on construction) and the system font database.
/// It is `Send + Sync`; render calls are independent of each other.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudgram::{Renderer, config::AppConfig};
/// use cloudgram::spec::{DiagramSpec, Edge, Node, NodeKind};
///
/// let renderer = Renderer::new(AppConfig::default()).expect("valid config");
///
/// let spec = DiagramSpec::new(
///     "Two Tier",
///     vec![
///         Node::new("web", NodeKind::Ec2, "Web"),
///         Node::new("db", NodeKind::Rds, "Database"),
///     ],
///     vec![Edge::new("web", ["db"])],
/// );
///
/// let path = renderer.render(&spec).expect("rendered");
/// println!("{}", path.display());
/// ```
#[derive(Debug)]
pub struct Renderer {
    output: OutputDir,
    retention: RetentionPolicy,
    engine: Engine,
    exporter: SvgExporter,
    rasterizer: Rasterizer,
    classifier: Box<dyn TopologyClassifier>,
}

impl Renderer {
    /// Creates a renderer, creating the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Config`] for an invalid background color or
    /// PNG scale and [`CloudgramError::Io`] if the output directory cannot be
    /// created.
    pub fn new(config: AppConfig) -> Result<Self, CloudgramError> {
        let background = config
            .style()
            .background_color()
            .map_err(CloudgramError::Config)?
            .unwrap_or_else(|| color::Color::new("white").unwrap_or_default());

        let label_text = config.style().label_text();
        let engine = Engine::new(*config.layout(), label_text.clone());
        let exporter = SvgExporter::new(
            background,
            label_text.clone(),
            engine.cluster_text().clone(),
        );
        let rasterizer = Rasterizer::new(label_text.font_family(), config.output().scale())?;

        let output = OutputDir::create(config.output().directory())?;
        info!(
            output_dir:? = output.root(),
            scale = rasterizer.scale();
            "Renderer ready"
        );

        Ok(Self {
            output,
            retention: config.output().retention().policy(),
            engine,
            exporter,
            rasterizer,
            classifier: Box::new(KeywordClassifier),
        })
    }

    /// Replaces the strategy used by [`Renderer::classify_and_render`].
    pub fn with_classifier(mut self, classifier: impl TopologyClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Directory the rendered files are written to.
    pub fn output_dir(&self) -> &Path {
        self.output.root()
    }

    /// Validates, lays out and exports `spec` as an SVG string.
    ///
    /// Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Validation`] if the spec is invalid.
    pub fn render_svg(&self, spec: &DiagramSpec) -> Result<String, CloudgramError> {
        spec.validate()?;
        self.export_svg(spec)
    }

    /// Renders `spec` to a new PNG file named after its title and returns
    /// the file's path.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Validation`] before touching the filesystem
    /// if the spec is invalid, [`CloudgramError::Raster`] if the image cannot
    /// be produced and [`CloudgramError::Io`] if it cannot be stored.
    pub fn render(&self, spec: &DiagramSpec) -> Result<PathBuf, CloudgramError> {
        self.render_as(spec, &slugify(spec.title()))
    }

    /// Picks a topology for `description` and renders it.
    ///
    /// # Errors
    ///
    /// Same as [`Renderer::render`].
    pub fn classify_and_render(&self, description: &str) -> Result<PathBuf, CloudgramError> {
        let blueprint = self.classifier.classify(description);
        info!(
            title = blueprint.spec().title(),
            stem = blueprint.stem();
            "Description classified"
        );
        self.render_blueprint(&blueprint)
    }

    /// Renders a classifier result under its own file stem.
    ///
    /// # Errors
    ///
    /// Same as [`Renderer::render`].
    pub fn render_blueprint(&self, blueprint: &Blueprint) -> Result<PathBuf, CloudgramError> {
        self.render_as(blueprint.spec(), blueprint.stem())
    }

    /// Applies the configured retention policy to the output directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output directory cannot be listed.
    pub fn sweep(&self) -> io::Result<SweepReport> {
        self.output.sweep(&self.retention)
    }

    fn render_as(&self, spec: &DiagramSpec, stem: &str) -> Result<PathBuf, CloudgramError> {
        info!(title = spec.title(), nodes = spec.nodes().len(); "Rendering diagram");
        spec.validate()?;

        let svg = self.export_svg(spec)?;
        let png = self.rasterizer.to_png(&svg)?;
        let path = self.output.persist(stem, &png)?;

        info!(path:? = path; "Diagram saved");
        Ok(path)
    }

    fn export_svg(&self, spec: &DiagramSpec) -> Result<String, CloudgramError> {
        let layout = self.engine.calculate(spec)?;
        debug!(
            nodes = layout.nodes().len(),
            clusters = layout.clusters().len();
            "Layout calculated"
        );

        let svg = self.exporter.render(spec.title(), &layout).to_string();
        trace!(svg = svg.as_str(); "SVG exported");
        Ok(svg)
    }
}
