//! Visual building blocks for rendered diagrams.
//!
//! - [`icon`] - one [`Icon`] per node category plus the placeholder
//! - [`LayeredOutput`] / [`RenderLayer`] - z-ordered SVG collection
//! - [`StrokeDefinition`] - outline color, width and dash style
//! - [`Text`] / [`TextDefinition`] - labels and their measurement

pub mod icon;

mod layer;
mod stroke;
mod text;

pub use icon::Icon;
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeDefinition, StrokeStyle};
pub use text::{Text, TextDefinition};
