//! Cloudgram Core Types and Definitions
//!
//! This crate provides the foundational types for Cloudgram architecture
//! diagrams:
//!
//! - **Specification**: the typed graph callers submit ([`spec`] module)
//! - **Errors**: validation failures ([`SpecError`])
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Geometry**: points, sizes, bounds ([`geometry`] module)
//! - **Draw**: icons, strokes, text and render layers ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod spec;

mod error;

pub use error::SpecError;
