//! Core 2-D stochastic tree growth and render-attribute library.
//!
//! Main components:
//! - [`branch`]: a single branch and its per-step growth rules.
//! - [`tree`]: the branch arena, multi-trunk seeding and the growth driver.
//! - [`render`]: pure derivation of drawable polylines, colors and widths.
//! - [`config`]: growth parameters, per-tree derived values, validation.
//! - [`color`]: RGB color with HSV shading.
//! - [`bounds`]: axis-aligned bounds for fitting a view.
//! - [`landscape`]: several trees placed along a ground strip.
//! - [`types`]: shared type aliases and IDs.

pub mod bounds;
pub mod branch;
pub mod color;
pub mod config;
pub mod landscape;
pub mod render;
pub mod tree;
pub mod types;

pub use config::{GrowthParameters, ParamError};
pub use tree::Tree;
