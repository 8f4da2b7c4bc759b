//! chart-layout: axis and layout engine for 2D charts.
//!
//! Axes compute ranges, tick marks and labels and draw themselves into a
//! [`render::Canvas`]. A [`Chart`] docks axes around a plot area, drives
//! renderers and plugins through pre-layout, layout and post-layout, and
//! coordinates datasets mutated from producer threads through bit states and
//! a render queue.

pub mod api;
pub mod axis;
pub mod core;
pub mod dataset;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartConfig};
pub use error::{ChartError, ChartResult};
