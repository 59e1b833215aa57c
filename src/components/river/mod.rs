//! Lineage river visualization.
//!
//! Renders organizations as horizontal bars on a year axis, stacked by tier,
//! with curved links for transfers, successions, merges, and splits:
//! - Deterministic year-based layout with collision-free row packing
//! - Viewport culling, debounced while the view moves
//! - Pan/zoom clamped to the content, with zoom-dependent level of detail
//! - Shortest-path navigation with animated focus and pulsing highlights
//!
//! Everything except [`RiverCanvas`] and the canvas painter is plain Rust
//! with no browser dependency.
//!
//! # Example
//!
//! ```ignore
//! use lineage_river::{GraphData, RiverCanvas};
//!
//! let data = GraphData::from_json(payload)?;
//! view! { <RiverCanvas data=data fullscreen=true /> }
//! ```

mod bounds;
mod component;
mod config;
mod error;
mod geometry;
mod layout;
mod navigation;
mod perf;
mod render;
mod renderer;
pub mod scale;
mod scene;
mod schedule;
mod session;
pub mod theme;
mod types;
mod viewport;
mod zoom_level;

pub use component::RiverCanvas;
pub use config::RiverConfig;
pub use error::{Error, Result};
pub use geometry::{Point, Viewport, YearRange, YearScale};
pub use layout::{Layout, LayoutCalculator};
pub use navigation::{Edge, PulseTarget, find_path, find_path_indices};
pub use renderer::RenderDetail;
pub use session::InteractionSession;
pub use theme::Theme;
pub use types::{GraphData, GraphFilter, LineageGraph, LinkType, NodeId};
pub use viewport::{ViewTransform, ViewportManager};
pub use zoom_level::{ZoomLevel, ZoomLevelManager};
