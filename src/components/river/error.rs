//! Error type shared by payload validation and layout.

use super::types::NodeId;

/// Failures that stop a graph from being laid out.
///
/// Recoverable problems (dangling links, duplicate ids, empty filter results)
/// never surface here; they are counted in
/// the layout diagnostics instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The payload lacks a required top-level array.
	#[error("graph payload is missing the `{field}` array")]
	MissingField {
		/// Name of the missing array.
		field: &'static str,
	},
	/// A node was given without any eras.
	#[error("node {node_id} has no eras")]
	EmptyEras {
		/// Offending node.
		node_id: NodeId,
	},
	/// Nothing to derive a year range from.
	#[error("graph has no nodes, cannot derive a year range")]
	EmptyGraph,
	/// The page has no payload element.
	#[error("no graph payload found in <script id=\"{id}\">")]
	PayloadNotFound {
		/// Element id that was looked up.
		id: String,
	},
	/// The payload is not valid JSON for the graph shape.
	#[error("failed to parse graph payload: {0}")]
	Parse(#[from] serde_json::Error),
	/// The canvas refused a 2D context.
	#[error("canvas 2d context unavailable")]
	CanvasUnavailable,
}

/// Result alias for river operations.
pub type Result<T> = std::result::Result<T, Error>;
