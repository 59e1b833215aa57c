//! Lineage graph payload and its validated form.
//!
//! The payload arrives as JSON from the timeline API:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "7", "founding_year": 1989, "eras": [{ "year": 1989, "name": "Team A", "tier": 1 }] }],
//!   "links": [{ "source": "7", "target": "9", "type": "LEGAL_TRANSFER", "year": 2001 }]
//! }
//! ```
//!
//! [`GraphData::validate`] turns it into a [`LineageGraph`], the only input
//! the layout accepts.

use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde::Deserialize;

use super::error::{Error, Result};
use super::geometry::YearRange;

/// Tier assumed for nodes whose eras carry no tier data.
pub const DEFAULT_TIER: u32 = 2;

/// Stable node identifier. Accepts both strings and integers on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "WireId")]
pub struct NodeId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
	Text(String),
	Number(i64),
}

impl From<WireId> for NodeId {
	fn from(id: WireId) -> Self {
		match id {
			WireId::Text(text) => Self(text),
			WireId::Number(n) => Self(n.to_string()),
		}
	}
}

impl NodeId {
	/// Id from any string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Id as text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// One sponsor on an era's jersey.
#[derive(Clone, Debug, Deserialize)]
pub struct Sponsor {
	/// `#RRGGBB` hex color.
	pub color: String,
	pub brand: String,
	/// Share of the jersey, 0–100.
	pub prominence: f64,
}

impl Sponsor {
	/// Prominence clamped to the valid percentage range.
	pub fn share(&self) -> f64 {
		self.prominence.clamp(0.0, 100.0)
	}
}

/// A time-bounded identity snapshot of a node.
#[derive(Clone, Debug, Deserialize)]
pub struct Era {
	pub year: i32,
	pub name: String,
	/// Competitive tier; lower is higher.
	#[serde(default)]
	pub tier: Option<u32>,
	#[serde(default)]
	pub uci_code: Option<String>,
	#[serde(default)]
	pub sponsors: Vec<Sponsor>,
}

/// A persistent organizational identity spanning one or more eras.
#[derive(Clone, Debug, Deserialize)]
pub struct LineageNode {
	pub id: NodeId,
	pub founding_year: i32,
	#[serde(default)]
	pub dissolution_year: Option<i32>,
	/// Chronological; insertion order is time order.
	#[serde(default)]
	pub eras: Vec<Era>,
}

impl LineageNode {
	/// Rounded mean of the eras' tiers, or [`DEFAULT_TIER`] without tier data.
	pub fn tier(&self) -> u32 {
		let tiers: Vec<u32> = self.eras.iter().filter_map(|era| era.tier).collect();
		if tiers.is_empty() {
			return DEFAULT_TIER;
		}
		let sum: u32 = tiers.iter().sum();
		(f64::from(sum) / tiers.len() as f64).round() as u32
	}

	/// Most recent era, used for labels and jersey colors.
	pub fn latest_era(&self) -> Option<&Era> {
		self.eras.last()
	}

	pub fn display_name(&self) -> &str {
		self.latest_era()
			.map(|era| era.name.as_str())
			.unwrap_or_else(|| self.id.as_str())
	}

	/// Every year this node mentions: founding, dissolution, and era years.
	pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
		std::iter::once(self.founding_year)
			.chain(self.dissolution_year)
			.chain(self.eras.iter().map(|era| era.year))
	}

	fn dissolved_by(&self, year: Option<i32>) -> bool {
		match (self.dissolution_year, year) {
			(Some(dissolved), Some(year)) => dissolved <= year,
			(Some(_), None) => true,
			(None, _) => false,
		}
	}
}

/// Kind of historical transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
	/// Same legal entity under a new registration.
	LegalTransfer,
	/// Successor claiming the heritage without a legal transfer.
	SpiritualSuccession,
	/// Two or more teams combined.
	Merge,
	/// One team divided.
	Split,
}

/// A directed, dated transition between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct LineageLink {
	pub source: NodeId,
	pub target: NodeId,
	#[serde(rename = "type")]
	pub link_type: LinkType,
	pub year: i32,
	#[serde(default)]
	pub notes: Option<String>,
}

/// Raw graph payload. Missing arrays are kept as `None` so validation can
/// report them instead of silently treating them as empty.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Node records; `None` when the array is missing.
	#[serde(default)]
	pub nodes: Option<Vec<LineageNode>>,
	/// Link records; `None` when the array is missing.
	#[serde(default)]
	pub links: Option<Vec<LineageLink>>,
}

impl GraphData {
	/// Parse a JSON payload without validating it.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Reject malformed payloads and deduplicate nodes by id (first wins).
	pub fn validate(self) -> Result<LineageGraph> {
		let nodes = self.nodes.ok_or(Error::MissingField { field: "nodes" })?;
		let links = self.links.ok_or(Error::MissingField { field: "links" })?;

		let mut seen = HashSet::with_capacity(nodes.len());
		let mut unique = Vec::with_capacity(nodes.len());
		let mut duplicate_nodes = 0;
		for node in nodes {
			if node.eras.is_empty() {
				return Err(Error::EmptyEras { node_id: node.id });
			}
			if seen.insert(node.id.clone()) {
				unique.push(node);
			} else {
				duplicate_nodes += 1;
			}
		}
		if duplicate_nodes > 0 {
			warn!("lineage-river: dropped {duplicate_nodes} duplicate node records");
		}

		Ok(LineageGraph {
			nodes: unique,
			links,
			duplicate_nodes,
		})
	}
}

/// User-facing narrowing of the graph: year window, tier set, dissolved teams.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphFilter {
	/// Keep only eras and links inside this window.
	pub years: Option<YearRange>,
	/// Keep only eras in these tiers.
	pub tiers: Option<Vec<u32>>,
	/// Keep teams that have dissolved.
	pub include_dissolved: bool,
}

impl Default for GraphFilter {
	fn default() -> Self {
		Self {
			years: None,
			tiers: None,
			include_dissolved: true,
		}
	}
}

/// A validated graph: unique node ids, every node has at least one era.
#[derive(Clone, Debug, Default)]
pub struct LineageGraph {
	nodes: Vec<LineageNode>,
	links: Vec<LineageLink>,
	duplicate_nodes: usize,
}

impl LineageGraph {
	/// Unique nodes, first record wins.
	pub fn nodes(&self) -> &[LineageNode] {
		&self.nodes
	}

	/// Links as given, including dangling ones.
	pub fn links(&self) -> &[LineageLink] {
		&self.links
	}

	/// Records dropped during deduplication.
	pub fn duplicate_nodes(&self) -> usize {
		self.duplicate_nodes
	}

	/// Node with `id`, if any.
	pub fn node(&self, id: &NodeId) -> Option<&LineageNode> {
		self.nodes.iter().find(|node| &node.id == id)
	}

	/// Apply a [`GraphFilter`]. Nodes left without eras are dropped, so the
	/// result is still a valid layout input.
	pub fn filtered(&self, filter: &GraphFilter) -> LineageGraph {
		let in_years = |year: i32| filter.years.is_none_or(|range| range.contains(year));
		let in_tiers = |tier: Option<u32>| match &filter.tiers {
			Some(tiers) => tier.is_some_and(|tier| tiers.contains(&tier)),
			None => true,
		};
		let window_end = filter.years.map(|range| range.max);

		let nodes = self
			.nodes
			.iter()
			.filter(|node| filter.include_dissolved || !node.dissolved_by(window_end))
			.filter_map(|node| {
				let eras: Vec<Era> = node
					.eras
					.iter()
					.filter(|era| in_years(era.year) && in_tiers(era.tier))
					.cloned()
					.collect();
				(!eras.is_empty()).then(|| LineageNode {
					eras,
					..node.clone()
				})
			})
			.collect();
		let links = self
			.links
			.iter()
			.filter(|link| in_years(link.year))
			.cloned()
			.collect();

		LineageGraph {
			nodes,
			links,
			duplicate_nodes: self.duplicate_nodes,
		}
	}
}
