//! Year-based river layout.
//!
//! Nodes become horizontal bars: X comes from the founding year, width from
//! the lifetime on the same [`YearScale`], Y from the tier band and a row
//! inside it. Rows are packed greedily left to right so that bars sharing a
//! row never overlap. Links become S-curves between bar ends, except when
//! both ends share a row (a "swimlane"), which yields a marker instead.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use super::config::LayoutConfig;
use super::error::{Error, Result};
use super::geometry::{CubicPath, Point, Rect, Viewport, YearRange, YearScale};
use super::types::{GraphFilter, LineageGraph, LineageNode, LinkType, NodeId};

/// A node placed in world-space.
#[derive(Clone, Debug)]
pub struct PositionedNode {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub tier: u32,
	/// Row inside the tier band, 0 at the top.
	pub row: usize,
	/// Domain record this bar was derived from.
	pub node: LineageNode,
}

impl PositionedNode {
	pub fn rect(&self) -> Rect {
		Rect::new(self.x, self.y, self.width, self.height)
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn mid_y(&self) -> f64 {
		self.y + self.height / 2.0
	}

	/// Same tier and row.
	pub fn shares_lane_with(&self, other: &PositionedNode) -> bool {
		self.tier == other.tier && self.row == other.row
	}
}

/// A link with resolved endpoints.
#[derive(Clone, Debug)]
pub struct PositionedLink {
	pub source: NodeId,
	pub target: NodeId,
	/// Indices into [`Layout::nodes`].
	pub source_index: usize,
	pub target_index: usize,
	pub link_type: LinkType,
	pub year: i32,
	pub source_point: Point,
	pub target_point: Point,
	/// `None` when both ends share a swimlane; see [`Layout::markers`].
	pub path: Option<CubicPath>,
}

impl PositionedLink {
	pub fn is_same_lane(&self) -> bool {
		self.path.is_none()
	}
}

/// Marker drawn in place of a curve for a same-swimlane transition.
#[derive(Clone, Debug)]
pub struct LaneMarker {
	/// Index into [`Layout::links`].
	pub link: usize,
	pub at: Point,
	pub link_type: LinkType,
}

/// Counts describing one layout pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutDiagnostics {
	pub node_count: usize,
	pub link_count: usize,
	/// Links naming a node that is not in the graph.
	pub dropped_links: usize,
	/// Node records removed during deduplication.
	pub duplicate_nodes: usize,
	pub tier_count: usize,
	pub row_count: usize,
	/// Horizontal stretch applied to the year scale (1.0 = none).
	pub stretch: f64,
}

/// Output of one layout computation. Never mutated after construction.
#[derive(Clone, Debug)]
pub struct Layout {
	/// Positioned nodes, in graph order.
	pub nodes: Vec<PositionedNode>,
	/// Links whose endpoints both survived, in graph order.
	pub links: Vec<PositionedLink>,
	/// Markers for same-lane links.
	pub markers: Vec<LaneMarker>,
	/// Years covered by the x axis.
	pub year_range: YearRange,
	/// Year to x mapping.
	pub x_scale: YearScale,
	/// Counts gathered while laying out.
	pub diagnostics: LayoutDiagnostics,
	index_by_id: HashMap<NodeId, usize>,
}

impl Layout {
	/// Position of `id` in [`Layout::nodes`].
	pub fn node_index(&self, id: &NodeId) -> Option<usize> {
		self.index_by_id.get(id).copied()
	}

	/// Positioned node with `id`, if it was laid out.
	pub fn node(&self, id: &NodeId) -> Option<&PositionedNode> {
		self.node_index(id).map(|index| &self.nodes[index])
	}

	/// Union of all node rectangles.
	pub fn content_bounds(&self) -> Option<Rect> {
		self.nodes
			.iter()
			.map(PositionedNode::rect)
			.reduce(|acc, rect| acc.union(&rect))
	}

	/// Topmost-drawn node under a world-space point.
	pub fn node_at(&self, point: Point) -> Option<&PositionedNode> {
		self.nodes.iter().rev().find(|node| node.rect().contains(point))
	}
}

/// Per-node result of placement before links are resolved.
#[derive(Clone, Copy, Debug)]
struct Placement {
	x: f64,
	width: f64,
	tier: u32,
	row: usize,
	y: f64,
}

struct Packing {
	placements: Vec<Placement>,
	tier_count: usize,
	row_count: usize,
	/// Bottom edge of the lowest row.
	bottom: f64,
}

/// Computes [`Layout`]s from validated graphs.
#[derive(Clone, Debug)]
pub struct LayoutCalculator {
	config: LayoutConfig,
	current_year: i32,
}

impl LayoutCalculator {
	/// `current_year` stands in for the end of still-active nodes when no
	/// explicit year range is given.
	pub fn new(config: LayoutConfig, current_year: i32) -> Self {
		Self {
			config,
			current_year,
		}
	}

	/// Settings this calculator packs rows with.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Apply `filter` to `graph` and lay out what is left.
	///
	/// Without a year window the range comes from the whole graph, so a
	/// filter that matches nothing yields an empty layout on the same axis
	/// instead of an error. Only an empty input graph fails.
	pub fn calculate_filtered(
		&self,
		graph: &LineageGraph,
		filter: &GraphFilter,
		viewport: Viewport,
	) -> Result<Layout> {
		let year_range = match filter.years {
			Some(range) => range,
			None => self.derive_year_range(graph)?,
		};
		let filtered = graph.filtered(filter);
		if filtered.nodes().is_empty() {
			debug!("lineage-river: filter matched no nodes");
		}
		self.calculate(&filtered, viewport, Some(year_range))
	}

	/// Lay out `graph` for a viewport, optionally restricted to `years`.
	pub fn calculate(
		&self,
		graph: &LineageGraph,
		viewport: Viewport,
		years: Option<YearRange>,
	) -> Result<Layout> {
		let year_range = match years {
			Some(range) => range,
			None => self.derive_year_range(graph)?,
		};

		let padding = self.config.padding;
		let mut x_scale = YearScale::new(year_range, padding, viewport.width - padding);
		let mut packing = self.pack(graph, &x_scale, year_range);
		let mut stretch = 1.0;

		if self.config.stretch_to_viewport && viewport.height > 0.0 {
			let content_height = packing.bottom + padding;
			let factor = content_height / viewport.height;
			if factor > 1.0 {
				stretch = factor;
				x_scale = x_scale.stretched(factor);
				packing = self.pack(graph, &x_scale, year_range);
			}
		}

		let nodes: Vec<PositionedNode> = graph
			.nodes()
			.iter()
			.zip(&packing.placements)
			.map(|(node, place)| PositionedNode {
				id: node.id.clone(),
				x: place.x,
				y: place.y,
				width: place.width,
				height: self.config.node_height,
				tier: place.tier,
				row: place.row,
				node: node.clone(),
			})
			.collect();
		let index_by_id: HashMap<NodeId, usize> = nodes
			.iter()
			.enumerate()
			.map(|(index, node)| (node.id.clone(), index))
			.collect();

		let mut links = Vec::with_capacity(graph.links().len());
		let mut markers = Vec::new();
		let mut dropped_links = 0;
		for link in graph.links() {
			let (Some(&source_index), Some(&target_index)) =
				(index_by_id.get(&link.source), index_by_id.get(&link.target))
			else {
				dropped_links += 1;
				continue;
			};
			let (source, target) = (&nodes[source_index], &nodes[target_index]);
			let source_point = Point::new(source.right(), source.mid_y());
			let target_point = Point::new(target.x, target.mid_y());

			let path = if source.shares_lane_with(target) {
				markers.push(LaneMarker {
					link: links.len(),
					at: Point::new(x_scale.year(link.year), target.mid_y()),
					link_type: link.link_type,
				});
				None
			} else {
				Some(CubicPath::s_curve(
					source_point,
					target_point,
					self.config.curve_factor,
				))
			};

			links.push(PositionedLink {
				source: link.source.clone(),
				target: link.target.clone(),
				source_index,
				target_index,
				link_type: link.link_type,
				year: link.year,
				source_point,
				target_point,
				path,
			});
		}
		if dropped_links > 0 {
			warn!("lineage-river: dropped {dropped_links} links with unknown endpoints");
		}

		let diagnostics = LayoutDiagnostics {
			node_count: nodes.len(),
			link_count: links.len(),
			dropped_links,
			duplicate_nodes: graph.duplicate_nodes(),
			tier_count: packing.tier_count,
			row_count: packing.row_count,
			stretch,
		};
		debug!(
			"lineage-river: layout {}-{}: {} nodes in {} tiers / {} rows, {} links",
			year_range.min,
			year_range.max,
			diagnostics.node_count,
			diagnostics.tier_count,
			diagnostics.row_count,
			diagnostics.link_count
		);

		Ok(Layout {
			nodes,
			links,
			markers,
			year_range,
			x_scale,
			diagnostics,
			index_by_id,
		})
	}

	/// Union of every year the graph mentions plus the current year, clamped
	/// to the configured floor and ceiling.
	fn derive_year_range(&self, graph: &LineageGraph) -> Result<YearRange> {
		if graph.nodes().is_empty() {
			return Err(Error::EmptyGraph);
		}
		let (min, max) = graph
			.nodes()
			.iter()
			.flat_map(LineageNode::years)
			.fold((self.current_year, self.current_year), |(lo, hi), year| {
				(lo.min(year), hi.max(year))
			});
		Ok(YearRange::new(min, max).clamped(self.config.year_floor, self.config.year_ceiling))
	}

	fn pack(&self, graph: &LineageGraph, x_scale: &YearScale, year_range: YearRange) -> Packing {
		let min_width = self.config.min_node_width.max(1.0);
		let mut placements: Vec<Placement> = graph
			.nodes()
			.iter()
			.map(|node| {
				let x = x_scale.year(node.founding_year);
				let end = node.dissolution_year.unwrap_or(year_range.max);
				Placement {
					x,
					width: (x_scale.year(end) - x).max(min_width),
					tier: node.tier(),
					row: 0,
					y: 0.0,
				}
			})
			.collect();

		let mut tiers: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
		for (index, place) in placements.iter().enumerate() {
			tiers.entry(place.tier).or_default().push(index);
		}

		let row_height = self.config.row_height();
		let mut top = self.config.padding;
		let mut bottom = top;
		let mut row_count = 0;
		for members in tiers.values_mut() {
			members.sort_by(|&a, &b| placements[a].x.total_cmp(&placements[b].x));
			let spans: Vec<(f64, f64)> = members
				.iter()
				.map(|&index| (placements[index].x, placements[index].x + placements[index].width))
				.collect();
			let (rows, used) = pack_rows(&spans);
			for (&index, row) in members.iter().zip(rows) {
				placements[index].row = row;
				placements[index].y = top + row as f64 * row_height;
			}
			bottom = top + used as f64 * row_height - self.config.row_gap;
			top += used as f64 * row_height + self.config.tier_gap;
			row_count += used;
		}

		Packing {
			placements,
			tier_count: tiers.len(),
			row_count,
			bottom,
		}
	}
}

/// Greedy first-fit interval packing.
///
/// `spans` must be sorted by start. Each span goes to the lowest row whose
/// last span ends at or before its start. Returns the row of every span and
/// the number of rows used.
fn pack_rows(spans: &[(f64, f64)]) -> (Vec<usize>, usize) {
	let mut row_ends: Vec<f64> = Vec::new();
	let rows = spans
		.iter()
		.map(|&(start, end)| match row_ends.iter().position(|&row_end| start >= row_end) {
			Some(row) => {
				row_ends[row] = end;
				row
			}
			None => {
				row_ends.push(end);
				row_ends.len() - 1
			}
		})
		.collect();
	(rows, row_ends.len())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::river::types::GraphData;

	fn graph(json: &str) -> LineageGraph {
		GraphData::from_json(json).unwrap().validate().unwrap()
	}

	fn calculator() -> LayoutCalculator {
		LayoutCalculator::new(LayoutConfig::default(), 2024)
	}

	const OVERLAPPING: &str = r#"{
		"nodes": [
			{ "id": "a", "founding_year": 1990, "dissolution_year": 2000, "eras": [{ "year": 1990, "name": "A", "tier": 1 }] },
			{ "id": "b", "founding_year": 1995, "dissolution_year": 2005, "eras": [{ "year": 1995, "name": "B", "tier": 1 }] },
			{ "id": "c", "founding_year": 2000, "dissolution_year": 2010, "eras": [{ "year": 2000, "name": "C", "tier": 1 }] },
			{ "id": "d", "founding_year": 1992, "eras": [{ "year": 1992, "name": "D", "tier": 3 }] }
		],
		"links": [
			{ "source": "a", "target": "c", "type": "LEGAL_TRANSFER", "year": 2000 },
			{ "source": "b", "target": "d", "type": "MERGE", "year": 2005 },
			{ "source": "a", "target": "ghost", "type": "SPLIT", "year": 1999 }
		]
	}"#;

	#[test]
	fn pack_rows_is_first_fit() {
		let spans = [(0.0, 10.0), (5.0, 15.0), (10.0, 20.0), (12.0, 14.0)];
		let (rows, used) = pack_rows(&spans);
		assert_eq!(rows, vec![0, 1, 0, 2]);
		assert_eq!(used, 3);
	}

	#[test]
	fn overlapping_nodes_get_separate_rows() {
		let layout = calculator()
			.calculate(&graph(OVERLAPPING), Viewport::new(1200.0, 800.0), None)
			.unwrap();
		let row = |id: &str| layout.node(&NodeId::from(id)).unwrap().row;
		assert_eq!(row("a"), 0);
		assert_eq!(row("b"), 1);
		// c starts where a ends, so it reuses a's row.
		assert_eq!(row("c"), 0);
		assert_eq!(layout.diagnostics.tier_count, 2);
		assert_eq!(layout.diagnostics.row_count, 3);
	}

	#[test]
	fn tiers_are_stacked_top_to_bottom() {
		let layout = calculator()
			.calculate(&graph(OVERLAPPING), Viewport::new(1200.0, 800.0), None)
			.unwrap();
		let a = layout.node(&NodeId::from("a")).unwrap();
		let b = layout.node(&NodeId::from("b")).unwrap();
		let d = layout.node(&NodeId::from("d")).unwrap();
		assert_eq!(a.y, 50.0);
		assert_eq!(b.y, 50.0 + 32.0);
		assert_eq!(d.tier, 3);
		assert_eq!(d.y, 50.0 + 2.0 * 32.0 + 40.0);
	}

	#[test]
	fn same_lane_links_become_markers() {
		let layout = calculator()
			.calculate(&graph(OVERLAPPING), Viewport::new(1200.0, 800.0), None)
			.unwrap();
		assert_eq!(layout.links.len(), 2);
		assert_eq!(layout.diagnostics.dropped_links, 1);

		let a_to_c = &layout.links[0];
		assert!(a_to_c.is_same_lane());
		assert_eq!(layout.markers.len(), 1);
		assert_eq!(layout.markers[0].link, 0);
		assert_eq!(layout.markers[0].at.x, layout.x_scale.year(2000));

		let b_to_d = &layout.links[1];
		let path = b_to_d.path.unwrap();
		assert_eq!(path.start, b_to_d.source_point);
		assert_eq!(path.end, b_to_d.target_point);
		// d starts before b ends: the curve runs leftwards without overshooting.
		assert!(b_to_d.target_point.x < b_to_d.source_point.x);
		assert!(path.bounds().right() <= b_to_d.source_point.x + 1e-9);
		assert!(path.bounds().x >= b_to_d.target_point.x - 1e-9);
	}

	#[test]
	fn width_follows_scale_with_floor() {
		let g = graph(
			r#"{ "nodes": [
				{ "id": "long", "founding_year": 1950, "dissolution_year": 2000, "eras": [{ "year": 1950, "name": "L" }] },
				{ "id": "blip", "founding_year": 1980, "dissolution_year": 1980, "eras": [{ "year": 1980, "name": "B" }] },
				{ "id": "open", "founding_year": 1990, "eras": [{ "year": 1990, "name": "O" }] }
			], "links": [] }"#,
		);
		let layout = calculator()
			.calculate(&g, Viewport::new(1100.0, 600.0), Some(YearRange::new(1950, 2050)))
			.unwrap();
		let long = layout.node(&NodeId::from("long")).unwrap();
		assert!((long.width - (layout.x_scale.year(2000) - layout.x_scale.year(1950))).abs() < 1e-9);
		assert_eq!(layout.node(&NodeId::from("blip")).unwrap().width, 30.0);
		let open = layout.node(&NodeId::from("open")).unwrap();
		assert!((open.right() - layout.x_scale.year(2050)).abs() < 1e-9);
	}

	#[test]
	fn derived_range_includes_current_year_and_is_clamped() {
		let g = graph(
			r#"{ "nodes": [
				{ "id": "old", "founding_year": 1850, "eras": [{ "year": 1850, "name": "Old" }] }
			], "links": [] }"#,
		);
		let layout = calculator().calculate(&g, Viewport::new(800.0, 600.0), None).unwrap();
		assert_eq!(layout.year_range, YearRange::new(1900, 2024));
	}

	#[test]
	fn empty_graph_is_an_error() {
		let g = graph(r#"{ "nodes": [], "links": [] }"#);
		let err = calculator()
			.calculate(&g, Viewport::new(800.0, 600.0), None)
			.unwrap_err();
		assert!(matches!(err, Error::EmptyGraph));
	}

	#[test]
	fn filter_matching_nothing_keeps_the_full_axis() {
		let g = graph(OVERLAPPING);
		let filter = GraphFilter {
			tiers: Some(vec![7]),
			..GraphFilter::default()
		};
		let layout = calculator()
			.calculate_filtered(&g, &filter, Viewport::new(800.0, 600.0))
			.unwrap();
		assert!(layout.nodes.is_empty());
		assert!(layout.links.is_empty());
		assert!(layout.content_bounds().is_none());
		assert_eq!(layout.year_range, YearRange::new(1990, 2024));
	}

	#[test]
	fn filtering_an_empty_graph_is_still_an_error() {
		let g = graph(r#"{ "nodes": [], "links": [] }"#);
		let err = calculator()
			.calculate_filtered(&g, &GraphFilter::default(), Viewport::new(800.0, 600.0))
			.unwrap_err();
		assert!(matches!(err, Error::EmptyGraph));
	}

	#[test]
	fn stretch_fills_wide_viewports() {
		let config = LayoutConfig {
			stretch_to_viewport: true,
			..LayoutConfig::default()
		};
		let nodes: Vec<String> = (0..20)
			.map(|i| {
				format!(
					r#"{{ "id": "n{i}", "founding_year": 1990, "eras": [{{ "year": 1990, "name": "N", "tier": 1 }}] }}"#
				)
			})
			.collect();
		let g = graph(&format!(r#"{{ "nodes": [{}], "links": [] }}"#, nodes.join(",")));
		let layout = LayoutCalculator::new(config, 2024)
			.calculate(&g, Viewport::new(1000.0, 200.0), None)
			.unwrap();
		assert!(layout.diagnostics.stretch > 1.0);
		let (start, end) = layout.x_scale.range();
		assert_eq!(start, 50.0);
		assert!((end - (50.0 + 900.0 * layout.diagnostics.stretch)).abs() < 1e-6);
	}

	#[test]
	fn hit_test_finds_node() {
		let layout = calculator()
			.calculate(&graph(OVERLAPPING), Viewport::new(1200.0, 800.0), None)
			.unwrap();
		let b = layout.node(&NodeId::from("b")).unwrap();
		let hit = layout.node_at(b.rect().center()).unwrap();
		assert_eq!(hit.id, b.id);
		assert!(layout.node_at(Point::new(-500.0, -500.0)).is_none());
	}
}
