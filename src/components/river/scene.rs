//! Declarative description of one frame.
//!
//! A [`Scene`] is built from a layout, its visible subset, and the pulse
//! state. The canvas binding paints it; comparing two scenes tells the
//! binding whether anything needs repainting at all. Draw order is fixed:
//! grid, links, nodes, markers.

use super::geometry::{CubicPath, Point, Rect};
use super::layout::{Layout, PositionedNode};
use super::navigation::PulseTarget;
use super::renderer::RenderDetail;
use super::session::PulseState;
use super::theme::{Color, Theme};
use super::types::{LinkType, Sponsor};
use super::viewport::VisibleSubset;

const GRID_STEP_YEARS: i32 = 10;

/// Vertical year grid line.
#[derive(Clone, Debug, PartialEq)]
pub struct YearTick {
	pub year: i32,
	pub x: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkShape {
	/// Index into the layout's links.
	pub link: usize,
	pub path: CubicPath,
	pub color: Color,
	pub dashed: bool,
	pub pulse: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeFill {
	Solid(Color),
	/// Horizontal bands top to bottom, with shares summing to 1.
	Stripes(Vec<(Color, f64)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	/// Index into the layout's nodes.
	pub node: usize,
	pub rect: Rect,
	pub fill: NodeFill,
	pub label: Option<String>,
	pub label_color: Color,
	pub pulse: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerShape {
	pub link: usize,
	pub at: Point,
	pub link_type: LinkType,
	pub color: Color,
	pub pulse: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub detail: RenderDetail,
	pub year_ticks: Vec<YearTick>,
	/// World-space vertical extent of the grid lines.
	pub grid_span: Option<(f64, f64)>,
	pub links: Vec<LinkShape>,
	pub nodes: Vec<NodeShape>,
	pub markers: Vec<MarkerShape>,
}

impl Scene {
	pub fn build(
		layout: &Layout,
		visible: &VisibleSubset,
		pulses: &PulseState,
		detail: RenderDetail,
		theme: &Theme,
	) -> Self {
		let year_ticks = layout
			.x_scale
			.ticks(GRID_STEP_YEARS)
			.into_iter()
			.map(|(year, x)| YearTick { year, x })
			.collect();
		let grid_span = layout
			.content_bounds()
			.map(|bounds| (bounds.y, bounds.bottom()));

		let links = visible
			.links
			.iter()
			.filter_map(|&index| {
				let link = &layout.links[index];
				Some(LinkShape {
					link: index,
					path: link.path?,
					color: theme.link.color(link.link_type),
					dashed: link.link_type == LinkType::SpiritualSuccession,
					pulse: pulses.intensity(PulseTarget::Link(index)),
				})
			})
			.collect();

		let nodes = visible
			.nodes
			.iter()
			.map(|&index| {
				let positioned = &layout.nodes[index];
				let base = representative_color(positioned, theme);
				let label_color = if base.luminance() > 0.6 {
					theme.node.label_dark
				} else {
					theme.node.label_light
				};
				let (fill, label) = match detail {
					RenderDetail::Low => (NodeFill::Solid(base), None),
					RenderDetail::High => (
						sponsor_fill(positioned, theme).unwrap_or(NodeFill::Solid(base)),
						Some(positioned.node.display_name().to_owned()),
					),
				};
				NodeShape {
					node: index,
					rect: positioned.rect(),
					fill,
					label,
					label_color,
					pulse: pulses.intensity(PulseTarget::Node(index)),
				}
			})
			.collect();

		let markers = visible
			.markers
			.iter()
			.map(|&index| {
				let marker = &layout.markers[index];
				MarkerShape {
					link: marker.link,
					at: marker.at,
					link_type: marker.link_type,
					color: theme.link.color(marker.link_type).with_alpha(1.0),
					pulse: pulses.intensity(PulseTarget::Link(marker.link)),
				}
			})
			.collect();

		Self {
			detail,
			year_ticks,
			grid_span,
			links,
			nodes,
			markers,
		}
	}
}

/// Sponsors of the latest era that carry a valid color, most prominent
/// first. Ties keep jersey order.
fn ranked_sponsors(node: &PositionedNode) -> Vec<(&Sponsor, Color)> {
	let mut sponsors: Vec<(&Sponsor, Color)> = node
		.node
		.latest_era()
		.map(|era| era.sponsors.as_slice())
		.unwrap_or_default()
		.iter()
		.filter_map(|sponsor| Some((sponsor, Color::from_hex(&sponsor.color)?)))
		.collect();
	sponsors.sort_by(|(a, _), (b, _)| b.share().total_cmp(&a.share()));
	sponsors
}

/// Most prominent sponsor color, falling back to the tier palette.
pub fn representative_color(node: &PositionedNode, theme: &Theme) -> Color {
	ranked_sponsors(node)
		.first()
		.map(|&(_, color)| color)
		.unwrap_or_else(|| theme.palette.for_tier(node.tier))
}

/// Jersey stripes for high detail; `None` when fewer than two sponsors have
/// usable colors.
fn sponsor_fill(node: &PositionedNode, theme: &Theme) -> Option<NodeFill> {
	let ranked = ranked_sponsors(node);
	if ranked.len() < 2 {
		return None;
	}
	let shown = &ranked[..ranked.len().min(theme.node.max_stripes.max(2))];
	let total: f64 = shown.iter().map(|(sponsor, _)| sponsor.share()).sum();
	let stripes = shown
		.iter()
		.map(|&(sponsor, color)| {
			let share = if total > 0.0 {
				sponsor.share() / total
			} else {
				1.0 / shown.len() as f64
			};
			(color, share)
		})
		.collect();
	Some(NodeFill::Stripes(stripes))
}
