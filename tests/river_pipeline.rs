//! End-to-end checks from a JSON payload through layout, culling, and
//! navigation, using a small real-world style fixture.

// Test crate links every lib dep, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::rc::Rc;

use lineage_river::components::river::{
	Error, GraphData, GraphFilter, InteractionSession, LayoutCalculator, LineageGraph, NodeId,
	Point, PulseTarget, RenderDetail, RiverConfig, Theme, Viewport, YearRange, find_path_indices,
};

const PELOTON: &str = include_str!("fixtures/peloton.json");

fn graph() -> LineageGraph {
	GraphData::from_json(PELOTON)
		.expect("fixture parses")
		.validate()
		.expect("fixture is valid")
}

fn calculator() -> LayoutCalculator {
	LayoutCalculator::new(RiverConfig::default().layout, 2024)
}

#[test]
fn duplicates_and_dangling_links_are_dropped_and_counted() {
	let graph = graph();
	assert_eq!(graph.nodes().len(), 8);
	assert_eq!(graph.duplicate_nodes(), 1);
	let gitane = graph.node(&NodeId::from("gitane")).unwrap();
	assert_eq!(gitane.display_name(), "Renault-Gitane");

	let layout = calculator()
		.calculate(&graph, Viewport::new(1200.0, 800.0), None)
		.unwrap();
	assert_eq!(layout.year_range, YearRange::new(1958, 2024));
	assert_eq!(layout.links.len(), 8);
	assert_eq!(layout.diagnostics.dropped_links, 1);
	assert_eq!(layout.diagnostics.duplicate_nodes, 1);
	assert_eq!(layout.diagnostics.tier_count, 3);
}

#[test]
fn overlapping_lifetimes_share_rows_only_when_disjoint() {
	let layout = calculator()
		.calculate(&graph(), Viewport::new(1200.0, 800.0), None)
		.unwrap();
	let row = |id: &str| layout.node(&NodeId::from(id)).unwrap().row;
	assert_eq!(row("molteni"), 0);
	assert_eq!(row("gitane"), 1);
	assert_eq!(row("la-vie-claire"), 0);
	assert_eq!(row("systeme-u"), 1);
	assert_eq!(row("castorama"), 0);

	// gitane → systeme-u stays in row 1 of tier 1: a marker, not a curve.
	assert!(layout.links[0].is_same_lane());
	assert!(layout.markers.iter().any(|marker| marker.link == 0));
	assert!(!layout.links[1].is_same_lane());
}

#[test]
fn shortest_path_prefers_fewer_hops() {
	let layout = calculator()
		.calculate(&graph(), Viewport::new(1200.0, 800.0), None)
		.unwrap();
	let path = find_path_indices(&"gitane".into(), &"castorama".into(), &layout.links).unwrap();
	assert_eq!(path, vec![0, 1]);

	let long = find_path_indices(&"molteni".into(), &"continental".into(), &layout.links).unwrap();
	assert_eq!(long.len(), 4);
	assert_eq!(
		find_path_indices(&"continental".into(), &"molteni".into(), &layout.links),
		None
	);
}

#[test]
fn filter_narrows_years_and_tiers() {
	let filter = GraphFilter {
		years: Some(YearRange::new(1980, 1990)),
		tiers: Some(vec![1]),
		include_dissolved: true,
	};
	let filtered = graph().filtered(&filter);
	let mut ids: Vec<&str> = filtered.nodes().iter().map(|node| node.id.as_str()).collect();
	ids.sort_unstable();
	assert_eq!(ids, vec!["castorama", "la-vie-claire", "systeme-u"]);

	let layout = calculator()
		.calculate(&filtered, Viewport::new(1200.0, 800.0), filter.years)
		.unwrap();
	assert_eq!(layout.year_range, YearRange::new(1980, 1990));
	assert_eq!(layout.links.len(), 1);
	assert_eq!(layout.links[0].source.as_str(), "systeme-u");
}

#[test]
fn filter_matching_nothing_is_an_empty_river() {
	let filter = GraphFilter {
		tiers: Some(vec![7]),
		..GraphFilter::default()
	};
	let viewport = Viewport::new(800.0, 600.0);
	let layout = calculator()
		.calculate_filtered(&graph(), &filter, viewport)
		.unwrap();
	assert!(layout.nodes.is_empty());
	assert!(layout.links.is_empty());
	assert_eq!(layout.year_range, YearRange::new(1958, 2024));

	let session = InteractionSession::new(Rc::new(layout), viewport, RiverConfig::default());
	assert_eq!(session.visible_nodes().count(), 0);
	assert!(session.bounds().min_scale > 0.0);
	let scene = session.scene(&Theme::default());
	assert!(scene.nodes.is_empty());
	assert!(scene.links.is_empty());
}

#[test]
fn malformed_payloads_fail_before_layout() {
	let missing_links = GraphData::from_json(r#"{ "nodes": [] }"#).unwrap().validate();
	assert!(matches!(missing_links, Err(Error::MissingField { field: "links" })));

	let no_eras = GraphData::from_json(
		r#"{ "nodes": [{ "id": "x", "founding_year": 2000, "eras": [] }], "links": [] }"#,
	)
	.unwrap()
	.validate();
	assert!(matches!(no_eras, Err(Error::EmptyEras { .. })));

	assert!(matches!(GraphData::from_json("{ nodes"), Err(Error::Parse(_))));
}

#[test]
fn session_drives_culling_detail_and_path_pulses() {
	let viewport = Viewport::new(1200.0, 800.0);
	let layout = calculator().calculate(&graph(), viewport, None).unwrap();
	let mut session = InteractionSession::new(Rc::new(layout), viewport, RiverConfig::default());
	assert_eq!(session.visible_nodes().count(), 8);

	let scene = session.scene(&Theme::default());
	assert_eq!(scene.detail, RenderDetail::High);
	assert_eq!(scene.nodes.len(), 8);
	assert_eq!(
		scene.links.len() + scene.markers.len(),
		8,
		"every link is drawn once, as a curve or a marker"
	);

	assert_eq!(
		session.highlight_path(&"gitane".into(), &"castorama".into(), 0.0),
		Some(2)
	);
	session.tick(0.0);
	assert!(session.pulses().is_active(PulseTarget::Link(0)));

	// Zoom far into the top-left corner; after the debounce most bars are culled.
	for step in 0..30 {
		session.zoom_at(1.1, Point::new(0.0, 0.0), f64::from(step));
	}
	session.tick(50.0);
	assert_eq!(session.visible_nodes().count(), 8);
	session.tick(200.0);
	assert!(session.visible_nodes().count() < 8);
}
