//! Shortest-path search over lineage links and camera moves onto nodes.

use std::collections::{HashMap, HashSet, VecDeque};

use super::geometry::{Point, Rect, Viewport};
use super::layout::PositionedLink;
use super::types::{LineageLink, NodeId};
use super::viewport::ViewTransform;

/// Anything with a directed source → target pair.
pub trait Edge {
	/// Node the edge leaves.
	fn source(&self) -> &NodeId;
	/// Node the edge enters.
	fn target(&self) -> &NodeId;
}

impl Edge for LineageLink {
	fn source(&self) -> &NodeId {
		&self.source
	}

	fn target(&self) -> &NodeId {
		&self.target
	}
}

impl Edge for PositionedLink {
	fn source(&self) -> &NodeId {
		&self.source
	}

	fn target(&self) -> &NodeId {
		&self.target
	}
}

/// Breadth-first search following links in their stored direction.
///
/// Returns the indices of the links on a fewest-hops path, `Some(vec![])`
/// when `source == target`, and `None` when `target` is unreachable.
pub fn find_path_indices<E: Edge>(source: &NodeId, target: &NodeId, links: &[E]) -> Option<Vec<usize>> {
	if source == target {
		return Some(Vec::new());
	}

	let mut outgoing: HashMap<&NodeId, Vec<usize>> = HashMap::new();
	for (index, link) in links.iter().enumerate() {
		outgoing.entry(link.source()).or_default().push(index);
	}

	let mut visited: HashSet<&NodeId> = HashSet::from([source]);
	let mut arrived_by: HashMap<&NodeId, usize> = HashMap::new();
	let mut queue = VecDeque::from([source]);

	while let Some(node) = queue.pop_front() {
		for &index in outgoing.get(node).into_iter().flatten() {
			let next = links[index].target();
			if !visited.insert(next) {
				continue;
			}
			arrived_by.insert(next, index);
			if next == target {
				let mut path = vec![index];
				let mut cursor = links[index].source();
				while let Some(&step) = arrived_by.get(cursor) {
					path.push(step);
					cursor = links[step].source();
				}
				path.reverse();
				return Some(path);
			}
			queue.push_back(next);
		}
	}
	None
}

/// [`find_path_indices`] returning the links themselves.
pub fn find_path<'a, E: Edge>(source: &NodeId, target: &NodeId, links: &'a [E]) -> Option<Vec<&'a E>> {
	find_path_indices(source, target, links)
		.map(|path| path.into_iter().map(|index| &links[index]).collect())
}

/// Transform that centers `rect` in the viewport at scale `k`.
pub fn focus_transform(rect: Rect, viewport: Viewport, k: f64) -> ViewTransform {
	let center = rect.center();
	ViewTransform::new(
		viewport.width / 2.0 - center.x * k,
		viewport.height / 2.0 - center.y * k,
		k,
	)
}

fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Animated move between two transforms.
///
/// The world point at the viewport center travels in a straight line while
/// the scale changes geometrically, so zooming feels uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformTransition {
	from: ViewTransform,
	to: ViewTransform,
	viewport: Viewport,
	started_at: f64,
	duration_ms: f64,
}

impl TransformTransition {
	pub fn new(
		from: ViewTransform,
		to: ViewTransform,
		viewport: Viewport,
		started_at: f64,
		duration_ms: f64,
	) -> Self {
		Self {
			from,
			to,
			viewport,
			started_at,
			duration_ms,
		}
	}

	pub fn is_finished(&self, now: f64) -> bool {
		now >= self.started_at + self.duration_ms
	}

	/// Transform at time `now`; exactly the target once finished.
	pub fn sample(&self, now: f64) -> ViewTransform {
		if self.duration_ms <= 0.0 || self.is_finished(now) {
			return self.to;
		}
		let t = ease_cubic_in_out((now - self.started_at) / self.duration_ms);
		let screen_center = Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
		let center = self
			.from
			.invert(screen_center)
			.lerp(self.to.invert(screen_center), t);
		let k = self.from.k * (self.to.k / self.from.k).powf(t);
		ViewTransform::new(screen_center.x - center.x * k, screen_center.y - center.y * k, k)
	}
}

/// Element of a layout that can pulse, by index into the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulseTarget {
	/// Node, by index into the layout nodes.
	Node(usize),
	/// Link, by index into the layout links.
	Link(usize),
}

/// Timeline action toggling a pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseAction {
	Start(PulseTarget),
	Stop(PulseTarget),
}

/// Pulse one node now and release it after `window_ms`.
pub fn node_pulse_steps(node: usize, window_ms: f64) -> Vec<(f64, PulseAction)> {
	let target = PulseTarget::Node(node);
	vec![
		(0.0, PulseAction::Start(target)),
		(window_ms, PulseAction::Stop(target)),
	]
}

/// Pulse each link of `path` in order, `stagger_ms` apart, each for
/// `pulse_ms`.
pub fn path_pulse_steps(path: &[usize], stagger_ms: f64, pulse_ms: f64) -> Vec<(f64, PulseAction)> {
	path.iter()
		.enumerate()
		.flat_map(|(step, &link)| {
			let start = step as f64 * stagger_ms;
			let target = PulseTarget::Link(link);
			[
				(start, PulseAction::Start(target)),
				(start + pulse_ms, PulseAction::Stop(target)),
			]
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::river::types::LinkType;

	fn link(source: &str, target: &str) -> LineageLink {
		LineageLink {
			source: source.into(),
			target: target.into(),
			link_type: LinkType::LegalTransfer,
			year: 2000,
			notes: None,
		}
	}

	fn diamond() -> Vec<LineageLink> {
		vec![
			link("1", "2"),
			link("2", "4"),
			link("1", "3"),
			link("3", "5"),
			link("5", "4"),
		]
	}

	#[test]
	fn picks_fewest_hops() {
		let links = diamond();
		let path = find_path(&"1".into(), &"4".into(), &links).unwrap();
		let hops: Vec<(&str, &str)> = path
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str()))
			.collect();
		assert_eq!(hops, vec![("1", "2"), ("2", "4")]);
	}

	#[test]
	fn same_node_is_empty_path() {
		assert_eq!(find_path_indices(&"3".into(), &"3".into(), &diamond()), Some(vec![]));
	}

	#[test]
	fn direction_is_respected() {
		assert_eq!(find_path_indices(&"4".into(), &"1".into(), &diamond()), None);
		assert_eq!(find_path_indices(&"1".into(), &"missing".into(), &diamond()), None);
	}

	#[test]
	fn terminates_on_cycles() {
		let links = vec![link("a", "b"), link("b", "c"), link("c", "a"), link("c", "d")];
		assert_eq!(find_path_indices(&"a".into(), &"d".into(), &links), Some(vec![0, 1, 3]));
		assert_eq!(find_path_indices(&"a".into(), &"z".into(), &links), None);
	}

	#[test]
	fn focus_centers_node() {
		let viewport = Viewport::new(800.0, 600.0);
		let rect = Rect::new(100.0, 200.0, 50.0, 20.0);
		let t = focus_transform(rect, viewport, 2.0);
		let center = t.apply(rect.center());
		assert_eq!(center, Point::new(400.0, 300.0));
		assert_eq!(t.k, 2.0);
	}

	#[test]
	fn transition_hits_both_ends() {
		let viewport = Viewport::new(800.0, 600.0);
		let from = ViewTransform::IDENTITY;
		let to = ViewTransform::new(-300.0, -100.0, 2.0);
		let transition = TransformTransition::new(from, to, viewport, 1_000.0, 500.0);
		let start = transition.sample(1_000.0);
		assert!((start.x - from.x).abs() < 1e-9 && (start.k - from.k).abs() < 1e-9);
		let mid = transition.sample(1_250.0);
		assert!(mid.k > 1.0 && mid.k < 2.0);
		assert_eq!(transition.sample(1_500.0), to);
		assert!(transition.is_finished(1_500.0));
	}

	#[test]
	fn path_pulses_are_staggered() {
		let steps = path_pulse_steps(&[4, 7], 200.0, 600.0);
		assert_eq!(
			steps,
			vec![
				(0.0, PulseAction::Start(PulseTarget::Link(4))),
				(600.0, PulseAction::Stop(PulseTarget::Link(4))),
				(200.0, PulseAction::Start(PulseTarget::Link(7))),
				(800.0, PulseAction::Stop(PulseTarget::Link(7))),
			]
		);
	}
}
