//! Leptos component wrapping the river canvas.
//!
//! The component owns one [`InteractionSession`] and a [`RenderQueue`] bound
//! to `requestAnimationFrame`. Mouse and wheel handlers only queue jobs; each
//! animation frame runs the queued jobs, advances the session clock, and
//! repaints when the resulting [`Scene`] differs from the last one painted.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::RiverConfig;
use super::error::{Error, Result};
use super::geometry::{Point, Viewport};
use super::layout::{Layout, LayoutCalculator};
use super::perf::{Pass, PerformanceMonitor};
use super::render;
use super::renderer::{FrameScheduler, RenderQueue};
use super::scale::ScaleConfig;
use super::scene::Scene;
use super::session::InteractionSession;
use super::theme::Theme;
use super::types::{GraphData, GraphFilter, LineageGraph, NodeId};
use super::viewport::ViewTransform;
use super::zoom_level::ZoomLevel;

/// Pointer travel in pixels below which a press and release is a click.
const CLICK_SLOP: f64 = 4.0;

/// Everything one mounted river needs between frames.
struct RiverContext {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	graph: LineageGraph,
	filter: GraphFilter,
	config: RiverConfig,
	session: InteractionSession,
	scale: ScaleConfig,
	theme: Theme,
	perf: PerformanceMonitor,
	selected: Option<NodeId>,
	painted: Option<(ViewTransform, Scene)>,
}

impl RiverContext {
	/// Lay out the current graph and filter again and hand the result to the
	/// session.
	fn relayout(&mut self) -> Result<()> {
		self.report_timings();
		let layout = compute_layout(
			&self.graph,
			&self.filter,
			&self.config,
			self.session.viewport(),
			&mut self.perf,
		)?;
		self.selected = None;
		self.session.set_layout(Rc::new(layout));
		Ok(())
	}

	/// Log paint and tick timings gathered under the outgoing layout, then
	/// start a fresh window for the next one.
	fn report_timings(&mut self) {
		for pass in [Pass::Tick, Pass::Paint] {
			if let Some(stats) = self.perf.stats(pass) {
				debug!(
					"lineage-river: {pass} last {:.2}ms, mean {:.2}ms, max {:.2}ms over {} frames",
					stats.last_ms, stats.mean_ms, stats.max_ms, stats.count
				);
			}
		}
		self.perf.reset();
	}

	fn resize(&mut self, viewport: Viewport) -> Result<()> {
		self.canvas.set_width(viewport.width as u32);
		self.canvas.set_height(viewport.height as u32);
		self.session.resize(viewport);
		self.painted = None;
		self.relayout()
	}

	/// Focus a node. With a previous selection, also pulse the path from it.
	fn select(&mut self, id: NodeId, now: f64) {
		if let Some(previous) = self.selected.replace(id.clone()) {
			if previous != id && self.session.highlight_path(&previous, &id, now).is_none() {
				debug!("lineage-river: no path from {previous} to {id}");
			}
		}
		if !self
			.session
			.focus_on_node(&id, self.config.zoom.focus_duration_ms, now)
		{
			warn!("lineage-river: cannot focus {id}, not in the current layout");
			self.selected = None;
		}
	}

	fn click(&mut self, point: Point, now: f64) {
		match self.session.node_at_screen(point).map(|node| node.id.clone()) {
			Some(id) => self.select(id, now),
			None => {
				self.session.cancel_path_highlight();
				self.selected = None;
			}
		}
	}

	/// Advance the session and repaint if the scene changed. Returns whether
	/// another frame is needed.
	fn paint(&mut self, now: f64) -> bool {
		let session = &mut self.session;
		let update = self.perf.measure(Pass::Tick, performance_now, || session.tick(now));
		let transform = self.session.transform();
		let scene = self.session.scene(&self.theme);
		let unchanged = self
			.painted
			.as_ref()
			.is_some_and(|(painted_transform, painted)| *painted_transform == transform && *painted == scene);

		if !unchanged {
			let viewport = self.session.viewport();
			let (ctx, scale, theme) = (&self.ctx, &self.scale, &self.theme);
			self.perf.measure(Pass::Paint, performance_now, || {
				render::render(&scene, transform, viewport, ctx, scale, theme)
			});
			self.painted = Some((transform, scene));
		}
		update.animating
	}
}

type SharedContext = Rc<RefCell<Option<RiverContext>>>;
type SharedQueue = Rc<RefCell<RenderQueue<AnimationFrames, RiverContext>>>;

/// [`FrameScheduler`] backed by `requestAnimationFrame`.
#[derive(Clone, Default)]
struct AnimationFrames {
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameScheduler for AnimationFrames {
	fn request_frame(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref callback) = *self.callback.borrow() {
			let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
		}
	}
}

fn performance_now() -> f64 {
	web_sys::window()
		.and_then(|window| window.performance())
		.map(|performance| performance.now())
		.unwrap_or(0.0)
}

fn current_year() -> i32 {
	js_sys::Date::new_0().get_full_year() as i32
}

fn window_size(window: &Window) -> Option<Viewport> {
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some(Viewport::new(width, height))
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn compute_layout(
	graph: &LineageGraph,
	filter: &GraphFilter,
	config: &RiverConfig,
	viewport: Viewport,
	perf: &mut PerformanceMonitor,
) -> Result<Layout> {
	let calculator = LayoutCalculator::new(config.layout.clone(), current_year());
	perf.measure(Pass::Layout, performance_now, || {
		calculator.calculate_filtered(graph, filter, viewport)
	})
}

/// Inputs for mounting a river on a canvas.
struct MountRequest {
	canvas: HtmlCanvasElement,
	viewport: Viewport,
	graph: LineageGraph,
	filter: GraphFilter,
	config: RiverConfig,
	on_level_change: Option<Callback<(ZoomLevel, f64)>>,
}

fn mount(request: MountRequest) -> Result<RiverContext> {
	let MountRequest {
		canvas,
		viewport,
		graph,
		filter,
		config,
		on_level_change,
	} = request;

	canvas.set_width(viewport.width as u32);
	canvas.set_height(viewport.height as u32);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|object| object.dyn_into().ok())
		.ok_or(Error::CanvasUnavailable)?;

	let mut perf = PerformanceMonitor::default();
	let layout = compute_layout(&graph, &filter, &config, viewport, &mut perf)?;
	let mut session = InteractionSession::new(Rc::new(layout), viewport, config.clone());
	session.on_level_change(move |level, k| {
		if let Some(callback) = on_level_change {
			callback.run((level, k));
		}
	});

	Ok(RiverContext {
		canvas,
		ctx,
		graph,
		filter,
		config,
		session,
		scale: ScaleConfig::default(),
		theme: Theme::default(),
		perf,
		selected: None,
		painted: None,
	})
}

/// Load new data or a new filter into the existing river, or mount it.
fn load(slot: &mut Option<RiverContext>, request: MountRequest) -> Result<()> {
	match slot {
		Some(context) => {
			context.graph = request.graph;
			context.filter = request.filter;
			context.relayout()
		}
		None => {
			*slot = Some(mount(request)?);
			Ok(())
		}
	}
}

/// Renders an interactive lineage river on a canvas element.
///
/// Pass graph data via the reactive `data` signal and an optional reactive
/// `filter`. Invalid data shows an error message instead of the canvas
/// contents. The component sizes itself to its parent container by default;
/// set `fullscreen = true` to fill the window and follow its resizes.
/// Explicit `width`/`height` override automatic sizing.
///
/// Scroll zooms, dragging pans, clicking a bar focuses it (and pulses the
/// path from the previously clicked bar), double-click resets the zoom.
/// Setting `focus` focuses a node programmatically, e.g. from a search box.
#[component]
pub fn RiverCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, optional)] filter: MaybeProp<GraphFilter>,
	#[prop(into, optional)] focus: MaybeProp<NodeId>,
	#[prop(optional)] config: Option<RiverConfig>,
	#[prop(into, optional)] on_level_change: Option<Callback<(ZoomLevel, f64)>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = config.unwrap_or_default();
	let (error, set_error) = signal(None::<String>);

	let context: SharedContext = Rc::new(RefCell::new(None));
	let frames = AnimationFrames::default();
	let queue: SharedQueue = Rc::new(RefCell::new(RenderQueue::new(frames.clone())));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let pointer_down = Rc::new(Cell::new(false));

	let (context_frame, queue_frame) = (context.clone(), queue.clone());
	*frames.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
		let batch = queue_frame.borrow_mut().begin_frame();
		let animating = match context_frame.borrow_mut().as_mut() {
			Some(c) => {
				batch.run(c);
				c.paint(timestamp)
			}
			None => false,
		};
		if animating {
			queue_frame.borrow_mut().request_frame();
		}
	}));

	let (context_init, queue_init) = (context.clone(), queue.clone());
	Effect::new(move |_| {
		let data = data.get();
		let filter = filter.get().unwrap_or_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let viewport = if fullscreen {
			window_size(&window).unwrap_or(Viewport::new(800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			Viewport::new(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};

		let result = data.validate().and_then(|graph| {
			info!(
				"lineage-river: {} nodes, {} links ({} duplicate ids dropped)",
				graph.nodes().len(),
				graph.links().len(),
				graph.duplicate_nodes()
			);
			let request = MountRequest {
				canvas,
				viewport,
				graph,
				filter,
				config: config.clone(),
				on_level_change,
			};
			load(&mut context_init.borrow_mut(), request)
		});

		match result {
			Ok(()) => {
				set_error.set(None);
				queue_init.borrow_mut().request_frame();
			}
			Err(err) => {
				warn!("lineage-river: {err}");
				if let Some(mut c) = context_init.borrow_mut().take() {
					c.session.teardown();
				}
				queue_init.borrow_mut().clear();
				set_error.set(Some(err.to_string()));
				return;
			}
		}

		if fullscreen && resize_cb.borrow().is_none() {
			let queue_resize = queue_init.clone();
			*resize_cb.borrow_mut() = Some(Closure::new(move || {
				let Some(viewport) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				queue_resize.borrow_mut().queue_render(move |c| {
					if let Err(err) = c.resize(viewport) {
						warn!("lineage-river: relayout after resize failed: {err}");
					}
				});
			}));
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	});

	let queue_focus = queue.clone();
	Effect::new(move |_| {
		let Some(id) = focus.get() else {
			return;
		};
		let now = performance_now();
		queue_focus
			.borrow_mut()
			.queue_render(move |c| c.select(id, now));
	});

	let (queue_md, pointer_md) = (queue.clone(), pointer_down.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		pointer_md.set(true);
		queue_md
			.borrow_mut()
			.queue_render(move |c| c.session.begin_pan(point));
	};

	let (queue_mm, pointer_mm) = (queue.clone(), pointer_down.clone());
	let on_mousemove = move |ev: MouseEvent| {
		if !pointer_mm.get() {
			return;
		}
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let now = performance_now();
		queue_mm.borrow_mut().queue_render(move |c| {
			c.session.drag_pan(point, now);
		});
	};

	let (queue_mu, pointer_mu) = (queue.clone(), pointer_down.clone());
	let on_mouseup = move |ev: MouseEvent| {
		if !pointer_mu.replace(false) {
			return;
		}
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let now = performance_now();
		queue_mu.borrow_mut().queue_render(move |c| {
			if c.session.end_pan() < CLICK_SLOP {
				c.click(point, now);
			}
		});
	};

	let (queue_ml, pointer_ml) = (queue.clone(), pointer_down);
	let on_mouseleave = move |_: MouseEvent| {
		if pointer_ml.replace(false) {
			queue_ml.borrow_mut().queue_render(|c| {
				c.session.end_pan();
			});
		}
	};

	let queue_dbl = queue.clone();
	let on_dblclick = move |_: MouseEvent| {
		let now = performance_now();
		queue_dbl
			.borrow_mut()
			.queue_render(move |c| c.session.reset_zoom(now));
	};

	let queue_wh = queue;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let now = performance_now();
		queue_wh.borrow_mut().queue_render(move |c| {
			c.session.zoom_at(factor, point, now);
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="lineage-river-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		{move || {
			error
				.get()
				.map(|message| {
					view! { <div class="lineage-river-error" role="alert">{message}</div> }
				})
		}}
	}
}
