//! Frame-coalescing render queue and level-of-detail selection.
//!
//! Input handlers never paint directly. They queue a job that mutates the
//! river state; the first job in a frame requests one animation frame, and
//! that frame drains every queued job in submission order before a single
//! paint. Bursts of mouse or wheel events therefore cost one paint.

use std::collections::VecDeque;

use super::config::LodConfig;

/// Something that can arrange for [`RenderQueue::begin_frame`] to be called
/// on the next animation frame.
pub trait FrameScheduler {
	fn request_frame(&self);
}

type RenderJob<C> = Box<dyn FnOnce(&mut C)>;

/// FIFO of state jobs with at most one outstanding frame request.
pub struct RenderQueue<S, C> {
	scheduler: S,
	jobs: VecDeque<RenderJob<C>>,
	frame_pending: bool,
}

impl<S: FrameScheduler, C> RenderQueue<S, C> {
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			jobs: VecDeque::new(),
			frame_pending: false,
		}
	}

	/// Append a job; requests a frame only if none is pending.
	pub fn queue_render(&mut self, job: impl FnOnce(&mut C) + 'static) {
		self.jobs.push_back(Box::new(job));
		self.request_frame();
	}

	/// Ask for a frame without queueing work (animations in flight).
	pub fn request_frame(&mut self) {
		if !self.frame_pending {
			self.frame_pending = true;
			self.scheduler.request_frame();
		}
	}

	/// Take everything queued so far and go idle. Jobs queued after this
	/// call belong to the next frame.
	pub fn begin_frame(&mut self) -> FrameBatch<C> {
		self.frame_pending = false;
		FrameBatch {
			jobs: std::mem::take(&mut self.jobs),
		}
	}

	/// Drop queued jobs (view teardown).
	pub fn clear(&mut self) {
		self.jobs.clear();
	}
}

/// Jobs drained for one frame.
pub struct FrameBatch<C> {
	jobs: VecDeque<RenderJob<C>>,
}

impl<C> FrameBatch<C> {
	/// Run every job in submission order.
	pub fn run(self, state: &mut C) {
		for job in self.jobs {
			job(state);
		}
	}
}

/// Drawing fidelity for one paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderDetail {
	/// Flat representative fill, no labels.
	Low,
	/// Sponsor stripes and labels.
	High,
}

/// Low detail when there are too many nodes on screen or the view is zoomed
/// too far out; either condition alone is enough.
pub fn select_detail(node_count: usize, scale: f64, config: &LodConfig) -> RenderDetail {
	if node_count > config.max_detailed_nodes || scale < config.min_detailed_scale {
		RenderDetail::Low
	} else {
		RenderDetail::High
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[derive(Clone, Default)]
	struct CountingScheduler(Rc<Cell<usize>>);

	impl FrameScheduler for CountingScheduler {
		fn request_frame(&self) {
			self.0.set(self.0.get() + 1);
		}
	}

	#[test]
	fn bursts_coalesce_into_one_frame() {
		let scheduler = CountingScheduler::default();
		let mut queue: RenderQueue<_, Vec<u32>> = RenderQueue::new(scheduler.clone());
		queue.queue_render(|log| log.push(1));
		queue.queue_render(|log| log.push(2));
		queue.queue_render(|log| log.push(3));
		assert_eq!(scheduler.0.get(), 1);

		let mut log = Vec::new();
		queue.begin_frame().run(&mut log);
		assert_eq!(log, vec![1, 2, 3]);

		// The drained queue is idle again, so the next request goes through.
		queue.request_frame();
		assert_eq!(scheduler.0.get(), 2);
	}

	#[test]
	fn jobs_after_drain_need_a_new_frame() {
		let scheduler = CountingScheduler::default();
		let mut queue: RenderQueue<_, Vec<u32>> = RenderQueue::new(scheduler.clone());
		queue.queue_render(|log| log.push(1));
		let batch = queue.begin_frame();
		queue.queue_render(|log| log.push(2));
		assert_eq!(scheduler.0.get(), 2);

		let mut log = Vec::new();
		batch.run(&mut log);
		assert_eq!(log, vec![1]);
		queue.begin_frame().run(&mut log);
		assert_eq!(log, vec![1, 2]);
	}

	#[test]
	fn bare_frame_requests_are_coalesced_too() {
		let scheduler = CountingScheduler::default();
		let mut queue: RenderQueue<_, u32> = RenderQueue::new(scheduler.clone());
		queue.request_frame();
		queue.queue_render(|count: &mut u32| *count += 1);
		assert_eq!(scheduler.0.get(), 1);

		let mut count = 0;
		queue.begin_frame().run(&mut count);
		assert_eq!(count, 1);
	}

	#[test]
	fn either_threshold_lowers_detail() {
		let config = LodConfig::default();
		assert_eq!(select_detail(50, 1.0, &config), RenderDetail::High);
		assert_eq!(select_detail(100, 0.8, &config), RenderDetail::High);
		assert_eq!(select_detail(101, 2.0, &config), RenderDetail::Low);
		assert_eq!(select_detail(10, 0.79, &config), RenderDetail::Low);
	}
}
