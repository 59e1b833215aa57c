//! Time-based callbacks driven by the frame clock.
//!
//! Nothing here owns a timer. Callers pass the current time (milliseconds,
//! same clock as `requestAnimationFrame` timestamps) and poll once per frame,
//! so pending work can be inspected and cancelled without touching the
//! browser.

/// Last-write-wins delay: every [`schedule`](Debouncer::schedule) replaces
/// the pending deadline, and [`poll`](Debouncer::poll) fires once after the
/// input has been quiet for the full delay.
#[derive(Clone, Debug)]
pub struct Debouncer {
	delay_ms: f64,
	deadline: Option<f64>,
}

impl Debouncer {
	pub fn new(delay_ms: f64) -> Self {
		Self {
			delay_ms,
			deadline: None,
		}
	}

	pub fn schedule(&mut self, now: f64) {
		self.deadline = Some(now + self.delay_ms);
	}

	pub fn cancel(&mut self) {
		self.deadline = None;
	}

	pub fn is_pending(&self) -> bool {
		self.deadline.is_some()
	}

	/// True exactly once when the deadline has passed.
	pub fn poll(&mut self, now: f64) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}
}

/// Handle for one scheduled sequence of events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SequenceId(u64);

#[derive(Clone, Debug)]
struct Scheduled<A> {
	at: f64,
	order: u64,
	sequence: SequenceId,
	action: A,
}

/// Ordered list of `(time, action)` events.
///
/// Events are grouped into sequences so a whole animation (a path highlight,
/// a focus pulse) can be cancelled at once.
#[derive(Clone, Debug)]
pub struct Timeline<A> {
	events: Vec<Scheduled<A>>,
	next_sequence: u64,
	next_order: u64,
}

impl<A> Default for Timeline<A> {
	fn default() -> Self {
		Self {
			events: Vec::new(),
			next_sequence: 0,
			next_order: 0,
		}
	}
}

impl<A> Timeline<A> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedule `steps` as `(delay_ms, action)` pairs relative to `now`.
	pub fn schedule_sequence(
		&mut self,
		now: f64,
		steps: impl IntoIterator<Item = (f64, A)>,
	) -> SequenceId {
		let sequence = SequenceId(self.next_sequence);
		self.next_sequence += 1;
		for (delay, action) in steps {
			self.events.push(Scheduled {
				at: now + delay.max(0.0),
				order: self.next_order,
				sequence,
				action,
			});
			self.next_order += 1;
		}
		sequence
	}

	/// Drop every pending event of one sequence. Returns how many were dropped.
	pub fn cancel(&mut self, sequence: SequenceId) -> usize {
		let before = self.events.len();
		self.events.retain(|event| event.sequence != sequence);
		before - self.events.len()
	}

	pub fn cancel_all(&mut self) {
		self.events.clear();
	}

	pub fn is_idle(&self) -> bool {
		self.events.is_empty()
	}

	/// Remove and return every event due at `now`, earliest first; ties keep
	/// scheduling order.
	pub fn poll(&mut self, now: f64) -> Vec<A> {
		let (mut due, rest): (Vec<_>, Vec<_>) =
			self.events.drain(..).partition(|event| event.at <= now);
		self.events = rest;
		due.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.order.cmp(&b.order)));
		due.into_iter().map(|event| event.action).collect()
	}
}
