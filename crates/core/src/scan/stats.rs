use std::fmt;
use std::time::{Duration, Instant};

/// The scan phases which are timed
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TimerKind {
	/// From the start of the session until the first results are available
	ScannerStart,
	/// Reading results from the store
	ScannerIterate,
	/// Waiting for the next result on the consumer side
	HasNext,
}

impl TimerKind {
	pub const ALL: [TimerKind; 3] =
		[TimerKind::ScannerStart, TimerKind::ScannerIterate, TimerKind::HasNext];

	pub fn as_str(&self) -> &'static str {
		match self {
			TimerKind::ScannerStart => "SCANNER_START",
			TimerKind::ScannerIterate => "SCANNER_ITERATE",
			TimerKind::HasNext => "HASNEXT",
		}
	}

	fn index(self) -> usize {
		self as usize
	}
}

/// A stopwatch which can be suspended and resumed
#[derive(Clone, Debug, Default)]
pub struct Timer {
	elapsed: Duration,
	running_since: Option<Instant>,
	stopped: bool,
}

impl Timer {
	/// Resets the timer and starts it
	pub fn start(&mut self) {
		*self = Timer {
			running_since: Some(Instant::now()),
			..Timer::default()
		};
	}

	/// Pauses the timer, keeping the time accumulated so far
	pub fn suspend(&mut self) {
		if let Some(since) = self.running_since.take() {
			self.elapsed += since.elapsed();
		}
	}

	/// Continues a suspended timer. A stopped timer stays stopped.
	pub fn resume(&mut self) {
		if !self.stopped && self.running_since.is_none() {
			self.running_since = Some(Instant::now());
		}
	}

	/// Stops the timer for good
	pub fn stop(&mut self) {
		self.suspend();
		self.stopped = true;
	}

	pub fn is_running(&self) -> bool {
		self.running_since.is_some()
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// The accumulated time, including the current run
	pub fn elapsed(&self) -> Duration {
		self.elapsed + self.running_since.map(|s| s.elapsed()).unwrap_or_default()
	}
}

/// Timers and counters of one scan session
#[derive(Clone, Debug, Default)]
pub struct ScanSessionStats {
	timers: [Timer; 3],
	keys_read: u64,
	ranges_seeked: u64,
}

impl ScanSessionStats {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resets every timer and counter
	pub fn init(&mut self) {
		*self = Self::default();
	}

	pub fn timer(&self, kind: TimerKind) -> &Timer {
		&self.timers[kind.index()]
	}

	pub fn timer_mut(&mut self, kind: TimerKind) -> &mut Timer {
		&mut self.timers[kind.index()]
	}

	pub fn resume(&mut self, kind: TimerKind) {
		self.timer_mut(kind).resume();
	}

	pub fn suspend(&mut self, kind: TimerKind) {
		self.timer_mut(kind).suspend();
	}

	pub fn stop_all(&mut self) {
		self.timers.iter_mut().for_each(Timer::stop);
	}

	pub fn elapsed(&self, kind: TimerKind) -> Duration {
		self.timer(kind).elapsed()
	}

	pub fn add_keys_read(&mut self, n: u64) {
		self.keys_read = self.keys_read.saturating_add(n);
	}

	pub fn add_ranges_seeked(&mut self, n: u64) {
		self.ranges_seeked = self.ranges_seeked.saturating_add(n);
	}

	pub fn keys_read(&self) -> u64 {
		self.keys_read
	}

	pub fn ranges_seeked(&self) -> u64 {
		self.ranges_seeked
	}
}

impl fmt::Display for ScanSessionStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for kind in TimerKind::ALL {
			write!(f, "{}: {:?}, ", kind.as_str(), self.elapsed(kind))?;
		}
		write!(f, "keys: {}, ranges: {}", self.keys_read, self.ranges_seeked)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;

	#[test]
	fn suspended_time_is_not_counted() {
		let mut t = Timer::default();
		t.start();
		thread::sleep(Duration::from_millis(5));
		t.suspend();
		let first = t.elapsed();
		assert!(first >= Duration::from_millis(5));
		thread::sleep(Duration::from_millis(5));
		assert_eq!(t.elapsed(), first);
		t.resume();
		assert!(t.is_running());
		t.stop();
		t.resume();
		assert!(t.is_stopped() && !t.is_running());
	}

	#[test]
	fn stats_track_counters() {
		let mut s = ScanSessionStats::new();
		s.add_keys_read(10);
		s.add_keys_read(5);
		s.add_ranges_seeked(2);
		assert_eq!((s.keys_read(), s.ranges_seeked()), (15, 2));
		s.resume(TimerKind::HasNext);
		assert!(s.timer(TimerKind::HasNext).is_running());
		assert!(!s.timer(TimerKind::ScannerStart).is_running());
		s.stop_all();
		assert!(TimerKind::ALL.iter().all(|k| s.timer(*k).is_stopped()));
		assert!(s.to_string().ends_with("keys: 15, ranges: 2"));
		s.init();
		assert_eq!(s.keys_read(), 0);
	}
}
