use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::err::Error;
use crate::scan::executor::Shutdown;
use crate::scan::stats::{ScanSessionStats, TimerKind};

const TARGET: &str = "shardscan::core::scan::session";

/// The lifecycle of a scan session
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SessionState {
	New,
	Starting,
	Running,
	Stopping,
	Terminated,
	Failed,
}

impl SessionState {
	pub fn as_str(&self) -> &'static str {
		match self {
			SessionState::New => "NEW",
			SessionState::Starting => "STARTING",
			SessionState::Running => "RUNNING",
			SessionState::Stopping => "STOPPING",
			SessionState::Terminated => "TERMINATED",
			SessionState::Failed => "FAILED",
		}
	}

	/// Whether the session can move from this state to `next`
	pub fn can_transition(&self, next: SessionState) -> bool {
		use SessionState::*;
		matches!(
			(self, next),
			(New, Starting | Stopping | Failed)
				| (Starting, Running | Stopping | Failed)
				| (Running, Stopping | Failed)
				| (Stopping, Terminated | Failed)
		)
	}

	/// Terminated and Failed are final
	pub fn is_final(&self) -> bool {
		matches!(self, SessionState::Terminated | SessionState::Failed)
	}
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Keeps the session stats in step with the lifecycle, and halts the scan executor when the
/// session stops or fails.
pub struct StatsListener {
	stats: Arc<Mutex<ScanSessionStats>>,
	executor: Arc<dyn Shutdown>,
}

impl StatsListener {
	pub fn new(stats: Arc<Mutex<ScanSessionStats>>, executor: Arc<dyn Shutdown>) -> Self {
		StatsListener {
			stats,
			executor,
		}
	}

	pub fn starting(&self) {
		let mut stats = self.stats.lock();
		stats.init();
		stats.timer_mut(TimerKind::ScannerStart).start();
	}

	pub fn running(&self) {
		self.stats.lock().suspend(TimerKind::ScannerStart);
	}

	pub fn stopping(&self, from: SessionState) {
		if matches!(from, SessionState::New | SessionState::Starting | SessionState::Running) {
			self.halt();
		}
	}

	pub fn terminated(&self) {
		self.stats.lock().stop_all();
	}

	pub fn failed(&self, from: SessionState, reason: &str) {
		warn!(target: TARGET, from = from.as_str(), "Scan session failed: {reason}");
		self.stats.lock().stop_all();
		self.halt();
	}

	fn halt(&self) {
		let pending = self.executor.shutdown_now();
		debug!(target: TARGET, pending = pending.len(), "Abandoned pending scan tasks");
	}
}

/// One scan, driven through its lifecycle by explicit transitions
pub struct ScanSession {
	id: String,
	state: SessionState,
	stats: Arc<Mutex<ScanSessionStats>>,
	listener: StatsListener,
}

impl ScanSession {
	pub fn new(id: impl Into<String>, executor: Arc<dyn Shutdown>) -> Self {
		let stats = Arc::new(Mutex::new(ScanSessionStats::new()));
		ScanSession {
			id: id.into(),
			state: SessionState::New,
			listener: StatsListener::new(stats.clone(), executor),
			stats,
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	/// A handle on the stats, shared with the scanner which updates the counters
	pub fn stats(&self) -> Arc<Mutex<ScanSessionStats>> {
		self.stats.clone()
	}

	fn transition(&mut self, next: SessionState) -> Result<SessionState, Error> {
		let from = self.state;
		if !from.can_transition(next) {
			return Err(Error::InvalidStateTransition {
				from: from.as_str(),
				to: next.as_str(),
			});
		}
		trace!(target: TARGET, id = %self.id, from = from.as_str(), to = next.as_str(), "Scan session transition");
		self.state = next;
		Ok(from)
	}

	pub fn start(&mut self) -> Result<(), Error> {
		self.transition(SessionState::Starting)?;
		self.listener.starting();
		Ok(())
	}

	pub fn running(&mut self) -> Result<(), Error> {
		self.transition(SessionState::Running)?;
		self.listener.running();
		Ok(())
	}

	pub fn stop(&mut self) -> Result<(), Error> {
		let from = self.transition(SessionState::Stopping)?;
		self.listener.stopping(from);
		Ok(())
	}

	pub fn terminate(&mut self) -> Result<(), Error> {
		self.transition(SessionState::Terminated)?;
		self.listener.terminated();
		Ok(())
	}

	pub fn fail(&mut self, reason: &str) -> Result<(), Error> {
		let from = self.transition(SessionState::Failed)?;
		self.listener.failed(from, reason);
		Ok(())
	}
}
