use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use thiserror::Error;

use crate::err::Error;

/// Why an element could not be added. The element is handed back.
pub enum PutError<T> {
	/// The queue was full
	Full(T),
	/// The queue stayed full until the timeout elapsed
	Timeout(T),
	/// The wait was interrupted
	Interrupted(T),
}

impl<T> PutError<T> {
	pub fn into_inner(self) -> T {
		match self {
			PutError::Full(v) | PutError::Timeout(v) | PutError::Interrupted(v) => v,
		}
	}
}

impl<T> fmt::Debug for PutError<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PutError::Full(_) => f.write_str("Full(..)"),
			PutError::Timeout(_) => f.write_str("Timeout(..)"),
			PutError::Interrupted(_) => f.write_str("Interrupted(..)"),
		}
	}
}

impl<T> fmt::Display for PutError<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PutError::Full(_) => f.write_str("The queue is full"),
			PutError::Timeout(_) => f.write_str("Timed out waiting for room in the queue"),
			PutError::Interrupted(_) => f.write_str("Interrupted while waiting for room in the queue"),
		}
	}
}

impl<T> std::error::Error for PutError<T> {}

/// Why no element could be removed
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TakeError {
	#[error("Timed out waiting for an element")]
	Timeout,
	#[error("Interrupted while waiting for an element")]
	Interrupted,
}

struct State<T> {
	items: VecDeque<T>,
	/// Bumped by every interrupt, so that waiters can tell they were interrupted
	interrupts: u64,
}

/// Waits on `condvar` until notified or past `deadline`, and reports whether it timed out.
/// Without a deadline, from a timeout too large to represent, it waits until notified.
fn wait<T>(
	condvar: &Condvar,
	state: &mut MutexGuard<'_, State<T>>,
	deadline: Option<Instant>,
) -> bool {
	match deadline {
		Some(deadline) => condvar.wait_until(state, deadline).timed_out(),
		None => {
			condvar.wait(state);
			false
		}
	}
}

/// A FIFO queue holding at most `capacity` elements.
///
/// Producers block while the queue is full and consumers block while it is empty. Every wait
/// re-checks its condition after waking, and [`interrupt`](Self::interrupt) wakes every caller
/// blocked at that moment with an `Interrupted` outcome. The queue stays usable afterwards.
pub struct BoundedBlockingQueue<T> {
	state: Mutex<State<T>>,
	not_empty: Condvar,
	not_full: Condvar,
	capacity: usize,
}

impl<T> BoundedBlockingQueue<T> {
	pub fn new(capacity: usize) -> Result<Self, Error> {
		if capacity == 0 {
			return Err(Error::InvalidCapacity(capacity));
		}
		Ok(BoundedBlockingQueue {
			state: Mutex::new(State {
				items: VecDeque::with_capacity(capacity.min(1024)),
				interrupts: 0,
			}),
			not_empty: Condvar::new(),
			not_full: Condvar::new(),
			capacity,
		})
	}

	/// Adds an element if there is room, without blocking
	pub fn offer(&self, item: T) -> Result<(), PutError<T>> {
		let mut state = self.state.lock();
		if state.items.len() >= self.capacity {
			return Err(PutError::Full(item));
		}
		state.items.push_back(item);
		self.not_empty.notify_one();
		Ok(())
	}

	/// Adds an element, waiting for room for at most `timeout`
	pub fn offer_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
		let mut state = self.state.lock();
		let interrupts = state.interrupts;
		let deadline = Instant::now().checked_add(timeout);
		while state.items.len() >= self.capacity {
			let timed_out = wait(&self.not_full, &mut state, deadline);
			if state.interrupts != interrupts {
				return Err(PutError::Interrupted(item));
			}
			if timed_out && state.items.len() >= self.capacity {
				return Err(PutError::Timeout(item));
			}
		}
		state.items.push_back(item);
		self.not_empty.notify_one();
		Ok(())
	}

	/// Adds an element, waiting for room until interrupted
	pub fn put(&self, item: T) -> Result<(), PutError<T>> {
		let mut state = self.state.lock();
		let interrupts = state.interrupts;
		while state.items.len() >= self.capacity {
			self.not_full.wait(&mut state);
			if state.interrupts != interrupts {
				return Err(PutError::Interrupted(item));
			}
		}
		state.items.push_back(item);
		self.not_empty.notify_one();
		Ok(())
	}

	/// Removes the oldest element, waiting for one until interrupted
	pub fn take(&self) -> Result<T, TakeError> {
		let mut state = self.state.lock();
		let interrupts = state.interrupts;
		loop {
			if let Some(item) = state.items.pop_front() {
				self.not_full.notify_one();
				return Ok(item);
			}
			self.not_empty.wait(&mut state);
			if state.interrupts != interrupts {
				return Err(TakeError::Interrupted);
			}
		}
	}

	/// Removes the oldest element, if there is one, without blocking
	pub fn poll(&self) -> Option<T> {
		let mut state = self.state.lock();
		let item = state.items.pop_front()?;
		self.not_full.notify_one();
		Some(item)
	}

	/// Removes the oldest element, waiting for one for at most `timeout`
	pub fn poll_timeout(&self, timeout: Duration) -> Result<T, TakeError> {
		let mut state = self.state.lock();
		let interrupts = state.interrupts;
		let deadline = Instant::now().checked_add(timeout);
		loop {
			if let Some(item) = state.items.pop_front() {
				self.not_full.notify_one();
				return Ok(item);
			}
			let timed_out = wait(&self.not_empty, &mut state, deadline);
			if state.interrupts != interrupts {
				return Err(TakeError::Interrupted);
			}
			if timed_out && state.items.is_empty() {
				return Err(TakeError::Timeout);
			}
		}
	}

	/// Moves up to `max` elements into `sink`, oldest first, and returns how many were moved.
	/// Never blocks.
	pub fn drain_to(&self, sink: &mut impl Extend<T>, max: usize) -> usize {
		let mut state = self.state.lock();
		let n = max.min(state.items.len());
		sink.extend(state.items.drain(..n));
		for _ in 0..n {
			self.not_full.notify_one();
		}
		n
	}

	/// Wakes every caller currently blocked in this queue with an `Interrupted` outcome
	pub fn interrupt(&self) {
		let mut state = self.state.lock();
		state.interrupts = state.interrupts.wrapping_add(1);
		self.not_empty.notify_all();
		self.not_full.notify_all();
	}

	pub fn size(&self) -> usize {
		self.state.lock().items.len()
	}

	pub fn remaining_capacity(&self) -> usize {
		self.capacity - self.size()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn is_empty(&self) -> bool {
		self.size() == 0
	}
}
