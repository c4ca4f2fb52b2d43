use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::cnf::{SCAN_EXECUTOR_THREADS, SCAN_POLL_INTERVAL, SCAN_QUEUE_CAPACITY};
use crate::err::Error;
use crate::scan::queue::{BoundedBlockingQueue, PutError, TakeError};

const TARGET: &str = "shardscan::core::scan::executor";

/// A unit of work evaluated by a scan worker
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something which can be halted immediately, abandoning its pending work
pub trait Shutdown: Send + Sync {
	/// Stops accepting work, interrupts the workers and returns the tasks which never ran
	fn shutdown_now(&self) -> Vec<Task>;
}

struct Inner {
	queue: BoundedBlockingQueue<Task>,
	/// Cleared once no more tasks are accepted
	accepting: AtomicBool,
	/// Set when the workers must stop without draining the queue
	halted: AtomicBool,
	completed: AtomicU64,
	poll_interval: Duration,
}

/// A fixed pool of worker threads consuming a bounded queue of tasks.
///
/// Submitting blocks while the queue is full, which throttles a scan producer to the pace of
/// its consumers.
pub struct ScanExecutor {
	inner: Arc<Inner>,
	workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ScanExecutor {
	/// Creates an executor sized by `SHARDSCAN_SCAN_EXECUTOR_THREADS` and
	/// `SHARDSCAN_SCAN_QUEUE_CAPACITY`
	pub fn new(name: &str) -> Result<Self, Error> {
		Self::with_capacity(name, *SCAN_EXECUTOR_THREADS, *SCAN_QUEUE_CAPACITY)
	}

	pub fn with_capacity(name: &str, threads: usize, capacity: usize) -> Result<Self, Error> {
		let inner = Arc::new(Inner {
			queue: BoundedBlockingQueue::new(capacity)?,
			accepting: AtomicBool::new(true),
			halted: AtomicBool::new(false),
			completed: AtomicU64::new(0),
			poll_interval: *SCAN_POLL_INTERVAL,
		});
		let threads = threads.max(1);
		let mut workers = Vec::with_capacity(threads);
		for i in 0..threads {
			let worker = inner.clone();
			let handle = thread::Builder::new()
				.name(format!("{name}-{i}"))
				.spawn(move || work(&worker))
				.map_err(|e| Error::Thread(e.to_string()));
			match handle {
				Ok(h) => workers.push(h),
				Err(e) => {
					inner_halt(&inner);
					return Err(e);
				}
			}
		}
		debug!(target: TARGET, name, threads, capacity, "started scan executor");
		Ok(ScanExecutor {
			inner,
			workers: Mutex::new(workers),
		})
	}

	/// Queues a task, waiting while the queue is full.
	///
	/// Fails with [`Error::ExecutorShutdown`] once the executor no longer accepts work.
	pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> Result<(), Error> {
		let mut task: Task = Box::new(task);
		loop {
			if !self.inner.accepting.load(Ordering::Acquire) {
				return Err(Error::ExecutorShutdown);
			}
			match self.inner.queue.offer_timeout(task, self.inner.poll_interval) {
				Ok(()) => return Ok(()),
				Err(PutError::Full(t) | PutError::Timeout(t) | PutError::Interrupted(t)) => {
					task = t
				}
			}
		}
	}

	pub fn is_shutdown(&self) -> bool {
		!self.inner.accepting.load(Ordering::Acquire)
	}

	/// The number of tasks waiting for a worker
	pub fn queued(&self) -> usize {
		self.inner.queue.size()
	}

	/// The number of tasks which ran to completion or panicked
	pub fn completed(&self) -> u64 {
		self.inner.completed.load(Ordering::Acquire)
	}

	/// Stops accepting tasks. Workers finish what is already queued and then exit.
	pub fn shutdown(&self) {
		self.inner.accepting.store(false, Ordering::Release);
	}

	/// Waits for every worker to exit
	pub fn join(&self) {
		let workers = std::mem::take(&mut *self.workers.lock());
		for w in workers {
			if w.join().is_err() {
				warn!(target: TARGET, "A scan worker exited abnormally");
			}
		}
	}
}

fn inner_halt(inner: &Inner) -> Vec<Task> {
	inner.accepting.store(false, Ordering::Release);
	inner.halted.store(true, Ordering::Release);
	inner.queue.interrupt();
	let mut pending = Vec::new();
	inner.queue.drain_to(&mut pending, usize::MAX);
	pending
}

impl Shutdown for ScanExecutor {
	fn shutdown_now(&self) -> Vec<Task> {
		let pending = inner_halt(&self.inner);
		debug!(target: TARGET, pending = pending.len(), "halted scan executor");
		pending
	}
}

impl Drop for ScanExecutor {
	fn drop(&mut self) {
		if !self.inner.halted.load(Ordering::Acquire) {
			inner_halt(&self.inner);
		}
	}
}

fn work(inner: &Inner) {
	loop {
		if inner.halted.load(Ordering::Acquire) {
			return;
		}
		match inner.queue.poll_timeout(inner.poll_interval) {
			Ok(task) => {
				if catch_unwind(AssertUnwindSafe(task)).is_err() {
					warn!(target: TARGET, "A scan task panicked");
				}
				inner.completed.fetch_add(1, Ordering::AcqRel);
			}
			Err(TakeError::Timeout) => {
				if !inner.accepting.load(Ordering::Acquire) && inner.queue.is_empty() {
					return;
				}
			}
			Err(TakeError::Interrupted) => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::mpsc;

	#[test]
	fn runs_submitted_tasks() {
		let executor = ScanExecutor::with_capacity("test-scan", 2, 4).unwrap();
		let (tx, rx) = mpsc::channel();
		for i in 0..20 {
			let tx = tx.clone();
			executor.submit(move || tx.send(i).unwrap()).unwrap();
		}
		let mut seen: Vec<i32> = (0..20).map(|_| rx.recv().unwrap()).collect();
		seen.sort();
		assert_eq!(seen, (0..20).collect::<Vec<_>>());
		executor.shutdown();
		executor.join();
		assert_eq!(executor.completed(), 20);
		assert!(matches!(executor.submit(|| ()), Err(Error::ExecutorShutdown)));
	}

	#[test]
	fn invalid_capacities_start_no_workers() {
		assert!(matches!(
			ScanExecutor::with_capacity("test-scan", 2, 0),
			Err(Error::InvalidCapacity(0))
		));
		let executor = ScanExecutor::with_capacity("test-scan", 0, 1).unwrap();
		assert_eq!(executor.workers.lock().len(), 1);
		executor.shutdown();
		executor.join();
	}

	#[test]
	fn shutdown_now_returns_pending_tasks() {
		let executor = ScanExecutor::with_capacity("test-scan", 1, 8).unwrap();
		let (started_tx, started_rx) = mpsc::channel();
		let (release_tx, release_rx) = mpsc::channel::<()>();
		executor
			.submit(move || {
				started_tx.send(()).unwrap();
				let _ = release_rx.recv();
			})
			.unwrap();
		started_rx.recv().unwrap();
		for _ in 0..3 {
			executor.submit(|| ()).unwrap();
		}
		let pending = executor.shutdown_now();
		assert_eq!(pending.len(), 3);
		release_tx.send(()).unwrap();
		executor.join();
		assert!(executor.is_shutdown());
		assert_eq!(executor.completed(), 1);
	}

	#[test]
	fn survives_panicking_tasks() {
		let executor = ScanExecutor::with_capacity("test-scan", 1, 2).unwrap();
		let (tx, rx) = mpsc::channel();
		executor.submit(|| panic!("boom")).unwrap();
		executor.submit(move || tx.send(1).unwrap()).unwrap();
		assert_eq!(rx.recv().unwrap(), 1);
	}
}
