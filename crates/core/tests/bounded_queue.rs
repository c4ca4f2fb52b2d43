use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use shardscan_core::scan::{BoundedBlockingQueue, ScanExecutor, ScanSession, SessionState, TakeError};

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 3;
const PER_PRODUCER: usize = 500;
const CAPACITY: usize = 8;

#[test]
fn many_producers_and_consumers_respect_the_capacity() {
	let queue = Arc::new(BoundedBlockingQueue::new(CAPACITY).unwrap());
	let producers: Vec<_> = (0..PRODUCERS)
		.map(|p| {
			let queue = queue.clone();
			thread::spawn(move || {
				for i in 0..PER_PRODUCER {
					queue.put(p * PER_PRODUCER + i).unwrap();
					assert!(queue.size() <= CAPACITY);
				}
			})
		})
		.collect();
	let consumers: Vec<_> = (0..CONSUMERS)
		.map(|_| {
			let queue = queue.clone();
			thread::spawn(move || {
				let mut seen = Vec::new();
				loop {
					match queue.poll_timeout(Duration::from_millis(200)) {
						Ok(v) => seen.push(v),
						Err(TakeError::Timeout) => return seen,
						Err(TakeError::Interrupted) => unreachable!(),
					}
				}
			})
		})
		.collect();
	for p in producers {
		p.join().unwrap();
	}
	let mut all: Vec<usize> = consumers.into_iter().flat_map(|c| c.join().unwrap()).collect();
	all.sort_unstable();
	assert_eq!(all, (0..PRODUCERS * PER_PRODUCER).collect::<Vec<_>>());
	assert!(queue.is_empty());
}

#[test]
fn draining_frees_room_for_blocked_producers() {
	let queue = Arc::new(BoundedBlockingQueue::new(2).unwrap());
	queue.put(0).unwrap();
	queue.put(1).unwrap();
	let producer = {
		let queue = queue.clone();
		thread::spawn(move || {
			queue.put(2).unwrap();
			queue.put(3).unwrap();
		})
	};
	let mut drained = Vec::new();
	while drained.len() < 4 {
		let before = drained.len();
		let moved = queue.drain_to(&mut drained, 2);
		assert!(moved <= 2);
		assert_eq!(drained.len(), before + moved);
		thread::sleep(Duration::from_millis(5));
	}
	producer.join().unwrap();
	assert_eq!(drained, vec![0, 1, 2, 3]);
}

#[test_log::test]
fn stopping_a_session_halts_its_executor() {
	let executor = Arc::new(ScanExecutor::with_capacity("scan", 2, 16).unwrap());
	let ran = Arc::new(AtomicUsize::new(0));
	let mut session = ScanSession::new("scan-42", executor.clone());
	session.start().unwrap();
	for _ in 0..4 {
		let ran = ran.clone();
		executor
			.submit(move || {
				ran.fetch_add(1, Ordering::SeqCst);
			})
			.unwrap();
	}
	session.running().unwrap();
	session.stop().unwrap();
	assert!(executor.is_shutdown());
	assert!(executor.submit(|| ()).is_err());
	session.terminate().unwrap();
	assert_eq!(session.state(), SessionState::Terminated);
	executor.join();
	assert!(ran.load(Ordering::SeqCst) <= 4);
}
