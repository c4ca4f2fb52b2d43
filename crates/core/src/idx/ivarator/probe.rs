use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use sysinfo::Disks;
use url::Url;

use crate::cnf::IVARATOR_PROBE_TIMEOUT;
use crate::err::Error;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// The storage behind a cache directory
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StorageCapacity {
	pub available_bytes: u64,
	pub total_bytes: u64,
}

impl StorageCapacity {
	pub fn available_mib(&self) -> u64 {
		self.available_bytes / BYTES_PER_MIB
	}

	/// The available share of the storage. An empty storage reports 0.
	pub fn available_fraction(&self) -> f64 {
		if self.total_bytes == 0 {
			return 0.0;
		}
		self.available_bytes as f64 / self.total_bytes as f64
	}
}

/// Reports how much storage is available at a base location
pub trait StorageProbe: Send + Sync {
	fn probe(&self, uri: &Url) -> Result<StorageCapacity>;
}

impl<P: StorageProbe + ?Sized> StorageProbe for Arc<P> {
	fn probe(&self, uri: &Url) -> Result<StorageCapacity> {
		(**self).probe(uri)
	}
}

/// Probes `file:` locations through the disks mounted on this host
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFilesystemProbe;

impl StorageProbe for LocalFilesystemProbe {
	fn probe(&self, uri: &Url) -> Result<StorageCapacity> {
		if uri.scheme() != "file" {
			bail!("the local filesystem cannot probe '{uri}'");
		}
		let path = uri.to_file_path().map_err(|_| anyhow!("'{uri}' is not a local path"))?;
		// Resolve symlinks when the directory already exists
		let path = std::fs::canonicalize(&path).unwrap_or(path);
		let disks = Disks::new_with_refreshed_list();
		let disk = disks
			.list()
			.iter()
			.filter(|d| path.starts_with(d.mount_point()))
			.max_by_key(|d| d.mount_point().as_os_str().len())
			.with_context(|| format!("no mounted disk contains '{}'", path.display()))?;
		trace!(
			target: TARGET,
			path = %path.display(),
			mount = %disk.mount_point().display(),
			"probed local disk"
		);
		Ok(StorageCapacity {
			available_bytes: disk.available_space(),
			total_bytes: disk.total_space(),
		})
	}
}

const TARGET: &str = "shardscan::core::idx::ivarator::probe";

/// Bounds the latency of another probe
///
/// Each call runs the inner probe on a new thread. If it does not answer in time the probe
/// fails with [`Error::ProbeTimeout`], and its eventual answer is discarded. The thread is
/// detached rather than joined, so a probe which never returns keeps its thread for the life of
/// the process. Inner probes should carry their own bound on blocking calls.
pub struct TimeoutProbe<P> {
	inner: Arc<P>,
	timeout: Duration,
}

impl<P: StorageProbe + 'static> TimeoutProbe<P> {
	/// Bounds the probe by `SHARDSCAN_IVARATOR_PROBE_TIMEOUT_MS`
	pub fn new(inner: P) -> Self {
		Self::with_timeout(inner, *IVARATOR_PROBE_TIMEOUT)
	}

	pub fn with_timeout(inner: P, timeout: Duration) -> Self {
		TimeoutProbe {
			inner: Arc::new(inner),
			timeout,
		}
	}
}

impl<P: StorageProbe + 'static> StorageProbe for TimeoutProbe<P> {
	fn probe(&self, uri: &Url) -> Result<StorageCapacity> {
		let (tx, rx) = mpsc::channel();
		let inner = self.inner.clone();
		let target = uri.clone();
		thread::Builder::new().name("ivarator-probe".to_owned()).spawn(move || {
			// The receiver is gone once the probe timed out
			let _ = tx.send(inner.probe(&target));
		})?;
		match rx.recv_timeout(self.timeout) {
			Ok(res) => res,
			Err(RecvTimeoutError::Timeout) => Err(Error::ProbeTimeout {
				uri: uri.to_string(),
				timeout: self.timeout,
			}
			.into()),
			Err(RecvTimeoutError::Disconnected) => {
				Err(anyhow!("the storage probe for '{uri}' stopped without answering"))
			}
		}
	}
}

/// Answers with fixed capacities, keyed by base location
#[derive(Clone, Debug, Default)]
pub struct FixedProbe {
	capacities: HashMap<String, StorageCapacity>,
}

impl FixedProbe {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, uri: impl Into<String>, available_bytes: u64, total_bytes: u64) -> Self {
		self.capacities.insert(
			uri.into(),
			StorageCapacity {
				available_bytes,
				total_bytes,
			},
		);
		self
	}
}

impl StorageProbe for FixedProbe {
	fn probe(&self, uri: &Url) -> Result<StorageCapacity> {
		self.capacities
			.get(uri.as_str())
			.copied()
			.with_context(|| format!("no capacity is known for '{uri}'"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Instant;

	struct SlowProbe(Duration);

	impl StorageProbe for SlowProbe {
		fn probe(&self, _: &Url) -> Result<StorageCapacity> {
			thread::sleep(self.0);
			Ok(StorageCapacity {
				available_bytes: 1,
				total_bytes: 1,
			})
		}
	}

	#[test]
	fn fractions() {
		let c = StorageCapacity {
			available_bytes: 3 * BYTES_PER_MIB,
			total_bytes: 12 * BYTES_PER_MIB,
		};
		assert_eq!(c.available_mib(), 3);
		assert_eq!(c.available_fraction(), 0.25);
		let empty = StorageCapacity {
			available_bytes: 0,
			total_bytes: 0,
		};
		assert_eq!(empty.available_fraction(), 0.0);
	}

	#[test]
	fn timeouts_fail_the_probe() {
		let url = Url::parse("hdfs://namenode/ivarators").unwrap();
		let probe = TimeoutProbe::with_timeout(SlowProbe(Duration::from_secs(5)), Duration::from_millis(20));
		let err = probe.probe(&url).unwrap_err();
		assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ProbeTimeout { .. })));
		let probe = TimeoutProbe::with_timeout(SlowProbe(Duration::ZERO), Duration::from_secs(5));
		assert_eq!(probe.probe(&url).unwrap().total_bytes, 1);
	}

	struct CountingProbe {
		delay: Duration,
		finished: AtomicUsize,
	}

	impl StorageProbe for CountingProbe {
		fn probe(&self, _: &Url) -> Result<StorageCapacity> {
			thread::sleep(self.delay);
			self.finished.fetch_add(1, Ordering::SeqCst);
			Ok(StorageCapacity {
				available_bytes: 1,
				total_bytes: 1,
			})
		}
	}

	#[test]
	fn timeouts_leave_the_inner_call_running() {
		let url = Url::parse("hdfs://namenode/ivarators").unwrap();
		let probe = TimeoutProbe::with_timeout(
			CountingProbe {
				delay: Duration::from_millis(100),
				finished: Default::default(),
			},
			Duration::from_millis(10),
		);
		assert!(probe.probe(&url).is_err());
		assert_eq!(probe.inner.finished.load(Ordering::SeqCst), 0);
		let deadline = Instant::now() + Duration::from_secs(5);
		while probe.inner.finished.load(Ordering::SeqCst) == 0 {
			assert!(Instant::now() < deadline);
			thread::sleep(Duration::from_millis(10));
		}
	}

	#[test]
	fn local_probe_rejects_remote_locations() {
		let url = Url::parse("hdfs://namenode/ivarators").unwrap();
		assert!(LocalFilesystemProbe.probe(&url).is_err());
	}

	#[test]
	fn local_probe_reads_a_real_directory() {
		let dir = tempfile::tempdir().unwrap();
		let url = Url::from_directory_path(dir.path()).unwrap();
		// Hosts without a visible mount table report an error instead of a capacity
		if let Ok(c) = LocalFilesystemProbe.probe(&url) {
			assert!(c.available_bytes <= c.total_bytes);
		}
	}

	#[test]
	fn fixed_capacities() {
		let probe = FixedProbe::new().with("file:///a", 10, 20);
		let a = Url::parse("file:///a").unwrap();
		assert_eq!(probe.probe(&a).unwrap().available_bytes, 10);
		assert!(probe.probe(&Url::parse("file:///b").unwrap()).is_err());
	}
}
