use std::sync::LazyLock;
use std::time::Duration;

/// Specifies how deep the query parser will recurse before an error is returned.
pub static MAX_QUERY_DEPTH: LazyLock<u32> = lazy_env_parse!("SHARDSCAN_MAX_QUERY_DEPTH", u32, 120);

/// The number of scan results which can be buffered between a scan producer and its consumer.
pub static SCAN_QUEUE_CAPACITY: LazyLock<usize> =
	lazy_env_parse!("SHARDSCAN_SCAN_QUEUE_CAPACITY", usize, 1000);

/// The number of worker threads evaluating scan results for a single scan session.
pub static SCAN_EXECUTOR_THREADS: LazyLock<usize> =
	lazy_env_parse!("SHARDSCAN_SCAN_EXECUTOR_THREADS", usize, || num_cpus::get());

/// How long an idle scan worker waits on the queue before re-checking for shutdown.
pub static SCAN_POLL_INTERVAL: LazyLock<Duration> =
	lazy_env_millis!("SHARDSCAN_SCAN_POLL_INTERVAL_MS", 10);

/// The upper bound on a single storage capacity probe of an ivarator cache directory.
/// A probe that does not answer in time is treated as a failed probe.
pub static IVARATOR_PROBE_TIMEOUT: LazyLock<Duration> =
	lazy_env_millis!("SHARDSCAN_IVARATOR_PROBE_TIMEOUT_MS", 5000);

/// The ivarator cache directories, as a JSON array of cache directory descriptors.
pub static IVARATOR_CACHE_DIRS: LazyLock<Option<String>> =
	lazy_env_parse!("SHARDSCAN_IVARATOR_CACHE_DIRS", Option<String>);

/// The URI schemes accepted for an ivarator cache directory base path.
pub const IVARATOR_CACHE_DIR_SCHEMES: &[&str] = &["file", "hdfs", "viewfs"];
