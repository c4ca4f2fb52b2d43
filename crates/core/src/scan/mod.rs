//! Scan-time machinery: the bounded hand-off between a scan producer and its consumers, the
//! worker pool which runs scan tasks, and the per-session lifecycle with its timing stats.
pub mod executor;
pub mod queue;
pub mod session;
pub mod stats;

pub use executor::{ScanExecutor, Shutdown, Task};
pub use queue::{BoundedBlockingQueue, PutError, TakeError};
pub use session::{ScanSession, SessionState, StatsListener};
pub use stats::{ScanSessionStats, Timer, TimerKind};
