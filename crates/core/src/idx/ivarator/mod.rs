//! Disk storage for index results too large to hold in memory.
//!
//! An ivarator materialises the candidate uids of an index lookup into a cache directory. The
//! directories are configured as a prioritised list, and each one must keep a minimum of free
//! storage. A directory which fails during a scan is excluded and the next one is selected.
pub mod config;
pub mod probe;
pub mod selector;

pub use config::IvaratorCacheDirConfig;
pub use probe::{FixedProbe, LocalFilesystemProbe, StorageCapacity, StorageProbe, TimeoutProbe};
pub use selector::{IvaratorCacheDir, IvaratorCacheDirSelector, Selection};
