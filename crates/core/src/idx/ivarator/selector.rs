use std::collections::HashSet;

use url::Url;

use crate::err::Error;
use crate::idx::ivarator::config::IvaratorCacheDirConfig;
use crate::idx::ivarator::probe::{StorageCapacity, StorageProbe};

const TARGET: &str = "shardscan::core::idx::ivarator";

/// A cache directory which was eligible when it was selected
#[derive(Clone, Debug, PartialEq)]
pub struct IvaratorCacheDir {
	config: IvaratorCacheDirConfig,
	base: Url,
	capacity: StorageCapacity,
}

impl IvaratorCacheDir {
	pub fn config(&self) -> &IvaratorCacheDirConfig {
		&self.config
	}

	pub fn base_path(&self) -> &Url {
		&self.base
	}

	/// The capacity reported by the probe at selection time
	pub fn capacity(&self) -> StorageCapacity {
		self.capacity
	}

	/// The spill location of one scan of one query, `{base}/{query_id}/{scan_id}`
	pub fn query_path(&self, query_id: &str, scan_id: &str) -> Result<Url, Error> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| Error::InvalidConfiguration {
				config: self.config.to_string(),
				reason: "the base path cannot hold sub-directories".to_owned(),
			})?
			.pop_if_empty()
			.push(query_id)
			.push(scan_id);
		Ok(url)
	}
}

/// Picks the first cache directory, by ascending priority, which is valid and has enough free
/// storage.
pub struct IvaratorCacheDirSelector<P> {
	candidates: Vec<(IvaratorCacheDirConfig, Url)>,
	probe: P,
}

impl<P: StorageProbe> IvaratorCacheDirSelector<P> {
	/// Invalid configurations are dropped with a warning. Fails only when none is left.
	pub fn new(
		configs: impl IntoIterator<Item = IvaratorCacheDirConfig>,
		probe: P,
	) -> Result<Self, Error> {
		let mut candidates = Vec::new();
		let mut last_error = None;
		for config in configs {
			match config.validate().and_then(|_| config.base_path()) {
				Ok(url) => candidates.push((config, url)),
				Err(e) => {
					warn!(target: TARGET, "Ignoring ivarator cache directory: {e}");
					last_error = Some(e);
				}
			}
		}
		if candidates.is_empty() {
			return Err(last_error.unwrap_or_else(|| Error::InvalidConfiguration {
				config: "[]".to_owned(),
				reason: "no ivarator cache directories are configured".to_owned(),
			}));
		}
		// Stable, so equal priorities keep their configured order
		candidates.sort_by_key(|(c, _)| c.priority);
		Ok(IvaratorCacheDirSelector {
			candidates,
			probe,
		})
	}

	/// The valid configurations, in the order they are tried
	pub fn candidates(&self) -> impl Iterator<Item = &IvaratorCacheDirConfig> {
		self.candidates.iter().map(|(c, _)| c)
	}

	fn eligible(&self, config: &IvaratorCacheDirConfig, url: &Url) -> Option<StorageCapacity> {
		let capacity = match self.probe.probe(url) {
			Ok(c) => c,
			Err(e) => {
				warn!(target: TARGET, "Unable to probe ivarator cache directory {config}: {e:#}");
				return None;
			}
		};
		// Validation guarantees the minimum is not negative
		let min_mib = u64::try_from(config.min_available_storage_mib).unwrap_or(u64::MAX);
		if capacity.available_mib() < min_mib
			|| capacity.available_fraction() < config.min_available_storage_percent
		{
			debug!(
				target: TARGET,
				available_mib = capacity.available_mib(),
				available_fraction = capacity.available_fraction(),
				"Ivarator cache directory {config} has too little free storage"
			);
			return None;
		}
		Some(capacity)
	}

	/// Selects the first eligible directory whose base path is not in `excluded`
	pub fn select(&self, excluded: &HashSet<String>) -> Result<IvaratorCacheDir, Error> {
		for (config, url) in &self.candidates {
			if excluded.contains(&config.base_path_uri) {
				continue;
			}
			if let Some(capacity) = self.eligible(config, url) {
				debug!(target: TARGET, "Selected ivarator cache directory {config}");
				return Ok(IvaratorCacheDir {
					config: config.clone(),
					base: url.clone(),
					capacity,
				});
			}
		}
		Err(Error::NoEligibleStorage {
			candidates: self.candidates.len(),
			excluded: excluded.len(),
		})
	}

	/// Starts a selection which remembers the directories that failed
	pub fn session(&self) -> Selection<'_, P> {
		Selection {
			selector: self,
			failed: HashSet::new(),
		}
	}
}

/// A chain of selections, each one skipping the directories that failed before
pub struct Selection<'a, P> {
	selector: &'a IvaratorCacheDirSelector<P>,
	failed: HashSet<String>,
}

impl<P: StorageProbe> Selection<'_, P> {
	pub fn select(&self) -> Result<IvaratorCacheDir, Error> {
		self.selector.select(&self.failed)
	}

	/// Records that a directory became unusable
	pub fn mark_failed(&mut self, dir: &IvaratorCacheDir) {
		warn!(target: TARGET, "Ivarator cache directory {} failed", dir.config());
		self.failed.insert(dir.config().base_path_uri.clone());
	}

	pub fn failed(&self) -> &HashSet<String> {
		&self.failed
	}
}
