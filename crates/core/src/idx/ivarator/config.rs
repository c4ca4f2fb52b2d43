use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cnf::{IVARATOR_CACHE_DIR_SCHEMES, IVARATOR_CACHE_DIRS};
use crate::err::Error;

fn default_priority() -> i32 {
	i32::MAX
}

/// A candidate location for ivarator spill files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvaratorCacheDirConfig {
	/// The base location, for example `file:///data/ivarators` or `hdfs://nn:8020/ivarators`
	#[serde(rename = "basePathURI")]
	pub base_path_uri: String,
	/// Lower priorities are tried first
	#[serde(default = "default_priority")]
	pub priority: i32,
	/// The storage which must remain available, in MiB
	#[serde(default, rename = "minAvailableStorageMiB")]
	pub min_available_storage_mib: i64,
	/// The fraction of the storage which must remain available, between 0 and 1
	#[serde(default)]
	pub min_available_storage_percent: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(IvaratorCacheDirConfig),
	Many(Vec<IvaratorCacheDirConfig>),
}

impl IvaratorCacheDirConfig {
	pub fn new(base_path_uri: impl Into<String>) -> Self {
		IvaratorCacheDirConfig {
			base_path_uri: base_path_uri.into(),
			priority: default_priority(),
			min_available_storage_mib: 0,
			min_available_storage_percent: 0.0,
		}
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	pub fn with_min_available_storage_mib(mut self, mib: i64) -> Self {
		self.min_available_storage_mib = mib;
		self
	}

	pub fn with_min_available_storage_percent(mut self, percent: f64) -> Self {
		self.min_available_storage_percent = percent;
		self
	}

	fn invalid(&self, reason: impl Into<String>) -> Error {
		Error::InvalidConfiguration {
			config: self.to_string(),
			reason: reason.into(),
		}
	}

	/// The parsed base location
	pub fn base_path(&self) -> Result<Url, Error> {
		let url = Url::parse(&self.base_path_uri)
			.map_err(|e| self.invalid(format!("the base path is not a valid URI: {e}")))?;
		if !IVARATOR_CACHE_DIR_SCHEMES.contains(&url.scheme()) {
			return Err(self.invalid(format!("the scheme '{}' is not supported", url.scheme())));
		}
		Ok(url)
	}

	/// Checks the base path scheme and the priority and storage thresholds
	pub fn validate(&self) -> Result<(), Error> {
		self.base_path()?;
		if self.priority < 0 {
			return Err(self.invalid("the priority must not be negative"));
		}
		if self.min_available_storage_mib < 0 {
			return Err(self.invalid("the minimum available storage must not be negative"));
		}
		if !(0.0..=1.0).contains(&self.min_available_storage_percent) {
			return Err(self.invalid("the minimum available storage percent must be between 0 and 1"));
		}
		Ok(())
	}

	pub fn is_valid(&self) -> bool {
		self.validate().is_ok()
	}

	/// Reads a list of configurations. A bare object is read as a list of one.
	pub fn from_json_list(json: &str) -> Result<Vec<Self>, Error> {
		Ok(match serde_json::from_str(json)? {
			OneOrMany::One(v) => vec![v],
			OneOrMany::Many(v) => v,
		})
	}

	/// Reads a single configuration, which may be wrapped in a list of one.
	pub fn from_json(json: &str) -> Result<Self, Error> {
		match serde_json::from_str(json)? {
			OneOrMany::One(v) => Ok(v),
			OneOrMany::Many(mut v) if v.len() == 1 => Ok(v.remove(0)),
			OneOrMany::Many(v) => Err(Error::Serialization(format!(
				"expected a single ivarator cache directory, found {}",
				v.len()
			))),
		}
	}

	/// Writes a list of configurations. The output is always a list, even for one element.
	pub fn to_json_list(configs: &[Self]) -> Result<String, Error> {
		Ok(serde_json::to_string(configs)?)
	}

	/// Reads the configurations from `SHARDSCAN_IVARATOR_CACHE_DIRS`, if set
	pub fn from_env() -> Result<Vec<Self>, Error> {
		match IVARATOR_CACHE_DIRS.as_deref() {
			Some(json) => Self::from_json_list(json),
			None => Ok(Vec::new()),
		}
	}
}

impl fmt::Display for IvaratorCacheDirConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "'{}' (priority {})", self.base_path_uri, self.priority)
	}
}
