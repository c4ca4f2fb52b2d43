use std::time::Duration;

use thiserror::Error;

/// An error originating from the shardscan core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// A composite key does not have the byte layout its codec expects
	#[error("Malformed key '{key}': {reason}")]
	MalformedKey {
		key: String,
		reason: String,
	},

	/// A key component cannot be encoded into a composite key
	#[error("Unable to encode the {component} of a composite key: {reason}")]
	InvalidKeyComponent {
		component: &'static str,
		reason: String,
	},

	/// An ivarator cache directory configuration failed validation
	#[error("Invalid ivarator cache directory configuration {config}: {reason}")]
	InvalidConfiguration {
		config: String,
		reason: String,
	},

	/// No ivarator cache directory is valid and has enough free storage
	#[error(
		"No eligible ivarator cache directory was found among {candidates} candidates ({excluded} excluded)"
	)]
	NoEligibleStorage {
		candidates: usize,
		excluded: usize,
	},

	/// A storage capacity probe did not answer in time
	#[error("The storage capacity probe for '{uri}' did not complete within {timeout:?}")]
	ProbeTimeout {
		uri: String,
		timeout: Duration,
	},

	/// A query tree contains a node kind which a planning pass cannot handle
	#[error("Unsupported query node: {0}")]
	UnsupportedNode(String),

	/// The query text could not be parsed
	#[error("Parse error at offset {offset}: {message}")]
	InvalidQuery {
		offset: usize,
		message: String,
	},

	/// The query cannot be answered from the index
	#[error("The query is not executable against the index: {0}")]
	NotExecutable(String),

	/// A scan session was asked to move to a state it cannot reach
	#[error("Invalid scan session transition from {from} to {to}")]
	InvalidStateTransition {
		from: &'static str,
		to: &'static str,
	},

	/// Work was submitted to an executor which has been shut down
	#[error("The scan executor has been shut down")]
	ExecutorShutdown,

	/// A worker thread could not be started
	#[error("Unable to spawn a thread: {0}")]
	Thread(String),

	/// A bounded structure was created without room for any element
	#[error("The capacity must be greater than zero, but was {0}")]
	InvalidCapacity(usize),

	/// Configuration could not be serialized or deserialized
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Error {
		Error::Serialization(e.to_string())
	}
}

/// The result type used throughout the shardscan core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_key_names_the_key() {
		let e = Error::MalformedKey {
			key: "row fi\\x00FIELD:value".to_owned(),
			reason: "expected 2 NUL separators, found 0".to_owned(),
		};
		assert_eq!(
			e.to_string(),
			"Malformed key 'row fi\\x00FIELD:value': expected 2 NUL separators, found 0"
		);
	}

	#[test]
	fn json_errors_convert() {
		let e: Error = serde_json::from_str::<u32>("{").unwrap_err().into();
		assert!(matches!(e, Error::Serialization(_)));
	}
}
