//! How the index entries are laid out in the sorted key-value store.
//!
//! Every entry is addressed by a row, a column family and a column qualifier. The index
//! families used by the scan layer encode several components into the family and qualifier,
//! separated by NUL bytes:
//!
//! crate::key::fi                 row  fi\0{field}  {value}\0{datatype}\0{uid}
//! crate::key::tf                 row  tf           {datatype}\0{uid}\0{value}\0{field}
//!
//! A value may itself contain NUL bytes, so the codecs locate separators from the side of the
//! qualifier where the components are NUL-free. A uid may contain dots, which delimit child
//! document uids, but never a NUL.
pub mod fi;
pub mod tf;

use crate::err::Error;

/// The byte separating the components of a composite column qualifier
pub(crate) const SEPARATOR: u8 = 0;

/// A raw key of the sorted key-value store.
///
/// Keys order by row, then column family, then column qualifier, each compared bytewise.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Key {
	pub row: Vec<u8>,
	pub cf: Vec<u8>,
	pub cq: Vec<u8>,
}

impl Key {
	pub fn new(row: impl Into<Vec<u8>>, cf: impl Into<Vec<u8>>, cq: impl Into<Vec<u8>>) -> Self {
		Key {
			row: row.into(),
			cf: cf.into(),
			cq: cq.into(),
		}
	}

	/// Renders the key with non-printable bytes escaped, for diagnostics
	pub fn sprint(&self) -> String {
		format!("{} {}:{}", sprint(&self.row), sprint(&self.cf), sprint(&self.cq))
	}
}

/// A half-open range of keys, `start` inclusive and `end` exclusive
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ScanRange {
	pub start: Key,
	pub end: Key,
}

impl ScanRange {
	pub fn contains(&self, key: &Key) -> bool {
		&self.start <= key && key < &self.end
	}
}

pub(crate) fn sprint(bytes: &[u8]) -> String {
	bytes
		.iter()
		.flat_map(|&byte| std::ascii::escape_default(byte))
		.map(char::from)
		.collect()
}

/// Decodes a component of `key`. Invalid UTF-8 makes the whole key malformed.
pub(crate) fn text(key: &Key, bytes: &[u8]) -> Result<String, Error> {
	std::str::from_utf8(bytes).map(str::to_owned).map_err(|e| Error::MalformedKey {
		key: key.sprint(),
		reason: format!("a component is not valid UTF-8: {e}"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sprint_escapes_separators() {
		let key = Key::new("row", b"fi\0NAME".to_vec(), b"bob\0person\0uid.1".to_vec());
		assert_eq!(key.sprint(), "row fi\\x00NAME:bob\\x00person\\x00uid.1");
	}

	#[test]
	fn invalid_utf8_is_malformed() {
		let key = Key::new("r", "tf", b"dt\0uid\0\xff\0FIELD".to_vec());
		assert_eq!(text(&key, b"uid").unwrap(), "uid");
		assert!(matches!(text(&key, b"\xff"), Err(Error::MalformedKey { .. })));
	}

	#[test]
	fn keys_order_bytewise() {
		let a = Key::new("r", "fi\0A", "1");
		let b = Key::new("r", "fi\0A", "1\0");
		let c = Key::new("r", "fi\0B", "0");
		assert!(a < b && b < c);
		let range = ScanRange {
			start: a.clone(),
			end: c.clone(),
		};
		assert!(range.contains(&a));
		assert!(range.contains(&b));
		assert!(!range.contains(&c));
	}
}
