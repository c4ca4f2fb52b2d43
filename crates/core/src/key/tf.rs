//! Term-Frequency keys
//!
//! `{row} tf:{datatype}\0{uid}\0{value}\0{field}`
use crate::err::Error;
use crate::key::{Key, SEPARATOR, text};

const FAMILY: &[u8] = b"tf";

/// A decoded term frequency entry
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TermFrequencyKey {
	pub row: Vec<u8>,
	pub datatype: String,
	pub uid: String,
	pub value: String,
	pub field: String,
}

pub fn is_instance(key: &Key) -> bool {
	key.cf == FAMILY
}

struct Separators {
	first: usize,
	second: usize,
	last: usize,
}

/// Locates the first two separators from the front and the last one from the back
fn separators(key: &Key) -> Result<Separators, Error> {
	let cq = &key.cq;
	let mut front = cq.iter().enumerate().filter(|(_, b)| **b == SEPARATOR).map(|(i, _)| i);
	let first = front.next();
	let second = front.next();
	let last = cq.iter().rposition(|&b| b == SEPARATOR);
	match (first, second, last) {
		(Some(first), Some(second), Some(last)) if last > second => Ok(Separators {
			first,
			second,
			last,
		}),
		_ => Err(Error::MalformedKey {
			key: key.sprint(),
			reason: format!(
				"expected at least 3 NUL separators in the column qualifier, found {}",
				cq.iter().filter(|&&b| b == SEPARATOR).count()
			),
		}),
	}
}

pub fn datatype(key: &Key) -> Result<String, Error> {
	let s = separators(key)?;
	text(key, &key.cq[..s.first])
}

pub fn uid(key: &Key) -> Result<String, Error> {
	let s = separators(key)?;
	text(key, &key.cq[s.first + 1..s.second])
}

/// The value between the uid and the field, which may contain separators
pub fn value(key: &Key) -> Result<String, Error> {
	let s = separators(key)?;
	text(key, &key.cq[s.second + 1..s.last])
}

pub fn field(key: &Key) -> Result<String, Error> {
	let s = separators(key)?;
	text(key, &key.cq[s.last + 1..])
}

impl TermFrequencyKey {
	pub fn new(
		row: impl Into<Vec<u8>>,
		datatype: impl Into<String>,
		uid: impl Into<String>,
		value: impl Into<String>,
		field: impl Into<String>,
	) -> Self {
		TermFrequencyKey {
			row: row.into(),
			datatype: datatype.into(),
			uid: uid.into(),
			value: value.into(),
			field: field.into(),
		}
	}

	pub fn encode(&self) -> Result<Key, Error> {
		for (component, v) in [("datatype", &self.datatype), ("uid", &self.uid), ("field", &self.field)]
		{
			if v.as_bytes().contains(&SEPARATOR) {
				return Err(Error::InvalidKeyComponent {
					component,
					reason: "it contains a NUL byte".to_owned(),
				});
			}
		}
		let mut cq = Vec::with_capacity(
			self.datatype.len() + self.uid.len() + self.value.len() + self.field.len() + 3,
		);
		for (i, part) in [&self.datatype, &self.uid, &self.value, &self.field].into_iter().enumerate()
		{
			if i > 0 {
				cq.push(SEPARATOR);
			}
			cq.extend_from_slice(part.as_bytes());
		}
		Ok(Key {
			row: self.row.clone(),
			cf: FAMILY.to_vec(),
			cq,
		})
	}

	pub fn decode(key: &Key) -> Result<Self, Error> {
		if !is_instance(key) {
			return Err(Error::MalformedKey {
				key: key.sprint(),
				reason: "the column family is not a term frequency family".to_owned(),
			});
		}
		let s = separators(key)?;
		let cq = &key.cq;
		Ok(TermFrequencyKey {
			row: key.row.clone(),
			datatype: text(key, &cq[..s.first])?,
			uid: text(key, &cq[s.first + 1..s.second])?,
			value: text(key, &cq[s.second + 1..s.last])?,
			field: text(key, &cq[s.last + 1..])?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encoded_keys_decode_back() {
		for value in ["a\0b", "", "\0\0", "plain"] {
			let k = TermFrequencyKey::new("20240101_0", "event", "uid.12.37", value, "BODY");
			let encoded = k.encode().unwrap();
			assert_eq!(TermFrequencyKey::decode(&encoded).unwrap(), k);
		}
	}

	#[test]
	fn invalid_utf8_is_malformed() {
		let k = Key::new("r", "tf", b"event\0uid\0\xfe\0BODY".to_vec());
		assert!(matches!(value(&k), Err(Error::MalformedKey { .. })));
		assert_eq!(field(&k).unwrap(), "BODY");
		assert!(TermFrequencyKey::decode(&k).is_err());
	}

	#[test]
	fn decodes_components() {
		let k = Key::new("row", "tf", b"datatype\0uid.1.2\0va\0lue\0TEXT".to_vec());
		assert!(is_instance(&k));
		assert_eq!(datatype(&k).unwrap(), "datatype");
		assert_eq!(uid(&k).unwrap(), "uid.1.2");
		assert_eq!(value(&k).unwrap(), "va\0lue");
		assert_eq!(field(&k).unwrap(), "TEXT");
	}

	#[test]
	fn empty_value() {
		let k = Key::new("row", "tf", b"dt\0uid\0\0TEXT".to_vec());
		assert_eq!(value(&k).unwrap(), "");
		assert_eq!(field(&k).unwrap(), "TEXT");
	}

	#[test]
	fn instance_signature() {
		assert!(!is_instance(&Key::new("row", "tfx", "a\0b\0c\0d")));
		assert!(!is_instance(&Key::new("row", "fi\0tf", "a\0b\0c\0d")));
		assert!(TermFrequencyKey::decode(&Key::new("row", "t", "a\0b\0c\0d")).is_err());
	}

	#[test]
	fn malformed_qualifiers() {
		let k = Key::new("row", "tf", b"dt\0uid\0value".to_vec());
		for r in [datatype(&k), uid(&k), value(&k), field(&k)] {
			match r {
				Err(Error::MalformedKey {
					reason,
					..
				}) => assert!(reason.ends_with("found 2")),
				other => panic!("unexpected {other:?}"),
			}
		}
	}

	#[test]
	fn encoding_rejects_separators() {
		assert!(TermFrequencyKey::new("r", "dt", "uid", "v", "FI\0ELD").encode().is_err());
		assert!(TermFrequencyKey::new("r", "dt", "u\0id", "v", "FIELD").encode().is_err());
		let key = TermFrequencyKey::new("r", "dt", "uid", "v\0v", "FIELD").encode().unwrap();
		assert_eq!(key.cq, b"dt\0uid\0v\0v\0FIELD");
	}
}
