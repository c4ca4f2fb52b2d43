//! Field-Index keys
//!
//! `{row} fi\0{field}:{value}\0{datatype}\0{uid}`
use crate::err::Error;
use crate::idx::planner::range::LiteralRange;
use crate::key::{Key, ScanRange, SEPARATOR, text};

const PREFIX: &[u8] = b"fi\0";

/// The uid of a field index entry.
///
/// A qualifier without the two separators still yields a uid, taken from after the last NUL
/// (or the whole qualifier), but it is reported as degraded so callers can tell it apart. A
/// uid which is not valid UTF-8 is degraded too, with the invalid bytes replaced.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Uid {
	Exact(String),
	Degraded(String),
}

impl Uid {
	pub fn as_str(&self) -> &str {
		match self {
			Uid::Exact(v) | Uid::Degraded(v) => v,
		}
	}

	pub fn into_string(self) -> String {
		match self {
			Uid::Exact(v) | Uid::Degraded(v) => v,
		}
	}

	pub fn is_degraded(&self) -> bool {
		matches!(self, Uid::Degraded(_))
	}
}

/// A decoded field index entry
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldIndexKey {
	pub row: Vec<u8>,
	pub field: String,
	pub value: String,
	pub datatype: String,
	pub uid: String,
}

pub fn is_instance(key: &Key) -> bool {
	key.cf.len() > PREFIX.len() && key.cf.starts_with(PREFIX)
}

fn malformed(key: &Key, reason: impl Into<String>) -> Error {
	Error::MalformedKey {
		key: key.sprint(),
		reason: reason.into(),
	}
}

/// Positions of the last two separators of the qualifier
fn separators(key: &Key) -> Result<(usize, usize), Error> {
	let cq = &key.cq;
	let last = cq.iter().rposition(|&b| b == SEPARATOR);
	let second = last.and_then(|l| cq[..l].iter().rposition(|&b| b == SEPARATOR));
	match (second, last) {
		(Some(s), Some(l)) => Ok((s, l)),
		_ => Err(malformed(
			key,
			format!(
				"expected 2 NUL separators in the column qualifier, found {}",
				usize::from(last.is_some())
			),
		)),
	}
}

/// The field name, taken from the column family
pub fn field(key: &Key) -> Result<String, Error> {
	if !is_instance(key) {
		return Err(malformed(key, "the column family is not a field index family"));
	}
	text(key, &key.cf[PREFIX.len()..])
}

/// The field value, which is everything before the second to last separator
pub fn value(key: &Key) -> Result<String, Error> {
	let (second, _) = separators(key)?;
	text(key, &key.cq[..second])
}

pub fn datatype(key: &Key) -> Result<String, Error> {
	let (second, last) = separators(key)?;
	text(key, &key.cq[second + 1..last])
}

/// The document uid. This never fails, see [`Uid`].
pub fn uid(key: &Key) -> Uid {
	let cq = &key.cq;
	let start = cq.iter().rposition(|&b| b == SEPARATOR).map_or(0, |l| l + 1);
	let exact = separators(key).is_ok();
	match std::str::from_utf8(&cq[start..]) {
		Ok(uid) if exact => Uid::Exact(uid.to_owned()),
		_ => {
			trace!(target: TARGET, key = %key.sprint(), "degraded uid parse");
			Uid::Degraded(String::from_utf8_lossy(&cq[start..]).into_owned())
		}
	}
}

const TARGET: &str = "shardscan::core::key::fi";

fn check(component: &'static str, value: &str) -> Result<(), Error> {
	if value.as_bytes().contains(&SEPARATOR) {
		return Err(Error::InvalidKeyComponent {
			component,
			reason: "it contains a NUL byte".to_owned(),
		});
	}
	Ok(())
}

impl FieldIndexKey {
	pub fn new(
		row: impl Into<Vec<u8>>,
		field: impl Into<String>,
		value: impl Into<String>,
		datatype: impl Into<String>,
		uid: impl Into<String>,
	) -> Self {
		FieldIndexKey {
			row: row.into(),
			field: field.into(),
			value: value.into(),
			datatype: datatype.into(),
			uid: uid.into(),
		}
	}

	pub fn encode(&self) -> Result<Key, Error> {
		if self.field.is_empty() {
			return Err(Error::InvalidKeyComponent {
				component: "field",
				reason: "it is empty".to_owned(),
			});
		}
		check("datatype", &self.datatype)?;
		check("uid", &self.uid)?;
		let mut cf = Vec::with_capacity(PREFIX.len() + self.field.len());
		cf.extend_from_slice(PREFIX);
		cf.extend_from_slice(self.field.as_bytes());
		let mut cq =
			Vec::with_capacity(self.value.len() + self.datatype.len() + self.uid.len() + 2);
		cq.extend_from_slice(self.value.as_bytes());
		cq.push(SEPARATOR);
		cq.extend_from_slice(self.datatype.as_bytes());
		cq.push(SEPARATOR);
		cq.extend_from_slice(self.uid.as_bytes());
		Ok(Key {
			row: self.row.clone(),
			cf,
			cq,
		})
	}

	pub fn decode(key: &Key) -> Result<Self, Error> {
		let field = field(key)?;
		let (second, last) = separators(key)?;
		Ok(FieldIndexKey {
			row: key.row.clone(),
			field,
			value: text(key, &key.cq[..second])?,
			datatype: text(key, &key.cq[second + 1..last])?,
			uid: text(key, &key.cq[last + 1..])?,
		})
	}
}

/// Builds the single seek range covering every entry of `field` whose value lies in `range`.
///
/// A value may contain NUL bytes, so the qualifiers of `v` and of `v\0...` interleave and no
/// key range holds exactly the values in `range`. The seek starts at the lower bound itself
/// and ends past every qualifier starting with an inclusive upper bound, which covers them
/// all. Scanned keys are then checked with [`accepts`]. Returns `None` when the range is not
/// bounded, or when it cannot contain any value.
pub fn seek_range(row: &[u8], field: &str, range: &LiteralRange<String>) -> Option<ScanRange> {
	let (lower, upper) = match (range.lower(), range.upper()) {
		(Some(l), Some(u)) if range.is_bounded() => (l, u),
		_ => return None,
	};
	if lower > upper
		|| (lower == upper && !(range.lower_inclusive() && range.upper_inclusive()))
	{
		return None;
	}
	let mut cf = PREFIX.to_vec();
	cf.extend_from_slice(field.as_bytes());
	// Every qualifier for a value `v`, or `v` followed by more bytes, sorts at or after `v`
	let start = lower.as_bytes().to_vec();
	let mut end = upper.as_bytes().to_vec();
	end.push(if range.upper_inclusive() { SEPARATOR + 1 } else { SEPARATOR });
	Some(ScanRange {
		start: Key::new(row, cf.clone(), start),
		end: Key::new(row, cf, end),
	})
}

/// Is `key` a field index entry of `field` whose value lies in `range`?
pub fn accepts(key: &Key, field: &str, range: &LiteralRange<String>) -> bool {
	if !is_instance(key) || key.cf[PREFIX.len()..] != *field.as_bytes() {
		return false;
	}
	value(key).is_ok_and(|v| range.contains(&v))
}
