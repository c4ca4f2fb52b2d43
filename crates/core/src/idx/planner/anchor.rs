use std::collections::HashSet;

use crate::err::Error;
use crate::expr::{MarkerKind, Node, Operator};

const TARGET: &str = "shardscan::core::idx::planner::anchor";

/// Provides the fields which the index can answer for
pub trait IndexedFields {
	/// Is the field indexed alongside the document?
	fn is_indexed(&self, field: &str) -> bool;
	/// Is the field only present in the index?
	fn is_index_only(&self, field: &str) -> bool;
}

/// An in-memory [`IndexedFields`] provider
#[derive(Clone, Debug, Default)]
pub struct FieldSets {
	indexed: HashSet<String>,
	index_only: HashSet<String>,
}

impl FieldSets {
	pub fn new<I, J, S, T>(indexed: I, index_only: J) -> Self
	where
		I: IntoIterator<Item = S>,
		J: IntoIterator<Item = T>,
		S: Into<String>,
		T: Into<String>,
	{
		FieldSets {
			indexed: indexed.into_iter().map(Into::into).collect(),
			index_only: index_only.into_iter().map(Into::into).collect(),
		}
	}
}

impl IndexedFields for FieldSets {
	fn is_indexed(&self, field: &str) -> bool {
		self.indexed.contains(field)
	}

	fn is_index_only(&self, field: &str) -> bool {
		self.index_only.contains(field)
	}
}

/// The marker kinds which are anchors by construction
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerTable {
	anchors: HashSet<MarkerKind>,
}

impl Default for MarkerTable {
	fn default() -> Self {
		Self::new([
			MarkerKind::BoundedRange,
			MarkerKind::ExceededOr,
			MarkerKind::ExceededTerm,
			MarkerKind::ExceededValue,
		])
	}
}

impl MarkerTable {
	pub fn new(anchors: impl IntoIterator<Item = MarkerKind>) -> Self {
		MarkerTable {
			anchors: anchors.into_iter().collect(),
		}
	}

	pub fn is_anchor(&self, kind: &MarkerKind) -> bool {
		self.anchors.contains(kind)
	}
}

/// Decides which subtrees a range scan over the index can satisfy on its own
pub struct AnchorDetector<'a> {
	fields: &'a dyn IndexedFields,
	markers: MarkerTable,
}

impl<'a> AnchorDetector<'a> {
	pub fn new(fields: &'a dyn IndexedFields) -> Self {
		Self::with_markers(fields, MarkerTable::default())
	}

	pub fn with_markers(fields: &'a dyn IndexedFields, markers: MarkerTable) -> Self {
		AnchorDetector {
			fields,
			markers,
		}
	}

	/// Is the subtree an anchor?
	///
	/// Negations and assignments never are. A disjunction is an anchor when every child is,
	/// and a conjunction when at least one child is, since the others can be filtered after the
	/// scan. A function call is never an anchor.
	pub fn is_anchor(&self, node: &Node) -> Result<bool, Error> {
		let anchor = match node {
			Node::Script(v) | Node::Reference(v) => return self.is_anchor(v),
			Node::Not(_) | Node::Assignment(_) => false,
			Node::Or(v) => {
				if v.is_empty() {
					false
				} else {
					let mut all = true;
					for n in v {
						if !self.is_anchor(n)? {
							all = false;
							break;
						}
					}
					all
				}
			}
			Node::And(v) => {
				let mut any = false;
				for n in v {
					if self.is_anchor(n)? {
						any = true;
						break;
					}
				}
				any
			}
			Node::Marker(m) => self.markers.is_anchor(&m.kind),
			Node::Compare(c) => {
				let indexed =
					self.fields.is_indexed(&c.field) || self.fields.is_index_only(&c.field);
				match c.op {
					Operator::Equal | Operator::NotEqual => indexed && !c.literal.is_null(),
					_ => indexed,
				}
			}
			Node::Function(_) | Node::Identifier(_) | Node::Literal(_) => false,
			Node::Unknown(kind) => return Err(Error::UnsupportedNode(kind.clone())),
		};
		trace!(target: TARGET, kind = node.kind_name(), anchor, "anchor decision");
		Ok(anchor)
	}
}
