use std::cmp::Ordering;
use std::collections::HashMap;

use crate::err::Error;
use crate::expr::{MarkerKind, Node, Operator};

/// Rank of a function call
pub const FUNCTION_RANK: u64 = 9;
/// Rank of a marker which is only evaluated against documents
pub const EVALUATION_RANK: u64 = 10;
/// Rank of a negation
pub const NOT_RANK: u64 = 11;
/// Rank of assignments, bare identifiers and bare literals
pub const OTHER_RANK: u64 = 12;

/// The static rank of a comparison operator. Lower ranks are cheaper to scan.
pub fn operator_rank(op: Operator) -> u64 {
	match op {
		Operator::Equal => 1,
		Operator::NotEqual => 2,
		Operator::LessThan => 3,
		Operator::GreaterThan => 4,
		Operator::LessThanOrEqual => 5,
		Operator::GreaterThanOrEqual => 6,
		Operator::RegexMatch => 7,
		Operator::RegexNotMatch => 8,
	}
}

/// Is this a marker the index can answer, so that it costs what its source costs?
pub(crate) fn is_indexable(kind: &MarkerKind) -> bool {
	matches!(
		kind,
		MarkerKind::BoundedRange
			| MarkerKind::ExceededOr
			| MarkerKind::ExceededTerm
			| MarkerKind::ExceededValue
	)
}

/// Where leaf costs come from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CostSource {
	/// The static rank of each node kind
	#[default]
	Static,
	/// Occurrence counts keyed by field name
	FieldCounts(HashMap<String, u64>),
	/// Occurrence counts keyed by the rendered leaf, for example `NAME == 'bob'`
	TermCounts(HashMap<String, u64>),
}

/// Orders query subtrees by their estimated scan cost.
///
/// Nodes compare by cost first, markers after everything else of the same cost, and by their
/// rendered text last. Two nodes only compare equal when they render identically.
#[derive(Clone, Debug, Default)]
pub struct CostComparator {
	source: CostSource,
}

impl CostComparator {
	pub fn new(source: CostSource) -> Self {
		CostComparator {
			source,
		}
	}

	pub fn with_field_counts(counts: HashMap<String, u64>) -> Self {
		Self::new(CostSource::FieldCounts(counts))
	}

	pub fn with_term_counts(counts: HashMap<String, u64>) -> Self {
		Self::new(CostSource::TermCounts(counts))
	}

	pub fn source(&self) -> &CostSource {
		&self.source
	}

	/// The count of a leaf comparison, if the source knows one
	fn count(&self, node: &Node, field: &str) -> Option<u64> {
		match &self.source {
			CostSource::Static => None,
			CostSource::FieldCounts(counts) => counts.get(field).copied(),
			CostSource::TermCounts(counts) => counts.get(&node.to_string()).copied(),
		}
	}

	/// The cost of a leaf comparison
	fn leaf(&self, node: &Node, field: &str, op: Operator) -> u64 {
		self.count(node, field).unwrap_or_else(|| operator_rank(op))
	}

	/// The largest count known to the source
	fn max_count(&self) -> Option<u64> {
		match &self.source {
			CostSource::Static => None,
			CostSource::FieldCounts(counts) | CostSource::TermCounts(counts) => {
				counts.values().copied().max()
			}
		}
	}

	/// Does every comparison below `node` have a count? Always true for static costs.
	fn is_counted(&self, node: &Node) -> bool {
		if matches!(self.source, CostSource::Static) {
			return true;
		}
		match node {
			Node::Script(v) | Node::Reference(v) | Node::Not(v) => self.is_counted(v),
			Node::Compare(c) => self.count(node, &c.field).is_some(),
			Node::And(v) | Node::Or(v) => v.iter().all(|n| self.is_counted(n)),
			Node::Marker(m) => self.is_counted(&m.source),
			_ => true,
		}
	}

	/// An indexable marker costs what its source costs. With counts, a source holding an
	/// uncounted comparison costs at least as much as the most frequent counted one.
	fn marker(&self, source: &Node) -> Result<u64, Error> {
		let cost = self.cost(source)?;
		if self.is_counted(source) {
			return Ok(cost);
		}
		Ok(self.max_count().map_or(cost, |max| cost.max(max)))
	}

	/// Estimates the cost of a subtree.
	///
	/// A conjunction is as cheap as its cheapest child, since one anchor is enough to drive the
	/// scan, while a disjunction has to scan every child.
	pub fn cost(&self, node: &Node) -> Result<u64, Error> {
		match node {
			Node::Script(v) | Node::Reference(v) => self.cost(v),
			Node::Compare(c) => Ok(self.leaf(node, &c.field, c.op)),
			Node::And(v) => {
				let mut min: Option<u64> = None;
				for n in v {
					let c = self.cost(n)?;
					min = Some(min.map_or(c, |m| m.min(c)));
				}
				Ok(min.unwrap_or(0))
			}
			Node::Or(v) => {
				let mut sum: u64 = 0;
				for n in v {
					sum = sum.saturating_add(self.cost(n)?);
				}
				Ok(sum)
			}
			Node::Not(_) => Ok(NOT_RANK),
			Node::Function(_) => Ok(FUNCTION_RANK),
			Node::Marker(m) if is_indexable(&m.kind) => self.marker(&m.source),
			Node::Marker(_) => Ok(EVALUATION_RANK),
			Node::Assignment(_) | Node::Identifier(_) | Node::Literal(_) => Ok(OTHER_RANK),
			Node::Unknown(kind) => Err(Error::UnsupportedNode(kind.clone())),
		}
	}

	/// The sort key of a subtree. Markers sort after other nodes of the same cost.
	pub fn key(&self, node: &Node) -> Result<(u64, bool, String), Error> {
		let marker = matches!(node.unwrap_references(), Node::Marker(_));
		Ok((self.cost(node)?, marker, node.to_string()))
	}

	pub fn compare(&self, a: &Node, b: &Node) -> Result<Ordering, Error> {
		Ok(self.key(a)?.cmp(&self.key(b)?))
	}

	/// Sorts sibling nodes from cheapest to most expensive
	pub fn sort(&self, nodes: Vec<Node>) -> Result<Vec<Node>, Error> {
		let mut keyed = nodes
			.into_iter()
			.map(|n| self.key(&n).map(|k| (k, n)))
			.collect::<Result<Vec<_>, Error>>()?;
		keyed.sort_by(|a, b| a.0.cmp(&b.0));
		Ok(keyed.into_iter().map(|(_, n)| n).collect())
	}
}
