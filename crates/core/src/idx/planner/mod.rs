//! Plans a boolean query against the field index.
//!
//! Planning runs in three steps over an owned tree:
//!
//! 1. the [`AnchorDetector`] checks that at least one part of the query can drive an index
//!    scan,
//! 2. [`order`] sorts every junction from cheapest to most expensive with a
//!    [`CostComparator`],
//! 3. the [`RangeAccumulator`] folds every bounded-range marker into a single [`SeekRange`].
pub mod anchor;
pub mod cost;
pub mod order;
pub mod range;

pub use anchor::{AnchorDetector, FieldSets, IndexedFields, MarkerTable};
pub use cost::{CostComparator, CostSource};
pub use order::{order, order_by_field_count, order_by_term_count};
pub use range::{Accumulated, Junction, LiteralRange, RangeAccumulator};

use crate::err::Error;
use crate::expr::{Literal, MarkerKind, Node};
use crate::key::{Key, ScanRange, fi};

const TARGET: &str = "shardscan::core::idx::planner";

/// A merged range over one field, which can be scanned with a single seek
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SeekRange {
	pub range: LiteralRange<Literal>,
}

impl SeekRange {
	pub fn field(&self) -> &str {
		self.range.field_name().unwrap_or_default()
	}

	fn strings(&self) -> Option<LiteralRange<String>> {
		match (self.range.lower(), self.range.upper()) {
			(Some(Literal::String(_)), Some(Literal::String(_))) => {
				Some(self.range.clone().map(|l| match l {
					Literal::String(s) => s,
					other => other.to_string(),
				}))
			}
			_ => None,
		}
	}

	/// The field index keys to scan within `row`. Every scanned key still has to pass
	/// [`accepts`](Self::accepts).
	///
	/// Only string bounds map onto field index values, so any other bound yields `None`.
	pub fn scan_range(&self, row: &[u8]) -> Option<ScanRange> {
		fi::seek_range(row, self.field(), &self.strings()?)
	}

	/// Is `key` a field index entry of this field with a value inside the range?
	pub fn accepts(&self, key: &Key) -> bool {
		self.strings().is_some_and(|range| fi::accepts(key, self.field(), &range))
	}
}

/// The outcome of planning a query
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
	/// The cost-ordered query tree
	pub tree: Node,
	/// One seek range per bounded-range marker
	pub seek_ranges: Vec<SeekRange>,
}

pub struct QueryPlanner<'a> {
	fields: &'a dyn IndexedFields,
	markers: MarkerTable,
	costs: CostComparator,
}

impl<'a> QueryPlanner<'a> {
	pub fn new(fields: &'a dyn IndexedFields) -> Self {
		QueryPlanner {
			fields,
			markers: MarkerTable::default(),
			costs: CostComparator::default(),
		}
	}

	pub fn with_markers(mut self, markers: MarkerTable) -> Self {
		self.markers = markers;
		self
	}

	pub fn with_cost_source(mut self, source: CostSource) -> Self {
		self.costs = CostComparator::new(source);
		self
	}

	pub fn plan(&self, node: Node) -> Result<QueryPlan, Error> {
		let detector = AnchorDetector::with_markers(self.fields, self.markers.clone());
		if !detector.is_anchor(&node)? {
			return Err(Error::NotExecutable(node.to_string()));
		}
		let tree = order(node, &self.costs)?;
		let mut seek_ranges = Vec::new();
		collect_seek_ranges(&tree, &mut seek_ranges);
		debug!(target: TARGET, query = %tree, ranges = seek_ranges.len(), "planned query");
		Ok(QueryPlan {
			tree,
			seek_ranges,
		})
	}
}

/// Gathers the bounded ranges of every bounded-range marker reachable through junctions
fn collect_seek_ranges(node: &Node, out: &mut Vec<SeekRange>) {
	match node {
		Node::Script(v) | Node::Reference(v) => collect_seek_ranges(v, out),
		Node::And(v) | Node::Or(v) => v.iter().for_each(|n| collect_seek_ranges(n, out)),
		Node::Marker(m) if m.kind == MarkerKind::BoundedRange => {
			let acc = RangeAccumulator::collect(&m.source);
			out.extend(acc.ranges.into_iter().filter(LiteralRange::is_bounded).map(|range| {
				SeekRange {
					range,
				}
			}));
		}
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::syn;

	fn fields() -> FieldSets {
		FieldSets::new(["NAME", "DATE"], Vec::<String>::new())
	}

	#[test]
	fn plans_bounded_ranges() {
		let f = fields();
		let planner = QueryPlanner::new(&f);
		let query = syn::parse(
			"COLOR == 'red' && ((_Bounded_ = true) && (DATE <= '20240131' && DATE >= '20240101')) && NAME == 'bob'",
		)
		.unwrap();
		let plan = planner.plan(query).unwrap();
		assert_eq!(
			plan.tree.to_string(),
			"COLOR == 'red' && NAME == 'bob' && ((_Bounded_ = true) && (DATE <= '20240131' && DATE >= '20240101'))"
		);
		assert_eq!(plan.seek_ranges.len(), 1);
		let seek = &plan.seek_ranges[0];
		assert_eq!(seek.field(), "DATE");
		let scan = seek.scan_range(b"shard_1").unwrap();
		let inside = fi::FieldIndexKey::new("shard_1", "DATE", "20240115", "dt", "uid")
			.encode()
			.unwrap();
		assert!(scan.contains(&inside));
		assert!(seek.accepts(&inside));
		let outside = fi::FieldIndexKey::new("shard_1", "DATE", "20240201", "dt", "uid")
			.encode()
			.unwrap();
		assert!(!seek.accepts(&outside));
	}

	#[test]
	fn rejects_queries_without_anchors() {
		let f = fields();
		let planner = QueryPlanner::new(&f);
		let query = syn::parse("COLOR == 'red' || NAME == 'bob'").unwrap();
		assert!(matches!(planner.plan(query), Err(Error::NotExecutable(_))));
		let query = syn::parse("!(NAME == 'bob')").unwrap();
		assert!(matches!(planner.plan(query), Err(Error::NotExecutable(_))));
	}

	#[test]
	fn integer_ranges_have_no_scan_range() {
		let f = fields();
		let planner = QueryPlanner::new(&f);
		let query = syn::parse("((_Bounded_ = true) && (DATE > 1 && DATE < 9))").unwrap();
		let plan = planner.plan(query).unwrap();
		assert_eq!(plan.seek_ranges.len(), 1);
		assert!(plan.seek_ranges[0].scan_range(b"r").is_none());
	}

	#[test]
	fn uses_the_cost_source() {
		let f = fields();
		let counts = std::collections::HashMap::from([("NAME".to_owned(), 1_000_000)]);
		let planner = QueryPlanner::new(&f).with_cost_source(CostSource::FieldCounts(counts));
		let plan = planner.plan(syn::expr("NAME == 'bob' && DATE =~ '2024.*'").unwrap()).unwrap();
		assert_eq!(plan.tree.to_string(), "DATE =~ '2024.*' && NAME == 'bob'");
	}
}
