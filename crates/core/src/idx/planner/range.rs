use std::collections::BTreeMap;

use crate::expr::{Literal, Node, Operator};

/// How successive bounds on the same field combine
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Junction {
	/// Every bound must hold, so updates narrow the range
	And,
	/// Any bound may hold, so updates widen the range
	Or,
}

/// The lower and upper bound of a single field.
///
/// Equality, hashing and ordering are structural over the field name, the bounds, the junction
/// and the inclusivity flags, in that order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LiteralRange<T> {
	field_name: Option<String>,
	lower: Option<T>,
	upper: Option<T>,
	operand: Junction,
	lower_inclusive: bool,
	upper_inclusive: bool,
}

impl<T: Ord> LiteralRange<T> {
	pub fn new(field_name: impl Into<String>, operand: Junction) -> Self {
		LiteralRange {
			field_name: Some(field_name.into()),
			..Self::unnamed(operand)
		}
	}

	/// A range which is not attached to any field yet
	pub fn unnamed(operand: Junction) -> Self {
		LiteralRange {
			field_name: None,
			lower: None,
			upper: None,
			operand,
			lower_inclusive: false,
			upper_inclusive: false,
		}
	}

	pub fn field_name(&self) -> Option<&str> {
		self.field_name.as_deref()
	}

	pub fn set_field_name(&mut self, field_name: impl Into<String>) {
		self.field_name = Some(field_name.into());
	}

	pub fn lower(&self) -> Option<&T> {
		self.lower.as_ref()
	}

	pub fn upper(&self) -> Option<&T> {
		self.upper.as_ref()
	}

	pub fn lower_inclusive(&self) -> bool {
		self.lower_inclusive
	}

	pub fn upper_inclusive(&self) -> bool {
		self.upper_inclusive
	}

	pub fn operand(&self) -> Junction {
		self.operand
	}

	/// Offers a new lower bound. The first bound is always adopted.
	pub fn update_lower(&mut self, candidate: T, inclusive: bool) {
		let adopt = match &self.lower {
			None => true,
			Some(current) => match self.operand {
				Junction::And => {
					candidate > *current
						|| (candidate == *current && self.lower_inclusive && !inclusive)
				}
				Junction::Or => {
					candidate < *current
						|| (candidate == *current && !self.lower_inclusive && inclusive)
				}
			},
		};
		if adopt {
			self.lower = Some(candidate);
			self.lower_inclusive = inclusive;
		}
	}

	/// Offers a new upper bound. The first bound is always adopted.
	pub fn update_upper(&mut self, candidate: T, inclusive: bool) {
		let adopt = match &self.upper {
			None => true,
			Some(current) => match self.operand {
				Junction::And => {
					candidate < *current
						|| (candidate == *current && self.upper_inclusive && !inclusive)
				}
				Junction::Or => {
					candidate > *current
						|| (candidate == *current && !self.upper_inclusive && inclusive)
				}
			},
		};
		if adopt {
			self.upper = Some(candidate);
			self.upper_inclusive = inclusive;
		}
	}

	/// Is there a field name, a lower bound and an upper bound?
	pub fn is_bounded(&self) -> bool {
		self.field_name.is_some() && self.lower.is_some() && self.upper.is_some()
	}

	/// Tests a value against both bounds. A missing bound does not restrict the value, but
	/// callers are expected to check [`LiteralRange::is_bounded`] first.
	pub fn contains(&self, value: &T) -> bool {
		let above = match &self.lower {
			Some(l) if self.lower_inclusive => value >= l,
			Some(l) => value > l,
			None => true,
		};
		let below = match &self.upper {
			Some(u) if self.upper_inclusive => value <= u,
			Some(u) => value < u,
			None => true,
		};
		above && below
	}

	/// Converts the bounds. `f` must preserve the order of the values.
	pub fn map<U: Ord>(self, mut f: impl FnMut(T) -> U) -> LiteralRange<U> {
		LiteralRange {
			field_name: self.field_name,
			lower: self.lower.map(&mut f),
			upper: self.upper.map(&mut f),
			operand: self.operand,
			lower_inclusive: self.lower_inclusive,
			upper_inclusive: self.upper_inclusive,
		}
	}
}

/// What [`RangeAccumulator::collect`] found in a junction
#[derive(Debug, Default)]
pub struct Accumulated {
	/// One range per field, ordered by field name
	pub ranges: Vec<LiteralRange<Literal>>,
	/// The children which are not range comparisons
	pub others: Vec<Node>,
}

/// Folds the range comparisons of a junction into per-field ranges
pub struct RangeAccumulator;

impl RangeAccumulator {
	/// Walks the direct children of a junction. A node which is not a junction is treated as a
	/// conjunction of one.
	pub fn collect(node: &Node) -> Accumulated {
		let (operand, children) = match node.unwrap_references() {
			Node::And(v) => (Junction::And, v.as_slice()),
			Node::Or(v) => (Junction::Or, v.as_slice()),
			other => (Junction::And, std::slice::from_ref(other)),
		};
		let mut ranges: BTreeMap<String, LiteralRange<Literal>> = BTreeMap::new();
		let mut others = Vec::new();
		for child in children {
			match child.unwrap_references() {
				Node::Compare(c) if !c.literal.is_null() => {
					let (upper, inclusive) = match c.op {
						Operator::LessThan => (true, false),
						Operator::LessThanOrEqual => (true, true),
						Operator::GreaterThan => (false, false),
						Operator::GreaterThanOrEqual => (false, true),
						_ => {
							others.push(child.clone());
							continue;
						}
					};
					let range = ranges
						.entry(c.field.clone())
						.or_insert_with(|| LiteralRange::new(c.field.clone(), operand));
					if upper {
						range.update_upper(c.literal.clone(), inclusive);
					} else {
						range.update_lower(c.literal.clone(), inclusive);
					}
				}
				_ => others.push(child.clone()),
			}
		}
		Accumulated {
			ranges: ranges.into_values().collect(),
			others,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Junction::And, false)]
	#[case(Junction::Or, true)]
	fn equal_lower_bounds(#[case] operand: Junction, #[case] expected: bool) {
		let mut range = LiteralRange::new("NUM", operand);
		range.update_lower(5, true);
		range.update_lower(5, false);
		assert_eq!(range.lower(), Some(&5));
		assert_eq!(range.lower_inclusive(), expected);
		// The same fold in the opposite order converges to the same bound
		let mut range = LiteralRange::new("NUM", operand);
		range.update_lower(5, false);
		range.update_lower(5, true);
		assert_eq!(range.lower_inclusive(), expected);
	}

	#[rstest]
	#[case(Junction::And, false)]
	#[case(Junction::Or, true)]
	fn equal_upper_bounds(#[case] operand: Junction, #[case] expected: bool) {
		let mut range = LiteralRange::new("NUM", operand);
		range.update_upper(9, true);
		range.update_upper(9, false);
		assert_eq!(range.upper(), Some(&9));
		assert_eq!(range.upper_inclusive(), expected);
	}

	#[test]
	fn and_narrows() {
		let mut range = LiteralRange::new("NUM", Junction::And);
		range.update_lower(1, true);
		range.update_lower(3, false);
		range.update_lower(2, true);
		range.update_upper(10, false);
		range.update_upper(7, true);
		range.update_upper(8, true);
		assert_eq!((range.lower(), range.upper()), (Some(&3), Some(&7)));
		assert!(!range.contains(&3));
		assert!(range.contains(&4));
		assert!(range.contains(&7));
		assert!(!range.contains(&8));
	}

	#[test]
	fn or_widens() {
		let mut range = LiteralRange::new("NUM", Junction::Or);
		range.update_lower(3, false);
		range.update_lower(1, true);
		range.update_lower(2, true);
		range.update_upper(7, true);
		range.update_upper(10, false);
		assert_eq!((range.lower(), range.upper()), (Some(&1), Some(&10)));
		assert!(range.contains(&1));
		assert!(!range.contains(&10));
	}

	#[test]
	fn bounded_requires_a_field() {
		let mut range = LiteralRange::unnamed(Junction::And);
		range.update_lower(1, true);
		range.update_upper(2, true);
		assert!(!range.is_bounded());
		range.set_field_name("NUM");
		assert!(range.is_bounded());
		assert_eq!(range.field_name(), Some("NUM"));
	}

	#[test]
	fn structural_ordering() {
		let mut a = LiteralRange::new("A", Junction::And);
		a.update_lower(1, true);
		let mut b = LiteralRange::new("B", Junction::And);
		b.update_lower(0, true);
		let mut c = a.clone();
		c.update_lower(2, true);
		let mut sorted = vec![b.clone(), c.clone(), a.clone()];
		sorted.sort();
		assert_eq!(sorted, vec![a, c, b]);
	}

	#[test]
	fn collects_per_field() {
		let node = Node::And(vec![
			Node::ge("NUM", 5),
			Node::eq("NAME", "bob"),
			Node::gt("NUM", 5),
			Node::lt("AGE", 30),
			Node::le("NUM", 10),
			Node::lt("NULL", crate::expr::Literal::Null),
		]);
		let acc = RangeAccumulator::collect(&node);
		assert_eq!(acc.ranges.len(), 2);
		let age = &acc.ranges[0];
		assert_eq!(age.field_name(), Some("AGE"));
		assert!(!age.is_bounded());
		let num = &acc.ranges[1];
		assert_eq!(num.lower(), Some(&Literal::Integer(5)));
		assert!(!num.lower_inclusive());
		assert_eq!(num.upper(), Some(&Literal::Integer(10)));
		assert!(num.upper_inclusive());
		assert_eq!(
			acc.others,
			vec![Node::eq("NAME", "bob"), Node::lt("NULL", crate::expr::Literal::Null)]
		);
	}

	#[test]
	fn collects_disjunctions() {
		let node = Node::Or(vec![Node::ge("NUM", 5), Node::gt("NUM", 5)]);
		let acc = RangeAccumulator::collect(&node);
		assert_eq!(acc.ranges[0].operand(), Junction::Or);
		assert!(acc.ranges[0].lower_inclusive());
	}
}
