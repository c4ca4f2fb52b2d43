use std::collections::HashMap;

use crate::err::Error;
use crate::expr::Node;
use crate::idx::planner::cost::CostComparator;

/// Rebuilds a tree with the children of every junction sorted from cheapest to most expensive.
///
/// Children are ordered before their parent is sorted, so the result does not depend on the
/// order of the input at any level. Function calls and markers are returned as they are.
pub fn order(node: Node, cmp: &CostComparator) -> Result<Node, Error> {
	match node {
		Node::Script(v) => Ok(Node::Script(Box::new(order(*v, cmp)?))),
		Node::Reference(v) => Ok(Node::Reference(Box::new(order(*v, cmp)?))),
		Node::Not(v) => Ok(Node::Not(Box::new(order(*v, cmp)?))),
		Node::And(v) => Ok(Node::And(cmp.sort(children(v, cmp)?)?)),
		Node::Or(v) => Ok(Node::Or(cmp.sort(children(v, cmp)?)?)),
		Node::Unknown(kind) => Err(Error::UnsupportedNode(kind)),
		Node::Function(_)
		| Node::Marker(_)
		| Node::Compare(_)
		| Node::Assignment(_)
		| Node::Identifier(_)
		| Node::Literal(_) => Ok(node),
	}
}

fn children(nodes: Vec<Node>, cmp: &CostComparator) -> Result<Vec<Node>, Error> {
	nodes.into_iter().map(|n| order(n, cmp)).collect()
}

/// Orders a tree using occurrence counts keyed by field name
pub fn order_by_field_count(node: Node, counts: &HashMap<String, u64>) -> Result<Node, Error> {
	order(node, &CostComparator::with_field_counts(counts.clone()))
}

/// Orders a tree using occurrence counts keyed by rendered term
pub fn order_by_term_count(node: Node, counts: &HashMap<String, u64>) -> Result<Node, Error> {
	order(node, &CostComparator::with_term_counts(counts.clone()))
}
