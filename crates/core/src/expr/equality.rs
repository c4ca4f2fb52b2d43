use crate::expr::{Function, Marker, Node};

/// Returns the canonical form of a tree, in which the children of every junction are sorted
/// by their own canonical rendering. Function arguments keep their order.
pub fn canonical(node: &Node) -> Node {
	match node {
		Node::Script(v) => Node::Script(Box::new(canonical(v))),
		Node::Reference(v) => Node::Reference(Box::new(canonical(v))),
		Node::Not(v) => Node::Not(Box::new(canonical(v))),
		Node::And(v) => Node::And(sorted(v)),
		Node::Or(v) => Node::Or(sorted(v)),
		Node::Function(f) => Node::Function(Function {
			namespace: f.namespace.clone(),
			name: f.name.clone(),
			args: f.args.iter().map(canonical).collect(),
		}),
		Node::Marker(m) => Node::Marker(Marker {
			kind: m.kind.clone(),
			source: Box::new(canonical(&m.source)),
		}),
		Node::Compare(_)
		| Node::Assignment(_)
		| Node::Identifier(_)
		| Node::Literal(_)
		| Node::Unknown(_) => node.clone(),
	}
}

fn sorted(nodes: &[Node]) -> Vec<Node> {
	let mut keyed: Vec<(String, Node)> = nodes
		.iter()
		.map(|n| {
			let c = canonical(n);
			(c.to_string(), c)
		})
		.collect();
	keyed.sort_by(|a, b| a.0.cmp(&b.0));
	keyed.into_iter().map(|(_, n)| n).collect()
}

/// Checks whether two trees are the same up to the order of junction children
pub fn equivalent(a: &Node, b: &Node) -> bool {
	canonical(a) == canonical(b)
}
