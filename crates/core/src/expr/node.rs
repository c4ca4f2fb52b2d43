use crate::expr::{Literal, MarkerKind, Operator};

/// A node of a boolean query tree
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Node {
	/// The root of a parsed query
	Script(Box<Node>),
	/// A parenthesised sub-expression
	Reference(Box<Node>),
	/// A leaf comparing a field with a literal
	Compare(Comparison),
	And(Vec<Node>),
	Or(Vec<Node>),
	Not(Box<Node>),
	/// A namespaced function call, for example `content:phrase(TEXT, 'quick brown')`
	Function(Function),
	/// `NAME = literal`
	Assignment(Assignment),
	/// A subtree tagged with a query property
	Marker(Marker),
	/// A bare identifier
	Identifier(String),
	/// A bare literal value
	Literal(Literal),
	/// A node kind produced by a foreign tree builder which no planning pass understands
	Unknown(String),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Comparison {
	pub op: Operator,
	pub field: String,
	pub literal: Literal,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Function {
	pub namespace: String,
	pub name: String,
	pub args: Vec<Node>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Assignment {
	pub name: String,
	pub value: Literal,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Marker {
	pub kind: MarkerKind,
	pub source: Box<Node>,
}

impl Node {
	pub fn compare(field: impl Into<String>, op: Operator, literal: impl Into<Literal>) -> Node {
		Node::Compare(Comparison {
			op,
			field: field.into(),
			literal: literal.into(),
		})
	}

	pub fn eq(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::Equal, literal)
	}

	pub fn ne(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::NotEqual, literal)
	}

	pub fn lt(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::LessThan, literal)
	}

	pub fn le(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::LessThanOrEqual, literal)
	}

	pub fn gt(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::GreaterThan, literal)
	}

	pub fn ge(field: impl Into<String>, literal: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::GreaterThanOrEqual, literal)
	}

	pub fn er(field: impl Into<String>, pattern: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::RegexMatch, pattern)
	}

	pub fn nr(field: impl Into<String>, pattern: impl Into<Literal>) -> Node {
		Node::compare(field, Operator::RegexNotMatch, pattern)
	}

	pub fn not(node: Node) -> Node {
		Node::Not(Box::new(node))
	}

	pub fn reference(node: Node) -> Node {
		Node::Reference(Box::new(node))
	}

	pub fn marker(kind: MarkerKind, source: Node) -> Node {
		Node::Marker(Marker {
			kind,
			source: Box::new(source),
		})
	}

	pub fn function(namespace: impl Into<String>, name: impl Into<String>, args: Vec<Node>) -> Node {
		Node::Function(Function {
			namespace: namespace.into(),
			name: name.into(),
			args,
		})
	}

	pub fn assign(name: impl Into<String>, value: impl Into<Literal>) -> Node {
		Node::Assignment(Assignment {
			name: name.into(),
			value: value.into(),
		})
	}

	/// A short name for the kind of this node, used in diagnostics
	pub fn kind_name(&self) -> &str {
		match self {
			Node::Script(_) => "script",
			Node::Reference(_) => "reference",
			Node::Compare(_) => "comparison",
			Node::And(_) => "and",
			Node::Or(_) => "or",
			Node::Not(_) => "not",
			Node::Function(_) => "function",
			Node::Assignment(_) => "assignment",
			Node::Marker(_) => "marker",
			Node::Identifier(_) => "identifier",
			Node::Literal(_) => "literal",
			Node::Unknown(kind) => kind,
		}
	}

	/// Is this node a conjunction or a disjunction?
	pub fn is_junction(&self) -> bool {
		matches!(self, Node::And(_) | Node::Or(_))
	}

	/// Strips any number of enclosing references
	pub fn unwrap_references(&self) -> &Node {
		let mut node = self;
		while let Node::Reference(inner) = node {
			node = inner;
		}
		node
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn helpers_build_comparisons() {
		assert_eq!(
			Node::le("AGE", 30),
			Node::Compare(Comparison {
				op: Operator::LessThanOrEqual,
				field: "AGE".to_owned(),
				literal: Literal::Integer(30),
			})
		);
	}

	#[test]
	fn references_are_stripped() {
		let n = Node::reference(Node::reference(Node::eq("A", "1")));
		assert_eq!(n.unwrap_references(), &Node::eq("A", "1"));
		assert_eq!(n.kind_name(), "reference");
	}
}
