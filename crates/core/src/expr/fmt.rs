use std::fmt::{self, Display, Formatter, Write};

use crate::expr::{Assignment, Comparison, Function, Literal, Marker, Node};

/// Writes a string literal between single quotes, escaping quotes and backslashes
fn quote(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
	f.write_char('\'')?;
	for c in s.chars() {
		if c == '\'' || c == '\\' {
			f.write_char('\\')?;
		}
		f.write_char(c)?;
	}
	f.write_char('\'')
}

/// Writes a junction child, wrapping nested junctions in parentheses
fn operand(f: &mut Formatter<'_>, node: &Node) -> fmt::Result {
	if node.is_junction() {
		write!(f, "({node})")
	} else {
		Display::fmt(node, f)
	}
}

fn junction(f: &mut Formatter<'_>, nodes: &[Node], sep: &str) -> fmt::Result {
	for (i, n) in nodes.iter().enumerate() {
		if i > 0 {
			f.write_str(sep)?;
		}
		operand(f, n)?;
	}
	Ok(())
}

impl Display for Literal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Literal::Null => f.write_str("null"),
			Literal::Bool(v) => write!(f, "{v}"),
			Literal::Integer(v) => write!(f, "{v}"),
			Literal::String(v) => quote(f, v),
		}
	}
}

impl Display for Comparison {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {}", self.field, self.op, self.literal)
	}
}

impl Display for Function {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}(", self.namespace, self.name)?;
		for (i, a) in self.args.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			Display::fmt(a, f)?;
		}
		f.write_char(')')
	}
}

impl Display for Assignment {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} = {}", self.name, self.value)
	}
}

impl Display for Marker {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "(({} = true) && ({}))", self.kind.label(), self.source)
	}
}

impl Display for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Node::Script(v) => Display::fmt(v, f),
			Node::Reference(v) => write!(f, "({v})"),
			Node::Compare(v) => Display::fmt(v, f),
			Node::And(v) => junction(f, v, " && "),
			Node::Or(v) => junction(f, v, " || "),
			Node::Not(v) => {
				f.write_char('!')?;
				operand(f, v)
			}
			Node::Function(v) => Display::fmt(v, f),
			Node::Assignment(v) => Display::fmt(v, f),
			Node::Marker(v) => Display::fmt(v, f),
			Node::Identifier(v) => f.write_str(v),
			Node::Literal(v) => Display::fmt(v, f),
			Node::Unknown(v) => write!(f, "<{v}>"),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::expr::{MarkerKind, Node};

	#[test]
	fn comparisons() {
		assert_eq!(Node::eq("A", "1").to_string(), "A == '1'");
		assert_eq!(Node::ge("AGE", 21).to_string(), "AGE >= 21");
		assert_eq!(Node::ne("A", crate::expr::Literal::Null).to_string(), "A != null");
		assert_eq!(Node::er("C", "it's\\d").to_string(), "C =~ 'it\\'s\\\\d'");
	}

	#[test]
	fn junctions() {
		let n = Node::And(vec![
			Node::eq("A", "1"),
			Node::Or(vec![Node::eq("B", "2"), Node::eq("C", "3")]),
			Node::not(Node::Or(vec![Node::eq("D", "4")])),
		]);
		assert_eq!(n.to_string(), "A == '1' && (B == '2' || C == '3') && !(D == '4')");
	}

	#[test]
	fn functions_and_markers() {
		let f = Node::function(
			"content",
			"phrase",
			vec![Node::Identifier("TEXT".into()), Node::Literal("quick brown".into())],
		);
		assert_eq!(f.to_string(), "content:phrase(TEXT, 'quick brown')");
		let m = Node::marker(
			MarkerKind::BoundedRange,
			Node::And(vec![Node::gt("A", "1"), Node::lt("A", "5")]),
		);
		assert_eq!(m.to_string(), "((_Bounded_ = true) && (A > '1' && A < '5'))");
	}
}
