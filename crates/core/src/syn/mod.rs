//! The lexer and parser for boolean query expressions.

pub mod lexer;
pub mod parser;
pub mod token;

use crate::err::Error;
use crate::expr::Node;
use parser::Parser;

/// Parses a query into a [`Node::Script`] tree.
///
/// Nested parentheses, negations and function calls count against
/// [`MAX_QUERY_DEPTH`](crate::cnf::MAX_QUERY_DEPTH). If the limit is reached, parsing returns
/// [`Error::InvalidQuery`] instead of recursing further.
pub fn parse(input: &str) -> Result<Node, Error> {
	debug!(target: TARGET, "parsing query, input = {input}");
	let node = Parser::new(input).parse_query()?;
	Ok(Node::Script(Box::new(node)))
}

/// Parses a single expression without the script wrapper.
pub fn expr(input: &str) -> Result<Node, Error> {
	Parser::new(input).parse_query()
}

const TARGET: &str = "shardscan::core::syn";

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wraps_in_a_script() {
		let node = parse("A == '1'").unwrap();
		assert_eq!(node, Node::Script(Box::new(Node::eq("A", "1"))));
		assert_eq!(node.to_string(), "A == '1'");
	}

	#[test]
	fn rendering_parses_back() {
		let source = "A == '1' && (B > 2 || !(C =~ 'x\\'y')) && ((_Value_ = true) && (D =~ 'd.*'))";
		let node = expr(source).unwrap();
		assert_eq!(expr(&node.to_string()).unwrap(), node);
	}
}
