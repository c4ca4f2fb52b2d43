//! A recursive descent parser for boolean query expressions.
//!
//! Every production peeks at the next token and picks a path from it. Junction chains are
//! collected into a single n-ary node, so `A == 1 && B == 2 && C == 3` is one conjunction with
//! three children. Each nested production counts against a depth limit, and exceeding it is a
//! parse error rather than a stack overflow.

use crate::err::Error;
use crate::expr::{Assignment, Literal, MarkerKind, Node};
use crate::syn::lexer::Lexer;
use crate::syn::token::{Token, TokenKind};

/// Returns an error for a token which the current production cannot accept.
macro_rules! unexpected {
	($token:expr, $expected:expr) => {{
		let token: Token = $token;
		return Err(Error::InvalidQuery {
			offset: token.span.offset,
			message: format!("Unexpected {}, expected {}", token.kind, $expected),
		});
	}};
}

/// Consumes the next token, which must match the given pattern.
macro_rules! expected {
	($parser:expr, $kind:pat, $what:expr) => {{
		let token = $parser.next()?;
		if !matches!(token.kind, $kind) {
			unexpected!(token, $what)
		}
		token
	}};
}

pub struct Parser<'a> {
	lexer: Lexer<'a>,
	peeked: Option<Token>,
	depth: u32,
	max_depth: u32,
}

impl<'a> Parser<'a> {
	pub fn new(source: &'a str) -> Self {
		Parser {
			lexer: Lexer::new(source),
			peeked: None,
			depth: 0,
			max_depth: *crate::cnf::MAX_QUERY_DEPTH,
		}
	}

	/// Disallow a query from nesting deeper than the given limit.
	pub fn with_depth_limit(mut self, limit: u32) -> Self {
		self.max_depth = limit;
		self
	}

	#[allow(clippy::should_implement_trait)]
	pub fn next(&mut self) -> Result<Token, Error> {
		match self.peeked.take() {
			Some(t) => Ok(t),
			None => self.lexer.next_token(),
		}
	}

	pub fn peek(&mut self) -> Result<&Token, Error> {
		let token = match self.peeked.take() {
			Some(t) => t,
			None => self.lexer.next_token()?,
		};
		Ok(&*self.peeked.insert(token))
	}

	/// Consumes the next token if it has the given kind.
	pub fn eat(&mut self, kind: &TokenKind) -> Result<bool, Error> {
		if &self.peek()?.kind == kind {
			self.peeked = None;
			Ok(true)
		} else {
			Ok(false)
		}
	}

	/// Parses a complete query, which must consume all of the input.
	pub fn parse_query(&mut self) -> Result<Node, Error> {
		let node = self.parse_or()?;
		expected!(self, TokenKind::Eof, "end of query");
		Ok(node)
	}

	fn enter(&mut self, offset: usize) -> Result<(), Error> {
		if self.depth >= self.max_depth {
			return Err(Error::InvalidQuery {
				offset,
				message: format!("Query nesting exceeds the maximum depth of {}", self.max_depth),
			});
		}
		self.depth += 1;
		Ok(())
	}

	fn leave(&mut self) {
		self.depth = self.depth.saturating_sub(1);
	}

	fn parse_or(&mut self) -> Result<Node, Error> {
		let first = self.parse_and()?;
		if !self.eat(&TokenKind::Or)? {
			return Ok(first);
		}
		let mut nodes = vec![first, self.parse_and()?];
		while self.eat(&TokenKind::Or)? {
			nodes.push(self.parse_and()?);
		}
		Ok(Node::Or(nodes))
	}

	fn parse_and(&mut self) -> Result<Node, Error> {
		let first = self.parse_unary()?;
		if !self.eat(&TokenKind::And)? {
			return Ok(first);
		}
		let mut nodes = vec![first, self.parse_unary()?];
		while self.eat(&TokenKind::And)? {
			nodes.push(self.parse_unary()?);
		}
		Ok(Node::And(nodes))
	}

	fn parse_unary(&mut self) -> Result<Node, Error> {
		let offset = self.peek()?.span.offset;
		if self.eat(&TokenKind::Bang)? {
			self.enter(offset)?;
			let inner = self.parse_unary();
			self.leave();
			return Ok(Node::not(inner?));
		}
		self.parse_primary()
	}

	fn parse_primary(&mut self) -> Result<Node, Error> {
		let token = self.next()?;
		match token.kind {
			TokenKind::OpenParen => {
				self.enter(token.span.offset)?;
				let inner = self.parse_or();
				self.leave();
				let inner = inner?;
				expected!(self, TokenKind::CloseParen, "`)`");
				Ok(into_marker(inner))
			}
			TokenKind::Ident(name) => self.parse_ident(name),
			TokenKind::Str(_)
			| TokenKind::Int(_)
			| TokenKind::True
			| TokenKind::False
			| TokenKind::Null => Ok(Node::Literal(literal(token)?)),
			_ => unexpected!(token, "an expression"),
		}
	}

	fn parse_ident(&mut self, name: String) -> Result<Node, Error> {
		let kind = self.peek()?.kind.clone();
		match kind {
			TokenKind::Op(op) => {
				self.next()?;
				let value = literal(self.next()?)?;
				Ok(Node::compare(name, op, value))
			}
			TokenKind::Assign => {
				self.next()?;
				let value = literal(self.next()?)?;
				Ok(Node::Assignment(Assignment {
					name,
					value,
				}))
			}
			TokenKind::Colon => {
				self.next()?;
				let token = self.next()?;
				let TokenKind::Ident(function) = token.kind else {
					unexpected!(token, "a function name")
				};
				let open = expected!(self, TokenKind::OpenParen, "`(`");
				self.enter(open.span.offset)?;
				let args = self.parse_args();
				self.leave();
				Ok(Node::function(name, function, args?))
			}
			_ => Ok(Node::Identifier(name)),
		}
	}

	fn parse_args(&mut self) -> Result<Vec<Node>, Error> {
		let mut args = Vec::new();
		if self.eat(&TokenKind::CloseParen)? {
			return Ok(args);
		}
		loop {
			args.push(self.parse_or()?);
			if self.eat(&TokenKind::Comma)? {
				continue;
			}
			expected!(self, TokenKind::CloseParen, "`,` or `)`");
			return Ok(args);
		}
	}
}

fn literal(token: Token) -> Result<Literal, Error> {
	match token.kind {
		TokenKind::Str(v) => Ok(Literal::String(v)),
		TokenKind::Int(v) => Ok(Literal::Integer(v)),
		TokenKind::True => Ok(Literal::Bool(true)),
		TokenKind::False => Ok(Literal::Bool(false)),
		TokenKind::Null => Ok(Literal::Null),
		_ => unexpected!(token, "a literal"),
	}
}

/// Turns `((LABEL = true) && (SOURCE))` into a marker over `SOURCE`, or wraps anything else
/// in a reference.
fn into_marker(inner: Node) -> Node {
	if let Node::And(children) = &inner {
		if let [Node::Reference(label), Node::Reference(source)] = children.as_slice() {
			if let Node::Assignment(Assignment {
				name,
				value: Literal::Bool(true),
			}) = label.as_ref()
			{
				if let Some(kind) = MarkerKind::from_label(name) {
					return Node::marker(kind, source.as_ref().clone());
				}
			}
		}
	}
	Node::reference(inner)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::Operator;

	fn parse(source: &str) -> Node {
		Parser::new(source).parse_query().unwrap()
	}

	#[test]
	fn flattens_junctions() {
		assert_eq!(
			parse("A == '1' && B != 2 && !C =~ 'x.*'"),
			Node::And(vec![
				Node::eq("A", "1"),
				Node::ne("B", 2),
				Node::not(Node::er("C", "x.*")),
			])
		);
	}

	#[test]
	fn and_binds_tighter_than_or() {
		assert_eq!(
			parse("A == 1 || B == 2 && C == 3"),
			Node::Or(vec![
				Node::eq("A", 1),
				Node::And(vec![Node::eq("B", 2), Node::eq("C", 3)]),
			])
		);
	}

	#[test]
	fn parses_markers() {
		assert_eq!(
			parse("((_Bounded_ = true) && (NUM >= 1 && NUM <= 5))"),
			Node::marker(
				MarkerKind::BoundedRange,
				Node::And(vec![Node::ge("NUM", 1), Node::le("NUM", 5)])
			)
		);
		assert_eq!(
			parse("((_Hole_ = true) && (A == '1'))"),
			Node::marker(MarkerKind::Unrecognized("_Hole_".into()), Node::eq("A", "1"))
		);
		// An ordinary assignment is not a marker
		assert_eq!(
			parse("((X = true) && (A == '1'))"),
			Node::reference(Node::And(vec![
				Node::reference(Node::assign("X", true)),
				Node::reference(Node::eq("A", "1")),
			]))
		);
	}

	#[test]
	fn parses_functions() {
		assert_eq!(
			parse("content:phrase(TEXT, 'quick brown') && A <= 3"),
			Node::And(vec![
				Node::function(
					"content",
					"phrase",
					vec![Node::Identifier("TEXT".into()), Node::Literal("quick brown".into())]
				),
				Node::compare("A", Operator::LessThanOrEqual, 3),
			])
		);
		assert_eq!(parse("f:none()"), Node::function("f", "none", vec![]));
	}

	#[test]
	fn rejects_trailing_input() {
		assert!(matches!(
			Parser::new("A == 1 B").parse_query(),
			Err(Error::InvalidQuery {
				offset: 7,
				..
			})
		));
		assert!(Parser::new("A == ").parse_query().is_err());
		assert!(Parser::new("(A == 1").parse_query().is_err());
	}

	#[test]
	fn limits_depth() {
		let deep = format!("{}A == 1{}", "(".repeat(10), ")".repeat(10));
		assert!(Parser::new(&deep).with_depth_limit(20).parse_query().is_ok());
		assert!(Parser::new(&deep).with_depth_limit(5).parse_query().is_err());
		let nots = format!("{}A == 1", "!".repeat(10));
		assert!(Parser::new(&nots).with_depth_limit(5).parse_query().is_err());
	}
}
