use std::fmt;

use crate::expr::Operator;

/// A byte range within the parsed source
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
	pub offset: usize,
	pub len: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
	Ident(String),
	Str(String),
	Int(i64),
	True,
	False,
	Null,
	/// A comparison operator
	Op(Operator),
	/// `=`
	Assign,
	/// `&&`
	And,
	/// `||`
	Or,
	/// `!`
	Bang,
	OpenParen,
	CloseParen,
	Comma,
	Colon,
	Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub span: Span,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenKind::Ident(v) => write!(f, "identifier `{v}`"),
			TokenKind::Str(_) => f.write_str("a string"),
			TokenKind::Int(v) => write!(f, "integer `{v}`"),
			TokenKind::True => f.write_str("`true`"),
			TokenKind::False => f.write_str("`false`"),
			TokenKind::Null => f.write_str("`null`"),
			TokenKind::Op(op) => write!(f, "`{op}`"),
			TokenKind::Assign => f.write_str("`=`"),
			TokenKind::And => f.write_str("`&&`"),
			TokenKind::Or => f.write_str("`||`"),
			TokenKind::Bang => f.write_str("`!`"),
			TokenKind::OpenParen => f.write_str("`(`"),
			TokenKind::CloseParen => f.write_str("`)`"),
			TokenKind::Comma => f.write_str("`,`"),
			TokenKind::Colon => f.write_str("`:`"),
			TokenKind::Eof => f.write_str("end of query"),
		}
	}
}
