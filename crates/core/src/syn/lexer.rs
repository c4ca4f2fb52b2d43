use crate::err::Error;
use crate::expr::Operator;
use crate::syn::token::{Span, Token, TokenKind};

/// Splits query text into tokens, skipping whitespace
pub struct Lexer<'a> {
	source: &'a str,
	offset: usize,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self {
		Lexer {
			source,
			offset: 0,
		}
	}

	fn peek_char(&self) -> Option<char> {
		self.source[self.offset..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let c = self.peek_char()?;
		self.offset += c.len_utf8();
		Some(c)
	}

	fn eat_char(&mut self, c: char) -> bool {
		if self.peek_char() == Some(c) {
			self.offset += c.len_utf8();
			true
		} else {
			false
		}
	}

	fn error(&self, offset: usize, message: impl Into<String>) -> Error {
		Error::InvalidQuery {
			offset,
			message: message.into(),
		}
	}

	/// Lexes the next token. Returns an `Eof` token once the source is exhausted.
	pub fn next_token(&mut self) -> Result<Token, Error> {
		while self.peek_char().is_some_and(char::is_whitespace) {
			self.bump();
		}
		let start = self.offset;
		let Some(c) = self.bump() else {
			return Ok(self.finish(start, TokenKind::Eof));
		};
		let kind = match c {
			'(' => TokenKind::OpenParen,
			')' => TokenKind::CloseParen,
			',' => TokenKind::Comma,
			':' => TokenKind::Colon,
			'&' if self.eat_char('&') => TokenKind::And,
			'|' if self.eat_char('|') => TokenKind::Or,
			'&' | '|' => return Err(self.error(start, format!("Expected `{c}{c}`"))),
			'=' if self.eat_char('=') => TokenKind::Op(Operator::Equal),
			'=' if self.eat_char('~') => TokenKind::Op(Operator::RegexMatch),
			'=' => TokenKind::Assign,
			'!' if self.eat_char('=') => TokenKind::Op(Operator::NotEqual),
			'!' if self.eat_char('~') => TokenKind::Op(Operator::RegexNotMatch),
			'!' => TokenKind::Bang,
			'<' if self.eat_char('=') => TokenKind::Op(Operator::LessThanOrEqual),
			'<' => TokenKind::Op(Operator::LessThan),
			'>' if self.eat_char('=') => TokenKind::Op(Operator::GreaterThanOrEqual),
			'>' => TokenKind::Op(Operator::GreaterThan),
			'\'' | '"' => self.lex_string(start, c)?,
			'-' | '0'..='9' => self.lex_integer(start)?,
			c if c.is_alphabetic() || c == '_' => self.lex_ident(start),
			c => return Err(self.error(start, format!("Unexpected character `{c}`"))),
		};
		Ok(self.finish(start, kind))
	}

	fn finish(&self, start: usize, kind: TokenKind) -> Token {
		Token {
			kind,
			span: Span {
				offset: start,
				len: self.offset - start,
			},
		}
	}

	fn lex_string(&mut self, start: usize, quote: char) -> Result<TokenKind, Error> {
		let mut value = String::new();
		loop {
			match self.bump() {
				None => return Err(self.error(start, "Unterminated string")),
				Some('\\') => match self.bump() {
					Some(c) => value.push(c),
					None => return Err(self.error(start, "Unterminated string")),
				},
				Some(c) if c == quote => return Ok(TokenKind::Str(value)),
				Some(c) => value.push(c),
			}
		}
	}

	fn lex_integer(&mut self, start: usize) -> Result<TokenKind, Error> {
		while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
			self.bump();
		}
		let text = &self.source[start..self.offset];
		text.parse::<i64>()
			.map(TokenKind::Int)
			.map_err(|e| self.error(start, format!("Invalid integer `{text}`: {e}")))
	}

	fn lex_ident(&mut self, start: usize) -> TokenKind {
		while self.peek_char().is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.') {
			self.bump();
		}
		match &self.source[start..self.offset] {
			"true" => TokenKind::True,
			"false" => TokenKind::False,
			"null" => TokenKind::Null,
			ident => TokenKind::Ident(ident.to_owned()),
		}
	}
}
