use std::fmt;

/// The comparison operator of a leaf node
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operator {
	/// `==`
	Equal,
	/// `!=`
	NotEqual,
	/// `<`
	LessThan,
	/// `<=`
	LessThanOrEqual,
	/// `>`
	GreaterThan,
	/// `>=`
	GreaterThanOrEqual,
	/// `=~`
	RegexMatch,
	/// `!~`
	RegexNotMatch,
}

impl Operator {
	pub fn symbol(&self) -> &'static str {
		match self {
			Operator::Equal => "==",
			Operator::NotEqual => "!=",
			Operator::LessThan => "<",
			Operator::LessThanOrEqual => "<=",
			Operator::GreaterThan => ">",
			Operator::GreaterThanOrEqual => ">=",
			Operator::RegexMatch => "=~",
			Operator::RegexNotMatch => "!~",
		}
	}

	/// Is this one side of a range (`<`, `<=`, `>`, `>=`)?
	pub fn is_range(&self) -> bool {
		matches!(
			self,
			Operator::LessThan
				| Operator::LessThanOrEqual
				| Operator::GreaterThan
				| Operator::GreaterThanOrEqual
		)
	}

	pub fn is_regex(&self) -> bool {
		matches!(self, Operator::RegexMatch | Operator::RegexNotMatch)
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}
