/// A literal value on the right hand side of a comparison, or the value of an assignment.
///
/// Literals are totally ordered so they can be used directly as range bounds. Values of
/// different kinds order by kind first (null < bool < integer < string).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Literal {
	Null,
	Bool(bool),
	Integer(i64),
	String(String),
}

impl Literal {
	pub fn is_null(&self) -> bool {
		matches!(self, Literal::Null)
	}

	/// Returns the string content of a string literal
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Literal::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<&str> for Literal {
	fn from(v: &str) -> Self {
		Literal::String(v.to_owned())
	}
}

impl From<String> for Literal {
	fn from(v: String) -> Self {
		Literal::String(v)
	}
}

impl From<i64> for Literal {
	fn from(v: i64) -> Self {
		Literal::Integer(v)
	}
}

impl From<bool> for Literal {
	fn from(v: bool) -> Self {
		Literal::Bool(v)
	}
}

impl From<i32> for Literal {
	fn from(v: i32) -> Self {
		Literal::Integer(v.into())
	}
}
