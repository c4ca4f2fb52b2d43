/// The kind of a query-property marker.
///
/// A marker wraps a subtree to tag it with planner semantics. In query text a marker is written
/// as `((LABEL = true) && (SOURCE))`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MarkerKind {
	/// A pair of range terms which must be scanned as a single bounded interval
	BoundedRange,
	/// A union of values too large to expand into the query tree
	ExceededOr,
	/// A term whose expansion exceeded the term threshold
	ExceededTerm,
	/// A value (regex or range) whose expansion exceeded the value threshold
	ExceededValue,
	/// A predicate whose evaluation is delayed until document evaluation
	Delayed,
	/// A predicate only evaluated against documents, never against the index
	EvaluationOnly,
	/// A marker label this crate does not know about
	Unrecognized(String),
}

impl MarkerKind {
	pub fn label(&self) -> &str {
		match self {
			MarkerKind::BoundedRange => "_Bounded_",
			MarkerKind::ExceededOr => "_List_",
			MarkerKind::ExceededTerm => "_Term_",
			MarkerKind::ExceededValue => "_Value_",
			MarkerKind::Delayed => "_Delayed_",
			MarkerKind::EvaluationOnly => "_Eval_",
			MarkerKind::Unrecognized(label) => label,
		}
	}

	/// Resolves a marker label.
	///
	/// Returns `None` when the name does not have the `_Label_` shape and therefore is an
	/// ordinary assignment rather than a marker.
	pub fn from_label(label: &str) -> Option<MarkerKind> {
		let kind = match label {
			"_Bounded_" => MarkerKind::BoundedRange,
			"_List_" => MarkerKind::ExceededOr,
			"_Term_" => MarkerKind::ExceededTerm,
			"_Value_" => MarkerKind::ExceededValue,
			"_Delayed_" => MarkerKind::Delayed,
			"_Eval_" => MarkerKind::EvaluationOnly,
			other => {
				if other.len() > 2 && other.starts_with('_') && other.ends_with('_') {
					MarkerKind::Unrecognized(other.to_owned())
				} else {
					return None;
				}
			}
		};
		Some(kind)
	}
}
