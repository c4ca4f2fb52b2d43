//! The boolean query tree consumed by the planning passes.
//!
//! A query is an owned tree of [`Node`] values. Planning passes never mutate a tree in place;
//! they consume it and rebuild it bottom-up, so a tree handed to another thread can never be
//! observed half-rewritten.

mod equality;
mod fmt;
mod literal;
mod marker;
mod node;
mod operator;

pub use equality::{canonical, equivalent};
pub use literal::Literal;
pub use marker::MarkerKind;
pub use node::{Assignment, Comparison, Function, Marker, Node};
pub use operator::Operator;
