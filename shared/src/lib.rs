pub mod parser;
pub mod query;
pub mod source;
pub mod terms;

pub use query::FilterExpression;
pub use source::Source;
pub use terms::{PatternTerms, Term, TriplePattern};
