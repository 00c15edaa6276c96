//! The canonical filter grammar text.

/// The filter grammar, as published to API clients.
///
/// Kept byte-compatible with the documented EBNF so client-facing
/// documentation stays accurate; the `filter_grammar` diagnostic plugin
/// serves this text verbatim.
pub const FILTER_GRAMMAR: &str = "\
filter      := comparison (AND comparison)*
comparison  := PROPERTY rhs
rhs         := value_op | fuzzy_op | length_op | contains_op | is_in_op | has_op
value_op    := OPERATOR value
fuzzy_op    := (ILIKE | LIKE) STRING
length_op   := [OF] LENGTH DIGITS
contains_op := CONTAINS valuelist
is_in_op    := [IS] IN valuelist
has_op      := HAS [KEY] (STRING | PROPERTY)
value       := STRING | FLOAT | INTEGER | PROPERTY | DATE | TIME | DATETIME
valuelist   := value (COMMA value)*
";
