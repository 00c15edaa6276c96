//! Filter-string parsing and translation.
//!
//! This module turns a client-supplied filter string into the predicate
//! mapping the query layer consumes. The pipeline has three stages, each
//! pure and independent per call:
//!
//! 1. [`Lexer`] tokenizes the raw string (properties, operators,
//!    literals, keywords), discarding whitespace.
//! 2. [`FilterParser`] builds the ordered comparison sequence per the
//!    documented grammar ([`FILTER_GRAMMAR`]). Conjunction (`AND` / `&`) is
//!    the only combinator.
//! 3. [`translate`] validates fields against an optional allow-list,
//!    coerces literals to typed values and emits the [`PredicateMap`].
//!
//! # Supported Syntax
//!
//! - Relational: `id >= 45`, `node_type == 'data.dict.Dict.'`
//! - Fuzzy match: `label LIKE 'calc%'`, `first_name ILIKE 'aii%'`
//! - Length: `attributes OF LENGTH 4` (or just `LENGTH 4`)
//! - Membership: `id IS IN 45,56,78` (or just `IN`)
//! - Containment: `extras CONTAINS 'tag1','tag2'`
//! - Key presence: `attributes HAS KEY 'energy'`
//! - Dates and times: `mtime >= 2019-04-23`, `ctime < 2020-01-01 10:11`
//!
//! # Example
//!
//! ```
//! use provql_rs::filter::translate_filter;
//!
//! let map = translate_filter("mtime>=2019-04-23 AND label LIKE 'calc%'", None).unwrap();
//! let json = serde_json::to_value(&map).unwrap();
//! assert_eq!(json["mtime"][">="], "2019-04-23");
//! assert_eq!(json["label"]["like"], "calc%");
//! ```

mod ast;
mod error;
mod grammar;
mod lexer;
mod parser;
mod translator;

pub use ast::{CompareOp, Comparison, FilterExpression, FuzzyOp, PropertyPath, RawValue, Rhs};
pub use error::{FilterError, FilterResult, LexError, ParseError, SemanticError};
pub use grammar::FILTER_GRAMMAR;
pub use lexer::{FilterToken, Lexer, PositionedToken};
pub use parser::FilterParser;
pub use translator::{translate, Clause, ClauseValue, Operator, PredicateMap, Value};

use crate::schema::FieldSet;

/// Parses a filter string into its comparison sequence.
pub fn parse_filter(input: &str) -> FilterResult<FilterExpression> {
    FilterParser::parse(input)
}

/// Translates a filter string into the predicate mapping consumed by the
/// query layer.
///
/// Blank input yields an empty mapping: an absent filter selects
/// everything. Any other input either fully translates or is rejected.
///
/// # Errors
///
/// Propagates the first lex, parse or semantic error encountered; there is
/// no partial-success mode.
pub fn translate_filter(
    input: &str,
    allowed_fields: Option<&FieldSet>,
) -> FilterResult<PredicateMap> {
    if input.trim().is_empty() {
        return Ok(PredicateMap::new());
    }
    let expr = FilterParser::parse(input)?;
    Ok(translate(&expr, allowed_fields)?)
}
