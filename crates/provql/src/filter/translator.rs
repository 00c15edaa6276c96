//! Semantic resolution of parsed comparisons into the predicate mapping
//! consumed by the query layer.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::ast::{CompareOp, FilterExpression, FuzzyOp, PropertyPath, RawValue, Rhs};
use super::error::SemanticError;
use crate::schema::FieldSet;

/// A literal coerced to its typed form.
///
/// Dates and times are naive: the grammar supports no timezone suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string (from a quoted literal or a bare property in value position).
    String(String),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A calendar date.
    Date(NaiveDate),
    /// A wall-clock time.
    Time(NaiveTime),
    /// A combined date and time.
    DateTime(NaiveDateTime),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(v) => serializer.serialize_str(v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Date(v) => serializer.collect_str(&v.format("%Y-%m-%d")),
            Value::Time(v) => serializer.collect_str(&v.format("%H:%M:%S")),
            Value::DateTime(v) => serializer.collect_str(&v.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Operator symbols understood by the downstream query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `like`
    Like,
    /// `ilike`
    Ilike,
    /// `of_length`
    OfLength,
    /// `contains`
    Contains,
    /// `in`
    In,
    /// `has_key`
    HasKey,
}

impl Operator {
    /// The symbol used as the key in the predicate mapping.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
            Operator::OfLength => "of_length",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::HasKey => "has_key",
        }
    }
}

impl From<CompareOp> for Operator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Lt => Operator::Lt,
            CompareOp::Le => Operator::Le,
            CompareOp::Gt => Operator::Gt,
            CompareOp::Ge => Operator::Ge,
            CompareOp::Eq => Operator::Eq,
            CompareOp::Ne => Operator::Ne,
        }
    }
}

impl From<FuzzyOp> for Operator {
    fn from(op: FuzzyOp) -> Self {
        match op {
            FuzzyOp::Like => Operator::Like,
            FuzzyOp::Ilike => Operator::Ilike,
        }
    }
}

/// The value side of a clause: a single literal or a value list.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseValue {
    /// A single typed literal.
    Single(Value),
    /// A list of typed literals (for `in` and `contains`).
    List(Vec<Value>),
}

impl Serialize for ClauseValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClauseValue::Single(value) => value.serialize(serializer),
            ClauseValue::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// One operator/value constraint attached to a property path.
///
/// Serializes as `{"<symbol>": value}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The operator.
    pub operator: Operator,
    /// The operand.
    pub value: ClauseValue,
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.operator.symbol(), &self.value)?;
        map.end()
    }
}

/// The translator's output: dotted property path → operator clauses.
///
/// A path with one clause serializes as `{"path": {"op": value}}`. Filters
/// that constrain the same path more than once fold the clauses into
/// `{"path": {"and": [{"op": value}, ...]}}`, the shape the query builder
/// expects for conjoined constraints on one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateMap {
    entries: BTreeMap<String, Vec<Clause>>,
}

impl PredicateMap {
    /// Creates an empty predicate mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no predicate was produced (blank filter string).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of constrained property paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The clauses attached to a path, if any.
    pub fn get(&self, path: &str) -> Option<&[Clause]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// The constrained property paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn push(&mut self, path: &PropertyPath, clause: Clause) {
        self.entries
            .entry(path.as_str().to_string())
            .or_default()
            .push(clause);
    }
}

impl Serialize for PredicateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct AndClauses<'a>(&'a [Clause]);

        impl Serialize for AndClauses<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("and", self.0)?;
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, clauses) in &self.entries {
            match clauses.as_slice() {
                [single] => map.serialize_entry(path, single)?,
                many => map.serialize_entry(path, &AndClauses(many))?,
            }
        }
        map.end()
    }
}

/// Translates a parsed filter expression into the predicate mapping.
///
/// When `allowed_fields` is given, every property path must pass its
/// [`FieldSet::permits`] check; unknown fields are rejected with a
/// closest-match suggestion.
///
/// # Errors
///
/// Returns a [`SemanticError`] for an unknown field, a literal whose text
/// cannot be coerced to its lexical kind (out-of-range dates included), or
/// a negative `LENGTH` count.
pub fn translate(
    expr: &FilterExpression,
    allowed_fields: Option<&FieldSet>,
) -> Result<PredicateMap, SemanticError> {
    let mut map = PredicateMap::new();
    for comparison in &expr.comparisons {
        if let Some(fields) = allowed_fields {
            if !fields.permits(&comparison.path) {
                return Err(SemanticError::UnknownField {
                    path: comparison.path.to_string(),
                    suggestion: fields.suggest(comparison.path.as_str()),
                });
            }
        }
        let clause = build_clause(&comparison.path, &comparison.rhs)?;
        map.push(&comparison.path, clause);
    }
    Ok(map)
}

fn build_clause(path: &PropertyPath, rhs: &Rhs) -> Result<Clause, SemanticError> {
    Ok(match rhs {
        Rhs::Value { op, value } => Clause {
            operator: (*op).into(),
            value: ClauseValue::Single(coerce(path, value)?),
        },
        Rhs::Fuzzy { op, pattern } => Clause {
            operator: (*op).into(),
            value: ClauseValue::Single(Value::String(pattern.clone())),
        },
        Rhs::Length(raw) => {
            let Value::Int(count) = coerce(path, raw)? else {
                // The parser only feeds integer lexemes here.
                return Err(SemanticError::invalid_value(
                    path.as_str(),
                    "length must be an integer",
                ));
            };
            if count < 0 {
                return Err(SemanticError::invalid_value(
                    path.as_str(),
                    format!("length must be a non-negative integer, got {count}"),
                ));
            }
            Clause {
                operator: Operator::OfLength,
                value: ClauseValue::Single(Value::Int(count)),
            }
        }
        Rhs::Contains(values) => Clause {
            operator: Operator::Contains,
            value: ClauseValue::List(coerce_list(path, values)?),
        },
        Rhs::In(values) => Clause {
            operator: Operator::In,
            value: ClauseValue::List(coerce_list(path, values)?),
        },
        Rhs::HasKey(key) => Clause {
            operator: Operator::HasKey,
            value: ClauseValue::Single(Value::String(key.clone())),
        },
    })
}

fn coerce_list(path: &PropertyPath, values: &[RawValue]) -> Result<Vec<Value>, SemanticError> {
    values.iter().map(|raw| coerce(path, raw)).collect()
}

/// Converts a raw lexeme to its typed value.
///
/// The lexical kind was fixed by the lexer; this only converts the text and
/// validates ranges (chrono rejects month 13 and friends).
fn coerce(path: &PropertyPath, raw: &RawValue) -> Result<Value, SemanticError> {
    Ok(match raw {
        RawValue::Str(s) => Value::String(s.clone()),
        RawValue::Property(p) => Value::String(p.clone()),
        RawValue::Int(s) => Value::Int(s.parse().map_err(|_| {
            SemanticError::invalid_value(path.as_str(), format!("invalid integer literal '{s}'"))
        })?),
        RawValue::Float(s) => Value::Float(s.parse().map_err(|_| {
            SemanticError::invalid_value(path.as_str(), format!("invalid float literal '{s}'"))
        })?),
        RawValue::Date(s) => Value::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(
            |err| {
                SemanticError::invalid_value(
                    path.as_str(),
                    format!("invalid date literal '{s}': {err}"),
                )
            },
        )?),
        RawValue::Time(s) => Value::Time(parse_time(s).map_err(|err| {
            SemanticError::invalid_value(
                path.as_str(),
                format!("invalid time literal '{s}': {err}"),
            )
        })?),
        RawValue::DateTime(s) => Value::DateTime(parse_datetime(s).map_err(|err| {
            SemanticError::invalid_value(
                path.as_str(),
                format!("invalid datetime literal '{s}': {err}"),
            )
        })?),
    })
}

fn parse_time(text: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
}

fn parse_datetime(text: &str) -> chrono::ParseResult<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d%H:%M:%S",
        "%Y-%m-%d%H:%M",
    ];
    let mut result = NaiveDateTime::parse_from_str(text, FORMATS[0]);
    for format in &FORMATS[1..] {
        if result.is_ok() {
            break;
        }
        result = NaiveDateTime::parse_from_str(text, format);
    }
    result
}
