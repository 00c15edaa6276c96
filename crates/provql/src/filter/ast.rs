//! Abstract syntax tree for parsed filter strings.

use std::fmt;

/// A dotted, lower-case field reference, e.g. `dbcomputer.scheduler_type`.
///
/// The lexer guarantees every segment matches `[a-z_][a-z_0-9]*`, so the
/// path is stored in its rendered form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyPath(String);

impl PropertyPath {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        PropertyPath(path.into())
    }

    /// The dotted rendering of the path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The individual path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The first segment, e.g. `attributes` for `attributes.energy`.
    pub fn root(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six relational comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
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
}

impl CompareOp {
    /// The operator as written in a filter string.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// The fuzzy string-matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyOp {
    /// Case-sensitive pattern match.
    Like,
    /// Case-insensitive pattern match.
    Ilike,
}

impl FuzzyOp {
    /// The operator symbol used in the predicate mapping.
    pub fn symbol(self) -> &'static str {
        match self {
            FuzzyOp::Like => "like",
            FuzzyOp::Ilike => "ilike",
        }
    }
}

/// A literal exactly as it appeared in the input, tagged with the lexical
/// kind the lexer assigned.
///
/// Conversion to a typed value happens in the translator; keeping the raw
/// lexeme here means the parser never needs to understand literal contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A quoted string, quotes stripped and escapes resolved.
    Str(String),
    /// An integer lexeme, optionally signed.
    Int(String),
    /// A float lexeme (decimal point or exponent present).
    Float(String),
    /// A `YYYY-MM-DD` lexeme.
    Date(String),
    /// An `HH:MM[:SS]` lexeme.
    Time(String),
    /// A combined date-and-time lexeme.
    DateTime(String),
    /// A bare property path used in value position; coerces to its dotted
    /// rendering as a string.
    Property(String),
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs {
    /// `<op> <value>`, e.g. `>= 2019-04-23`.
    Value {
        /// The relational operator.
        op: CompareOp,
        /// The raw literal to compare against.
        value: RawValue,
    },

    /// `LIKE '...'` or `ILIKE '...'`. The pattern is passed through
    /// unmodified; wildcard semantics belong to the query backend.
    Fuzzy {
        /// Which of the two fuzzy operators was written.
        op: FuzzyOp,
        /// The pattern string.
        pattern: String,
    },

    /// `[OF] LENGTH <digits>`.
    Length(RawValue),

    /// `CONTAINS <valuelist>`.
    Contains(Vec<RawValue>),

    /// `[IS] IN <valuelist>`.
    In(Vec<RawValue>),

    /// `HAS [KEY] <string-or-property>`.
    HasKey(String),
}

/// One parsed predicate unit: a property path and its right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The field the predicate applies to.
    pub path: PropertyPath,
    /// The constraint placed on the field.
    pub rhs: Rhs,
}

/// The parser's output: an ordered sequence of implicitly conjoined
/// comparisons.
///
/// The parser guarantees the sequence is non-empty. Order is preserved so
/// translation errors are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    /// The comparisons, in source order.
    pub comparisons: Vec<Comparison>,
}

impl FilterExpression {
    /// The number of comparisons in the expression.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    /// Whether the expression holds no comparisons. Always false for an
    /// expression produced by the parser.
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// The property paths referenced by the expression, in source order,
    /// with repeats.
    pub fn paths(&self) -> impl Iterator<Item = &PropertyPath> {
        self.comparisons.iter().map(|c| &c.path)
    }
}
