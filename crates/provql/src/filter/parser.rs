//! Recursive descent parser for filter strings.

use super::ast::{Comparison, FilterExpression, FuzzyOp, PropertyPath, RawValue, Rhs};
use super::error::{FilterResult, ParseError};
use super::lexer::{FilterToken, Lexer, PositionedToken};

/// Parser for filter strings.
///
/// The grammar is LL(1) at the comparison boundary: every comparison starts
/// with a `PROPERTY` token, and the token that follows it selects the
/// right-hand-side production. `IS`, `OF` and `KEY` are filler keywords,
/// recognized and discarded so both the terse and verbose spellings parse.
///
/// # Grammar
///
/// ```text
/// filter      := comparison (AND comparison)*
/// comparison  := PROPERTY rhs
/// rhs         := value_op | fuzzy_op | length_op | contains_op | is_in_op | has_op
/// value_op    := OPERATOR value
/// fuzzy_op    := (ILIKE | LIKE) STRING
/// length_op   := [OF] LENGTH DIGITS
/// contains_op := CONTAINS valuelist
/// is_in_op    := [IS] IN valuelist
/// has_op      := HAS [KEY] (STRING | PROPERTY)
/// value       := STRING | FLOAT | INTEGER | PROPERTY | DATE | TIME | DATETIME
/// valuelist   := value (COMMA value)*
/// ```
///
/// Conjunction is the only combinator: there is no `OR`, no negation and no
/// grouping.
///
/// # Example
///
/// ```
/// use provql_rs::filter::FilterParser;
///
/// let expr = FilterParser::parse("mtime >= 2019-04-23 AND label LIKE 'calc%'").unwrap();
/// assert_eq!(expr.len(), 2);
/// ```
pub struct FilterParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl FilterParser {
    /// Parses a filter string into a [`FilterExpression`].
    ///
    /// # Errors
    ///
    /// Returns a lex error if the input contains an unrecognized character
    /// sequence, and a parse error if the token sequence violates the
    /// grammar, including trailing tokens after the last comparison.
    pub fn parse(input: &str) -> FilterResult<FilterExpression> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            position: 0,
        };

        let mut comparisons = vec![parser.parse_comparison()?];
        while parser.take(&FilterToken::And) {
            comparisons.push(parser.parse_comparison()?);
        }

        // Check that we consumed all tokens.
        if let Some(trailing) = parser.peek() {
            return Err(ParseError::new(
                trailing.position,
                "'AND' or end of input",
                trailing.token.to_string(),
            )
            .into());
        }

        Ok(FilterExpression { comparisons })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the current token when it equals `expected`.
    fn take(&mut self, expected: &FilterToken) -> bool {
        if self.peek().map(|t| &t.token) == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Position to report for an unexpected end of input.
    fn end_position(&self) -> usize {
        self.tokens.last().map(|t| t.position).unwrap_or(0)
    }

    fn unexpected(&self, token: &PositionedToken, expected: &str) -> ParseError {
        ParseError::new(token.position, expected, token.token.to_string())
    }

    /// Parses one `PROPERTY rhs` comparison.
    fn parse_comparison(&mut self) -> FilterResult<Comparison> {
        let Some(token) = self.advance() else {
            return Err(ParseError::end_of_input(self.end_position(), "a property").into());
        };
        let FilterToken::Property(path) = token.token else {
            return Err(self.unexpected(&token, "a property").into());
        };
        let path = PropertyPath::new(path);
        let rhs = self.parse_rhs()?;
        Ok(Comparison { path, rhs })
    }

    /// Selects and parses the right-hand-side production by one-token
    /// lookahead.
    fn parse_rhs(&mut self) -> FilterResult<Rhs> {
        const EXPECTED: &str =
            "an operator or one of 'LIKE', 'ILIKE', 'LENGTH', 'CONTAINS', 'IN', 'HAS'";

        let Some(token) = self.peek() else {
            return Err(ParseError::end_of_input(self.end_position(), EXPECTED).into());
        };

        match token.token {
            FilterToken::Operator(op) => {
                self.position += 1;
                let value = self.parse_value()?;
                Ok(Rhs::Value { op, value })
            }
            FilterToken::Like => {
                self.position += 1;
                Ok(Rhs::Fuzzy {
                    op: FuzzyOp::Like,
                    pattern: self.expect_string()?,
                })
            }
            FilterToken::Ilike => {
                self.position += 1;
                Ok(Rhs::Fuzzy {
                    op: FuzzyOp::Ilike,
                    pattern: self.expect_string()?,
                })
            }
            FilterToken::Of => {
                self.position += 1;
                self.expect_keyword(&FilterToken::Length, "'LENGTH'")?;
                Ok(Rhs::Length(self.expect_digits()?))
            }
            FilterToken::Length => {
                self.position += 1;
                Ok(Rhs::Length(self.expect_digits()?))
            }
            FilterToken::Contains => {
                self.position += 1;
                Ok(Rhs::Contains(self.parse_valuelist()?))
            }
            FilterToken::Is => {
                self.position += 1;
                self.expect_keyword(&FilterToken::In, "'IN'")?;
                Ok(Rhs::In(self.parse_valuelist()?))
            }
            FilterToken::In => {
                self.position += 1;
                Ok(Rhs::In(self.parse_valuelist()?))
            }
            FilterToken::Has => {
                self.position += 1;
                self.take(&FilterToken::Key);
                self.parse_has_key()
            }
            _ => {
                let token = token.clone();
                Err(self.unexpected(&token, EXPECTED).into())
            }
        }
    }

    /// Parses the argument of `HAS [KEY]`: a string or a bare property.
    fn parse_has_key(&mut self) -> FilterResult<Rhs> {
        let Some(token) = self.advance() else {
            return Err(
                ParseError::end_of_input(self.end_position(), "a string or property").into(),
            );
        };
        match token.token {
            FilterToken::Str(key) | FilterToken::Property(key) => Ok(Rhs::HasKey(key)),
            _ => Err(self.unexpected(&token, "a string or property").into()),
        }
    }

    /// Parses a single value token into its raw form.
    fn parse_value(&mut self) -> FilterResult<RawValue> {
        let Some(token) = self.advance() else {
            return Err(ParseError::end_of_input(self.end_position(), "a value").into());
        };
        match token.token {
            FilterToken::Str(s) => Ok(RawValue::Str(s)),
            FilterToken::Integer(s) => Ok(RawValue::Int(s)),
            FilterToken::Float(s) => Ok(RawValue::Float(s)),
            FilterToken::Date(s) => Ok(RawValue::Date(s)),
            FilterToken::Time(s) => Ok(RawValue::Time(s)),
            FilterToken::DateTime(s) => Ok(RawValue::DateTime(s)),
            FilterToken::Property(p) => Ok(RawValue::Property(p)),
            _ => Err(self.unexpected(&token, "a value").into()),
        }
    }

    /// Parses `value (COMMA value)*`.
    fn parse_valuelist(&mut self) -> FilterResult<Vec<RawValue>> {
        let mut values = vec![self.parse_value()?];
        while self.take(&FilterToken::Comma) {
            values.push(self.parse_value()?);
        }
        Ok(values)
    }

    fn expect_string(&mut self) -> FilterResult<String> {
        let Some(token) = self.advance() else {
            return Err(ParseError::end_of_input(self.end_position(), "a string").into());
        };
        match token.token {
            FilterToken::Str(s) => Ok(s),
            _ => Err(self.unexpected(&token, "a string").into()),
        }
    }

    fn expect_digits(&mut self) -> FilterResult<RawValue> {
        let Some(token) = self.advance() else {
            return Err(ParseError::end_of_input(self.end_position(), "an integer").into());
        };
        match token.token {
            FilterToken::Integer(s) => Ok(RawValue::Int(s)),
            _ => Err(self.unexpected(&token, "an integer").into()),
        }
    }

    fn expect_keyword(&mut self, keyword: &FilterToken, expected: &str) -> FilterResult<()> {
        if self.take(keyword) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => {
                let token = token.clone();
                Err(self.unexpected(&token, expected).into())
            }
            None => Err(ParseError::end_of_input(self.end_position(), expected).into()),
        }
    }
}
