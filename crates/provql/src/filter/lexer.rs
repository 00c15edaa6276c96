//! Lexer (tokenizer) for filter strings.

use std::fmt;

use super::ast::CompareOp;
use super::error::LexError;

/// A token in a filter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    /// A dotted, lower-case property path, e.g. `dbcomputer.scheduler_type`.
    Property(String),

    /// One of the six relational operators.
    Operator(CompareOp),

    /// A quoted string literal, quotes stripped and escapes resolved.
    Str(String),

    /// An integer literal (raw lexeme, optionally signed).
    Integer(String),

    /// A float literal (raw lexeme; carries a decimal point or exponent).
    Float(String),

    /// A `YYYY-MM-DD` date literal (raw lexeme).
    Date(String),

    /// An `HH:MM[:SS]` time literal (raw lexeme).
    Time(String),

    /// A combined `DATE [SPACE] TIME` literal (raw lexeme).
    DateTime(String),

    /// The `LIKE` keyword.
    Like,

    /// The `ILIKE` keyword (also accepted spelled `iLIKE`).
    Ilike,

    /// The `OF` filler keyword.
    Of,

    /// The `LENGTH` keyword.
    Length,

    /// The `CONTAINS` keyword.
    Contains,

    /// The `IS` filler keyword.
    Is,

    /// The `IN` keyword.
    In,

    /// The `HAS` keyword.
    Has,

    /// The `KEY` filler keyword.
    Key,

    /// The conjunction, spelled `AND` or `&`.
    And,

    /// The valuelist separator `,`.
    Comma,
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterToken::Property(p) => write!(f, "property '{p}'"),
            FilterToken::Operator(op) => write!(f, "operator '{}'", op.symbol()),
            FilterToken::Str(s) => write!(f, "string '{s}'"),
            FilterToken::Integer(s) => write!(f, "integer '{s}'"),
            FilterToken::Float(s) => write!(f, "float '{s}'"),
            FilterToken::Date(s) => write!(f, "date '{s}'"),
            FilterToken::Time(s) => write!(f, "time '{s}'"),
            FilterToken::DateTime(s) => write!(f, "datetime '{s}'"),
            FilterToken::Like => f.write_str("keyword 'LIKE'"),
            FilterToken::Ilike => f.write_str("keyword 'ILIKE'"),
            FilterToken::Of => f.write_str("keyword 'OF'"),
            FilterToken::Length => f.write_str("keyword 'LENGTH'"),
            FilterToken::Contains => f.write_str("keyword 'CONTAINS'"),
            FilterToken::Is => f.write_str("keyword 'IS'"),
            FilterToken::In => f.write_str("keyword 'IN'"),
            FilterToken::Has => f.write_str("keyword 'HAS'"),
            FilterToken::Key => f.write_str("keyword 'KEY'"),
            FilterToken::And => f.write_str("keyword 'AND'"),
            FilterToken::Comma => f.write_str("','"),
        }
    }
}

/// A token with the byte offset where it starts, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// Byte offset of the token's first character.
    pub position: usize,
}

/// Lexer for filter strings.
///
/// Scanning is longest-match-first: at a digit, the lexer tries datetime,
/// date, time, float and integer in that order. A literal that starts with
/// a digit must end at a word boundary, so `1abc` is rejected here rather
/// than lexing as `1` followed by `abc`.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole input, failing on the first character sequence
    /// that matches no token pattern.
    pub fn tokenize(mut self) -> Result<Vec<PositionedToken>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.input.as_bytes().get(at).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\x0c' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<PositionedToken>, LexError> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let token = match c {
            b',' => {
                self.pos += 1;
                FilterToken::Comma
            }
            b'&' => {
                self.pos += 1;
                FilterToken::And
            }
            b'<' | b'>' | b'=' | b'!' => self.scan_operator()?,
            b'\'' | b'"' => self.scan_string()?,
            b'0'..=b'9' => self.scan_temporal_or_number()?,
            b'+' | b'-' => self.scan_number()?,
            c if c.is_ascii_alphabetic() || c == b'_' => self.scan_word()?,
            _ => return Err(self.unknown_here()),
        };

        Ok(Some(PositionedToken {
            token,
            position: start,
        }))
    }

    fn scan_operator(&mut self) -> Result<FilterToken, LexError> {
        let rest = &self.input.as_bytes()[self.pos..];
        // A lone '=' or '!' matches nothing; in particular the stray '='
        // of the undocumented '!==' spelling is rejected here.
        let (op, len) = if rest.starts_with(b"<=") {
            (CompareOp::Le, 2)
        } else if rest.starts_with(b">=") {
            (CompareOp::Ge, 2)
        } else if rest.starts_with(b"==") {
            (CompareOp::Eq, 2)
        } else if rest.starts_with(b"!=") {
            (CompareOp::Ne, 2)
        } else if rest.starts_with(b"<") {
            (CompareOp::Lt, 1)
        } else if rest.starts_with(b">") {
            (CompareOp::Gt, 1)
        } else {
            return Err(self.unknown_here());
        };
        self.pos += len;
        Ok(FilterToken::Operator(op))
    }

    /// Reads a quoted string (single or double quotes) with escape support.
    fn scan_string(&mut self) -> Result<FilterToken, LexError> {
        let start = self.pos;
        let quote = char::from(self.input.as_bytes()[self.pos]);
        self.pos += 1;

        let mut value = String::new();
        loop {
            let Some(c) = self.input[self.pos..].chars().next() else {
                return Err(LexError::UnterminatedString { position: start });
            };
            self.pos += c.len_utf8();
            if c == quote {
                break;
            }
            if c == '\\' {
                let Some(escaped) = self.input[self.pos..].chars().next() else {
                    return Err(LexError::UnterminatedString { position: start });
                };
                self.pos += escaped.len_utf8();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            } else {
                value.push(c);
            }
        }
        Ok(FilterToken::Str(value))
    }

    /// True when `n` ASCII digits occur at byte offset `at`.
    fn digits_at(&self, at: usize, n: usize) -> bool {
        (at..at + n).all(|i| matches!(self.byte_at(i), Some(b'0'..=b'9')))
    }

    /// Matches `YYYY-MM-DD` at `at`, returning the matched length.
    fn match_date(&self, at: usize) -> Option<usize> {
        (self.digits_at(at, 4)
            && self.byte_at(at + 4) == Some(b'-')
            && self.digits_at(at + 5, 2)
            && self.byte_at(at + 7) == Some(b'-')
            && self.digits_at(at + 8, 2))
        .then_some(10)
    }

    /// Matches `HH:MM[:SS]` at `at`, returning the matched length.
    fn match_time(&self, at: usize) -> Option<usize> {
        if !(self.digits_at(at, 2)
            && self.byte_at(at + 2) == Some(b':')
            && self.digits_at(at + 3, 2))
        {
            return None;
        }
        if self.byte_at(at + 5) == Some(b':') && self.digits_at(at + 6, 2) {
            Some(8)
        } else {
            Some(5)
        }
    }

    /// Scans a literal starting with a digit: datetime, date, time, float
    /// or integer, tried in that order.
    fn scan_temporal_or_number(&mut self) -> Result<FilterToken, LexError> {
        let start = self.pos;

        if let Some(date_len) = self.match_date(start) {
            let mut end = start + date_len;
            // DATETIME = DATE [SPACE] TIME, with at most one space.
            let mut time_len = self.match_time(end);
            if time_len.is_none() && self.byte_at(end) == Some(b' ') {
                if let Some(len) = self.match_time(end + 1) {
                    end += 1;
                    time_len = Some(len);
                }
            }
            let token = match time_len {
                Some(len) => {
                    end += len;
                    FilterToken::DateTime(self.input[start..end].to_string())
                }
                None => FilterToken::Date(self.input[start..end].to_string()),
            };
            self.pos = end;
            self.check_word_boundary(start)?;
            return Ok(token);
        }

        if let Some(time_len) = self.match_time(start) {
            self.pos = start + time_len;
            self.check_word_boundary(start)?;
            return Ok(FilterToken::Time(self.input[start..self.pos].to_string()));
        }

        self.scan_number()
    }

    /// Scans an integer or float literal, optionally signed.
    fn scan_number(&mut self) -> Result<FilterToken, LexError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            // A sign with no digits.
            self.pos = start;
            return Err(self.unknown_here());
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            // The exponent marker only binds when digits follow it.
            let mut ahead = self.pos + 1;
            if matches!(self.byte_at(ahead), Some(b'+' | b'-')) {
                ahead += 1;
            }
            if matches!(self.byte_at(ahead), Some(b'0'..=b'9')) {
                self.pos = ahead;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
                is_float = true;
            }
        }

        self.check_word_boundary(start)?;
        let lexeme = self.input[start..self.pos].to_string();
        Ok(if is_float {
            FilterToken::Float(lexeme)
        } else {
            FilterToken::Integer(lexeme)
        })
    }

    /// Scans a keyword or a property path.
    fn scan_word(&mut self) -> Result<FilterToken, LexError> {
        let start = self.pos;
        let word = self.read_word();
        Ok(match word {
            "AND" => FilterToken::And,
            "LIKE" => FilterToken::Like,
            // The original grammar spells the case-insensitive operator
            // 'iLIKE'; both spellings are recognized.
            "ILIKE" | "iLIKE" => FilterToken::Ilike,
            "OF" => FilterToken::Of,
            "LENGTH" => FilterToken::Length,
            "CONTAINS" => FilterToken::Contains,
            "IS" => FilterToken::Is,
            "IN" => FilterToken::In,
            "HAS" => FilterToken::Has,
            "KEY" => FilterToken::Key,
            _ => self.scan_property(start, word)?,
        })
    }

    /// Continues a non-keyword word as a dotted property path.
    fn scan_property(&mut self, start: usize, first: &str) -> Result<FilterToken, LexError> {
        if !is_path_segment(first) {
            return Err(self.unknown_from(start));
        }
        while self.peek() == Some(b'.') {
            self.pos += 1;
            let segment = self.read_word();
            if !is_path_segment(segment) {
                return Err(self.unknown_from(start));
            }
        }
        Ok(FilterToken::Property(self.input[start..self.pos].to_string()))
    }

    /// Reads a run of `[A-Za-z0-9_]` characters.
    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// A literal that starts with a digit must not run into identifier
    /// characters: `1abc` matches no token pattern.
    fn check_word_boundary(&self, start: usize) -> Result<(), LexError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphanumeric() || c == b'_' => Err(self.unknown_from(start)),
            _ => Ok(()),
        }
    }

    fn unknown_here(&self) -> LexError {
        self.unknown_from(self.pos)
    }

    /// Builds the error for an unrecognized sequence starting at `from`,
    /// capturing text up to the next separator for the message.
    fn unknown_from(&self, from: usize) -> LexError {
        let mut text = String::new();
        for c in self.input[from..].chars() {
            if !text.is_empty() && (c.is_whitespace() || ",&<>=!'\"".contains(c)) {
                break;
            }
            text.push(c);
        }
        LexError::UnknownToken {
            text,
            position: from,
        }
    }
}

/// True when `word` is a valid path segment: `[a-z_][a-z_0-9]*`.
fn is_path_segment(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<FilterToken> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    fn prop(p: &str) -> FilterToken {
        FilterToken::Property(p.to_string())
    }

    #[test]
    fn test_tokenize_property() {
        assert_eq!(tokenize("id"), vec![prop("id")]);
        assert_eq!(tokenize("node_type"), vec![prop("node_type")]);
        assert_eq!(tokenize("_private2"), vec![prop("_private2")]);
    }

    #[test]
    fn test_tokenize_dotted_property() {
        assert_eq!(tokenize("a.b.c"), vec![prop("a.b.c")]);
        assert_eq!(
            tokenize("dbcomputer.scheduler_type"),
            vec![prop("dbcomputer.scheduler_type")]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            tokenize("< <= > >= == !="),
            vec![
                FilterToken::Operator(CompareOp::Lt),
                FilterToken::Operator(CompareOp::Le),
                FilterToken::Operator(CompareOp::Gt),
                FilterToken::Operator(CompareOp::Ge),
                FilterToken::Operator(CompareOp::Eq),
                FilterToken::Operator(CompareOp::Ne),
            ]
        );
    }

    #[test]
    fn test_tokenize_operator_without_spaces() {
        assert_eq!(
            tokenize("mtime>=2019-04-23"),
            vec![
                prop("mtime"),
                FilterToken::Operator(CompareOp::Ge),
                FilterToken::Date("2019-04-23".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            tokenize("LIKE ILIKE OF LENGTH CONTAINS IS IN HAS KEY AND"),
            vec![
                FilterToken::Like,
                FilterToken::Ilike,
                FilterToken::Of,
                FilterToken::Length,
                FilterToken::Contains,
                FilterToken::Is,
                FilterToken::In,
                FilterToken::Has,
                FilterToken::Key,
                FilterToken::And,
            ]
        );
    }

    #[test]
    fn test_tokenize_ilike_original_spelling() {
        assert_eq!(tokenize("iLIKE"), vec![FilterToken::Ilike]);
    }

    #[test]
    fn test_tokenize_lowercase_keyword_is_a_property() {
        // Keywords are case-sensitive; 'in' is a legal field name.
        assert_eq!(tokenize("in"), vec![prop("in")]);
        assert_eq!(tokenize("and"), vec![prop("and")]);
    }

    #[test]
    fn test_tokenize_ampersand_conjunction() {
        assert_eq!(
            tokenize("a & b"),
            vec![prop("a"), FilterToken::And, prop("b")]
        );
    }

    #[test]
    fn test_tokenize_in_valuelist() {
        assert_eq!(
            tokenize("id IN 45,56,78"),
            vec![
                prop("id"),
                FilterToken::In,
                FilterToken::Integer("45".to_string()),
                FilterToken::Comma,
                FilterToken::Integer("56".to_string()),
                FilterToken::Comma,
                FilterToken::Integer("78".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_string_single_and_double_quotes() {
        assert_eq!(
            tokenize("'aii%'"),
            vec![FilterToken::Str("aii%".to_string())]
        );
        assert_eq!(
            tokenize("\"x%\""),
            vec![FilterToken::Str("x%".to_string())]
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        assert_eq!(
            tokenize(r"'it\'s'"),
            vec![FilterToken::Str("it's".to_string())]
        );
        assert_eq!(
            tokenize(r#""a\"b""#),
            vec![FilterToken::Str("a\"b".to_string())]
        );
        assert_eq!(
            tokenize(r"'a\\b\n'"),
            vec![FilterToken::Str("a\\b\n".to_string())]
        );
    }

    #[test]
    fn test_tokenize_string_keeps_dots() {
        assert_eq!(
            tokenize("'data.dict.Dict.'"),
            vec![FilterToken::Str("data.dict.Dict.".to_string())]
        );
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = Lexer::new("a == 'x").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { position: 5 });
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            tokenize("45 -3 +7"),
            vec![
                FilterToken::Integer("45".to_string()),
                FilterToken::Integer("-3".to_string()),
                FilterToken::Integer("+7".to_string()),
            ]
        );
        assert_eq!(
            tokenize("1.0 -2.5 3e8 1.5e-3"),
            vec![
                FilterToken::Float("1.0".to_string()),
                FilterToken::Float("-2.5".to_string()),
                FilterToken::Float("3e8".to_string()),
                FilterToken::Float("1.5e-3".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_date() {
        assert_eq!(
            tokenize("2019-04-23"),
            vec![FilterToken::Date("2019-04-23".to_string())]
        );
    }

    #[test]
    fn test_tokenize_time() {
        assert_eq!(
            tokenize("10:11"),
            vec![FilterToken::Time("10:11".to_string())]
        );
        assert_eq!(
            tokenize("10:11:12"),
            vec![FilterToken::Time("10:11:12".to_string())]
        );
    }

    #[test]
    fn test_tokenize_datetime() {
        assert_eq!(
            tokenize("2020-01-01 10:11"),
            vec![FilterToken::DateTime("2020-01-01 10:11".to_string())]
        );
    }

    #[test]
    fn test_tokenize_date_followed_by_keyword_stays_a_date() {
        assert_eq!(
            tokenize("2020-01-01 AND"),
            vec![
                FilterToken::Date("2020-01-01".to_string()),
                FilterToken::And,
            ]
        );
    }

    #[test]
    fn test_tokenize_digit_start_word_is_an_error() {
        let err = Lexer::new("1abc > 3").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownToken {
                text: "1abc".to_string(),
                position: 0,
            }
        );
    }

    #[test]
    fn test_tokenize_not_equal_equal_is_an_error() {
        // '!=' is canonical; the trailing '=' of '!==' matches nothing.
        let err = Lexer::new("a !== 1").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownToken {
                text: "=".to_string(),
                position: 4,
            }
        );
    }

    #[test]
    fn test_tokenize_mixed_case_word_is_an_error() {
        let err = Lexer::new("nodeType == 1").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownToken {
                text: "nodeType".to_string(),
                position: 0,
            }
        );
    }

    #[test]
    fn test_tokenize_unknown_character() {
        let err = Lexer::new("a == #tag").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownToken {
                text: "#tag".to_string(),
                position: 5,
            }
        );
    }

    #[test]
    fn test_tokenize_positions() {
        let tokens = Lexer::new("id IN 45").tokenize().unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 6]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokenize(""), Vec::<FilterToken>::new());
        assert_eq!(tokenize("   \t\n"), Vec::<FilterToken>::new());
    }
}
