//! Declarative record queries used to pick a translation model.
//!
//! A query combines `TAG:VALUE` atoms with `AND`, `OR`, unary `-` and
//! parentheses. Juxtaposed terms are joined with `AND`, which binds tighter
//! than `OR`:
//!
//! ```
//! use mrrc_ingest::query::Query;
//! use mrrc_ingest::{RawField, RawRecord};
//!
//! let query: Query = r#"690C_:BOOK OR 690C_:"YELLOW REPORT" -980__:DELETED"#.parse().unwrap();
//!
//! let record = RawRecord::builder()
//!     .control("001", "12345")
//!     .field(RawField::data("690", 'C', ' ').subfield('a', "BOOK"))
//!     .build();
//! assert!(query.matches(&record));
//! ```
//!
//! An atom matches when some field with the atom's base tag carries a value
//! containing `VALUE`, ignoring case. Indicators written in the atom
//! (`690C_`) are documentation only: matching looks at the three-digit tag.

use crate::error::{IngestError, Result};
use crate::record::{FieldData, RawRecord};
use std::fmt;
use std::str::FromStr;

/// Parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `TAG:VALUE`.
    Atom {
        /// Three-digit tag.
        tag: String,
        /// Uppercased value to look for.
        value: String,
    },
    /// Both sides match.
    And(Box<Query>, Box<Query>),
    /// Either side matches.
    Or(Box<Query>, Box<Query>),
    /// The inner query does not match.
    Not(Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Not,
    And,
    Or,
    Atom(String, String),
}

fn invalid(query: &str, reason: &str) -> IngestError {
    IngestError::Configuration(format!("invalid model query '{query}': {reason}"))
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            },
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            },
            '-' => {
                tokens.push(Token::Not);
                i += 1;
            },
            _ => {
                let mut term = String::new();
                let mut quoted = false;
                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '"' {
                        quoted = !quoted;
                        i += 1;
                        continue;
                    }
                    if !quoted && (ch.is_whitespace() || ch == '(' || ch == ')') {
                        break;
                    }
                    term.push(ch);
                    i += 1;
                }
                if quoted {
                    return Err(invalid(input, "unterminated quote"));
                }
                tokens.push(match term.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    _ => {
                        let (tag, value) = term
                            .split_once(':')
                            .ok_or_else(|| invalid(input, &format!("'{term}' is not TAG:VALUE")))?;
                        let tag: String = tag.chars().take(3).collect();
                        if tag.len() != 3 || !tag.chars().all(|c| c.is_ascii_digit()) {
                            return Err(invalid(input, &format!("bad tag in '{term}'")));
                        }
                        if value.trim().is_empty() {
                            return Err(invalid(input, &format!("empty value in '{term}'")));
                        }
                        Token::Atom(tag, value.trim().to_uppercase())
                    },
                });
            },
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Query> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Query::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Query> {
        let mut left = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.pos += 1;
                },
                Some(Token::Open | Token::Not | Token::Atom(..)) => {},
                _ => break,
            }
            let right = self.unary()?;
            left = Query::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Query> {
        match self.next() {
            Some(Token::Not) => Ok(Query::Not(Box::new(self.unary()?))),
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(invalid(self.source, "missing ')'")),
                }
            },
            Some(Token::Atom(tag, value)) => Ok(Query::Atom { tag, value }),
            _ => Err(invalid(self.source, "expected a term")),
        }
    }
}

impl FromStr for Query {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        let tokens = tokenize(s)?;
        let mut parser = Parser {
            source: s,
            tokens,
            pos: 0,
        };
        let query = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(invalid(s, "unexpected trailing input"));
        }
        Ok(query)
    }
}

impl Query {
    /// Parse a query string.
    ///
    /// # Errors
    ///
    /// `Configuration` when the string is not a valid query.
    pub fn parse(query: &str) -> Result<Self> {
        query.parse()
    }

    /// Evaluate the query against a record.
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        match self {
            Query::Atom { tag, value } => record.fields_by_tag(tag).any(|field| match &field.data {
                FieldData::Control(v) => v.to_uppercase().contains(value.as_str()),
                FieldData::Data(subfields) => subfields
                    .iter()
                    .flat_map(|(_, v)| v.values())
                    .any(|v| v.to_uppercase().contains(value.as_str())),
            }),
            Query::And(a, b) => a.matches(record) && b.matches(record),
            Query::Or(a, b) => a.matches(record) || b.matches(record),
            Query::Not(q) => !q.matches(record),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Atom { tag, value } if value.contains(' ') => write!(f, "{tag}:\"{value}\""),
            Query::Atom { tag, value } => write!(f, "{tag}:{value}"),
            Query::And(a, b) => write!(f, "({a} AND {b})"),
            Query::Or(a, b) => write!(f, "({a} OR {b})"),
            Query::Not(q) => write!(f, "-{q}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawField;

    fn book() -> RawRecord {
        RawRecord::builder()
            .control("001", "1")
            .control("003", "SzGeCERN")
            .field(RawField::data("690", 'C', ' ').subfield('a', "Yellow Report"))
            .field(RawField::data("980", ' ', ' ').subfield('a', "BOOK"))
            .build()
    }

    #[test]
    fn test_atom_is_case_insensitive_substring() {
        assert!(Query::parse("690C_:REPORT").unwrap().matches(&book()));
        assert!(Query::parse("003:szgecern").unwrap().matches(&book()));
        assert!(!Query::parse("003:DE-He213").unwrap().matches(&book()));
    }

    #[test]
    fn test_quoted_value() {
        let q = Query::parse(r#"690C_:"YELLOW REPORT""#).unwrap();
        assert_eq!(
            q,
            Query::Atom {
                tag: "690".to_string(),
                value: "YELLOW REPORT".to_string()
            }
        );
        assert!(q.matches(&book()));
    }

    #[test]
    fn test_precedence_and_negation() {
        let q = Query::parse("980__:PERI OR 980__:BOOK -690C_:REPORT").unwrap();
        assert!(!q.matches(&book()));
        let q = Query::parse("(980__:PERI OR 980__:BOOK) -980__:DELETED").unwrap();
        assert!(q.matches(&book()));
        let q = Query::parse("003:SzGeCERN AND -(596__:MULTIVOLUMES)").unwrap();
        assert!(q.matches(&book()));
    }

    #[test]
    fn test_invalid_queries() {
        assert!(Query::parse("").is_err());
        assert!(Query::parse("BOOK").is_err());
        assert!(Query::parse("(980__:BOOK").is_err());
        assert!(Query::parse("98:BOOK").is_err());
        assert!(Query::parse(r#"690C_:"open"#).is_err());
        assert!(Query::parse("980__:BOOK )").is_err());
    }

    #[test]
    fn test_display_roundtrips_semantics() {
        let q = Query::parse(r#"690C_:"YELLOW REPORT" OR -980:BOOK"#).unwrap();
        let again = Query::parse(&q.to_string()).unwrap();
        assert_eq!(q.matches(&book()), again.matches(&book()));
    }
}
