//! Wildcard path patterns
//!
//! A pattern expression is read left to right as three kinds of token:
//!
//! - literal text, matched verbatim (`.` is the segment separator)
//! - `[]`, one or more decimal digits (a sequence index)
//! - `*`, one or more word characters or dots
//!
//! Both wildcards are capturing groups. The compiled matcher is anchored at
//! the start of the path only, so `characters.[]` matches the prefix of
//! `characters.3.address.line1` and leaves the suffix alone.

use crate::errors::{ReconcileError, Result};
use regex::{Regex, RegexBuilder};

const INDEX_GROUP: &str = "([0-9]+)";
const WILDCARD_GROUP: &str = r"([\w.]+)";

/// One lexical unit of a pattern expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    /// `[]`
    Index,
    /// `*`
    Wildcard,
}

/// Split an expression into tokens.
///
/// # Errors
///
/// Returns `PatternCompilation` for an empty expression, an unbalanced `[`
/// or `]`, or brackets with anything between them.
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    if expression.is_empty() {
        return Err(compilation_error(expression, "expression is empty"));
    }

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = expression.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '[' => match chars.next() {
                Some((_, ']')) => {
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::Index);
                }
                Some((_, other)) => {
                    let reason = if expression[pos + 1..].contains(']') {
                        format!(
                            "only '[]' is supported, found '[{}' at position {}",
                            other, pos
                        )
                    } else {
                        format!("unbalanced '[' at position {}", pos)
                    };
                    return Err(compilation_error(expression, reason));
                }
                None => {
                    return Err(compilation_error(
                        expression,
                        format!("unbalanced '[' at position {}", pos),
                    ))
                }
            },
            ']' => {
                return Err(compilation_error(
                    expression,
                    format!("unbalanced ']' at position {}", pos),
                ))
            }
            '*' => {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Wildcard);
            }
            _ => literal.push(ch),
        }
    }
    flush_literal(&mut literal, &mut tokens);

    Ok(tokens)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn compilation_error(expression: &str, reason: impl Into<String>) -> ReconcileError {
    ReconcileError::PatternCompilation {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

/// Regex source for a token list, without the leading anchor.
fn regex_body(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            Token::Literal(text) => regex::escape(text),
            Token::Index => INDEX_GROUP.to_string(),
            Token::Wildcard => WILDCARD_GROUP.to_string(),
        })
        .collect()
}

fn build_regex(expression: &str, source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .build()
        .map_err(|e| compilation_error(expression, e.to_string()))
}

/// A prefix-anchored matcher compiled from a wildcard expression.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    expression: String,
    tokens: Vec<Token>,
    body: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile an expression.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` when the expression is malformed.
    pub fn compile(expression: &str) -> Result<Self> {
        let tokens = tokenize(expression)?;
        let body = regex_body(&tokens);
        let regex = build_regex(expression, &format!("^{}", body))?;

        tracing::debug!(expression, regex = regex.as_str(), "compiled path pattern");

        Ok(Self {
            expression: expression.to_string(),
            tokens,
            body,
            regex,
        })
    }

    /// The expression text this pattern was compiled from
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The anchored regex source
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The prefix of `path` matched by this pattern, if any.
    pub fn matched_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        self.regex.find(path).map(|m| &path[..m.end()])
    }

    /// Replace the matched prefix with the expression text itself.
    ///
    /// `characters.[].age` turns both `characters.0.age` and
    /// `characters.3.age` into `characters.[].age`. Paths that do not match
    /// are returned unchanged.
    pub fn generalize(&self, path: &str) -> String {
        match self.regex.find(path) {
            Some(m) => format!("{}{}", self.expression, &path[m.end()..]),
            None => path.to_string(),
        }
    }

    /// Matcher for display rewriting: this pattern, then a dot, then the
    /// single next segment, then the remainder of the path.
    ///
    /// Capture names are `prefix`, `segment` and `rest`.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` if the extended regex fails to build.
    pub fn next_segment_regex(&self) -> Result<Regex> {
        build_regex(
            &self.expression,
            &format!(
                r"(?s)^(?P<prefix>{})\.(?P<segment>[^.]+)(?P<rest>.*)$",
                self.body
            ),
        )
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}
