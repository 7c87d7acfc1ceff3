//! `{{ … }}` templates embedded in property string values.
//!
//! A property string may interleave plain text with state expressions:
//! `"Hello {{ input1.value }}!"`. A string that is exactly one expression
//! evaluates to the referenced JSON value itself; mixed templates
//! interpolate stringified values. Missing references evaluate to `null`
//! (empty string when interpolated); a component must not fail just because
//! a sibling's state has not materialized yet.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::state::StateStore;

use super::tokenizer::{self, Token};

/// Error from parsing a template or an expression body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// `{{` without a matching `}}`.
    #[error("unterminated expression in `{0}`")]
    Unterminated(String),
    /// The expression body does not match the path grammar.
    #[error("invalid expression `{raw}`: {message}")]
    Invalid { raw: String, message: String },
}

/// One step into a component's state value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object key access.
    Key(String),
    /// Array index access.
    Index(usize),
}

/// A parsed path expression: component id plus state path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    /// The component whose state is read.
    pub component: String,
    /// Path below the state cell. Empty = the whole cell.
    pub path: Vec<Segment>,
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component)?;
        for seg in &self.path {
            match seg {
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// One part of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Literal text, passed through.
    Text(String),
    /// A state expression.
    Expr(PathExpr),
}

/// A parsed template: the alternating text/expression parts of one string.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

/// Quick check whether a string can contain expressions at all.
pub fn contains_expr(input: &str) -> bool {
    input.contains("{{")
}

impl Template {
    /// Parse a property string into a template.
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let mut parts = Vec::new();
        let mut rest = input;
        while let Some(open) = rest.find("{{") {
            if !rest[..open].is_empty() {
                parts.push(Part::Text(rest[..open].to_owned()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or_else(|| ExprError::Unterminated(input.to_owned()))?;
            let body = &after_open[..close];
            parts.push(Part::Expr(parse_path(body)?));
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Text(rest.to_owned()));
        }
        Ok(Self { parts })
    }

    /// The template's parts, in order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether the template contains no expressions.
    pub fn is_pure_text(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Text(_)))
    }

    /// Component ids referenced by this template, deduplicated.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Expr(e) => Some(e.component.clone()),
                Part::Text(_) => None,
            })
            .collect()
    }

    /// Evaluate against the state store.
    ///
    /// A template that is exactly one expression yields the raw JSON value
    /// (or `null` if unresolved). Anything else interpolates into a string.
    pub fn evaluate(&self, store: &StateStore) -> Value {
        if let [Part::Expr(expr)] = self.parts.as_slice() {
            return lookup(store, expr).unwrap_or(Value::Null);
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Expr(expr) => {
                    if let Some(value) = lookup(store, expr) {
                        out.push_str(&stringify(&value));
                    }
                }
            }
        }
        Value::String(out)
    }
}

/// Parse an expression body (`input1.value`, `list.items[2]`) into a path.
fn parse_path(body: &str) -> Result<PathExpr, ExprError> {
    let invalid = |message: &str| ExprError::Invalid {
        raw: body.trim().to_owned(),
        message: message.to_owned(),
    };

    let tokens = tokenizer::tokenize(body)
        .map_err(|offset| invalid(&format!("unexpected character at offset {offset}")))?;
    let mut iter = tokens.into_iter().peekable();

    let component = match iter.next() {
        Some((Token::Ident, text)) => text,
        Some((_, text)) => return Err(invalid(&format!("expected component id, found `{text}`"))),
        None => return Err(invalid("empty expression")),
    };

    let mut path = Vec::new();
    while let Some((token, text)) = iter.next() {
        match token {
            Token::Dot => match iter.next() {
                Some((Token::Ident, key)) => path.push(Segment::Key(key)),
                _ => return Err(invalid("expected key after `.`")),
            },
            Token::BracketOpen => {
                let index = match iter.next() {
                    Some((Token::Number, digits)) => digits
                        .parse::<usize>()
                        .map_err(|_| invalid("index out of range"))?,
                    _ => return Err(invalid("expected index after `[`")),
                };
                match iter.next() {
                    Some((Token::BracketClose, _)) => path.push(Segment::Index(index)),
                    _ => return Err(invalid("expected `]` after index")),
                }
            }
            _ => return Err(invalid(&format!("unexpected `{text}`"))),
        }
    }

    Ok(PathExpr { component, path })
}

/// Resolve a path expression against the store. `None` when any step misses.
fn lookup(store: &StateStore, expr: &PathExpr) -> Option<Value> {
    let cell = store.get(&expr.component)?;
    if expr.path.is_empty() {
        return Some(Value::Object(cell.clone()));
    }
    let mut current: &Value = match &expr.path[0] {
        Segment::Key(key) => cell.get(key)?,
        Segment::Index(_) => return None,
    };
    for seg in &expr.path[1..] {
        current = match seg {
            Segment::Key(key) => current.as_object()?.get(key)?,
            Segment::Index(i) => current.as_array()?.get(*i)?,
        };
    }
    Some(current.clone())
}

/// Interpolation form of a JSON value: strings unquoted, null empty.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
