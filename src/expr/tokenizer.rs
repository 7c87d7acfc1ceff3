//! logos-based lexer for the state-expression path language.
//!
//! An expression body (the text between `{{` and `}}`) is a component id
//! followed by a dotted/indexed path into its state:
//!
//! ```text
//! input1.value
//! list.items[2].label
//! form
//! ```
//!
//! Identifiers allow `-` (component ids are free-form editor strings), which
//! means a leading `-` never starts a number here; indices are unsigned.

use logos::Logos;

/// Token produced by the expression lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Component id or object key: `input1`, `my-form`, `_private`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// Unsigned array index.
    #[regex(r"[0-9]+")]
    Number,

    /// `.`
    #[token(".")]
    Dot,

    /// `[`
    #[token("[")]
    BracketOpen,

    /// `]`
    #[token("]")]
    BracketClose,
}

/// Tokenize an expression body into `(Token, text)` pairs.
///
/// Returns the byte offset of the first unlexable character, if any.
pub fn tokenize(input: &str) -> Result<Vec<(Token, String)>, usize> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    for (result, span) in lexer.spanned() {
        match result {
            Ok(token) => tokens.push((token, input[span].to_string())),
            Err(()) => return Err(span.start),
        }
    }
    Ok(tokens)
}

// ===========================================================================
// Tests
// ===========================================================================
