//! Token model for the Jack language.
//!
//! A tagged sum type in place of the source's `Token`/`KeywordToken`/
//! `SymbolToken`/... class hierarchy — one enum, matched at use sites.

use phf::phf_set;

/// The fixed Jack keyword set.
///
/// `boolean` is the only accepted spelling of the boolean type keyword;
/// `bool` is treated as a plain identifier rather than a keyword synonym.
pub static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "class", "constructor", "function", "method",
    "field", "static", "var",
    "int", "char", "boolean", "void",
    "true", "false", "null", "this",
    "let", "do", "if", "else", "while", "return",
};

/// The fixed Jack symbol set (single-character tokens).
pub const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(String),
    Symbol(char),
    IntConst(u16),
    StringConst(String),
    Identifier(String),
}

impl Token {
    /// The keyword text, if this is a keyword token matching `word`.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == word)
    }

    #[must_use]
    pub fn is_symbol(&self, ch: char) -> bool {
        matches!(self, Token::Symbol(c) if *c == ch)
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name.as_str()),
            _ => None,
        }
    }
}
