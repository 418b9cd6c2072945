//! Error taxonomy for the Jack tokenizer, parser, and code generator.
//!
//! Same hand-rolled `kind` + `message` shape as the other two crates in this
//! toolchain (see `hack_assembler::error::AssemblerError`).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    LexicalError,
    SyntaxError,
    SymbolError,
}

#[derive(Debug)]
pub struct JackError {
    pub kind: ErrorKind,
    pub message: String,
}

impl JackError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    #[must_use]
    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LexicalError, message)
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    #[must_use]
    pub fn symbol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SymbolError, message)
    }
}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::LexicalError => "lexical error",
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::SymbolError => "symbol error",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for JackError {}

impl From<std::io::Error> for JackError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::InvalidInput, err.to_string())
    }
}
