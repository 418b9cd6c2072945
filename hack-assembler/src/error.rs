//! Error taxonomy for the Hack assembler
//!
//! One hand-rolled error type per the repo's convention (see
//! [`crate::parser::ParserError`]): a `kind` plus a human-readable message,
//! `Display`/`Error` implemented by hand rather than via a derive macro.

use std::fmt;

/// The kind of failure that stopped assembly.
///
/// Mirrors the taxonomy used across the toolchain: `InvalidInput` for
/// argument/extension problems, `SymbolError` for label/variable binding
/// problems, `EncodingError` for unrecognized instruction mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    SymbolError,
    EncodingError,
}

#[derive(Debug)]
pub struct AssemblerError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AssemblerError {
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
    pub fn symbol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SymbolError, message)
    }

    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EncodingError, message)
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::SymbolError => "symbol error",
            ErrorKind::EncodingError => "encoding error",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for AssemblerError {}
