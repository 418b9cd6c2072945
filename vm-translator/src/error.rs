//! Error taxonomy for the VM translator
//!
//! Same hand-rolled shape as the assembler's `AssemblerError`: a `kind` plus
//! a message, no derive-macro error crate.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    SyntaxError,
}

#[derive(Debug)]
pub struct VmError {
    pub kind: ErrorKind,
    pub message: String,
}

impl VmError {
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
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::SyntaxError => "syntax error",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::InvalidInput, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_kind_and_message() {
        let err = VmError::syntax("unknown arithmetic command 'foo'");
        assert_eq!(
            err.to_string(),
            "syntax error: unknown arithmetic command 'foo'"
        );
    }
}
