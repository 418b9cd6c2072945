//! Line-oriented VM command parser.
//!
//! Comments and blank lines are stripped up front; each remaining line is
//! split into whitespace-separated parts once and cached, since `arg1`/
//! `arg2` are called at least once per command during translation.

use crate::error::VmError;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

pub struct Parser {
    lines: Vec<String>,
    current_line: usize,
    current_command: String,
    /// Cached parts of the current command to avoid repeated parsing
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(filename: &str) -> Result<Self, VmError> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                &line
            };

            let trimmed = line.trim();

            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        Ok(Self {
            lines,
            current_line: 0,
            current_command: String::new(),
            cached_parts: Vec::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            std::mem::swap(
                &mut self.current_command,
                &mut self.lines[self.current_line],
            );

            self.cached_parts.clear();
            self.cached_parts.extend(
                self.current_command
                    .split_whitespace()
                    .map(str::to_string),
            );

            self.current_line += 1;
        }
    }

    #[inline]
    #[must_use]
    pub fn command_type(&self) -> CommandType {
        debug_assert!(!self.cached_parts.is_empty(), "Empty command");

        match self.cached_parts[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        }
    }

    /// First argument of the current command (the arithmetic mnemonic
    /// itself, for `Arithmetic` commands).
    ///
    /// # Errors
    /// Returns a `SyntaxError` if the command has no first argument
    /// (malformed source, or called on `Return`).
    #[inline]
    pub fn arg1(&self) -> Result<&str, VmError> {
        match self.command_type() {
            CommandType::Arithmetic => Ok(&self.cached_parts[0]),
            CommandType::Return => Err(VmError::syntax("'return' takes no arguments")),
            _ => self
                .cached_parts
                .get(1)
                .map(String::as_str)
                .ok_or_else(|| VmError::syntax(format!("missing argument in '{}'", self.current_command))),
        }
    }

    /// Second argument of the current command (the index/arg-count).
    ///
    /// # Errors
    /// Returns a `SyntaxError` if the command has no second argument, or it
    /// isn't a valid integer.
    #[inline]
    pub fn arg2(&self) -> Result<i32, VmError> {
        match self.command_type() {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                self.cached_parts
                    .get(2)
                    .ok_or_else(|| VmError::syntax(format!("missing argument in '{}'", self.current_command)))?
                    .parse()
                    .map_err(|_| VmError::syntax(format!("invalid integer argument in '{}'", self.current_command)))
            }
            _ => Err(VmError::syntax(
                "arg2 is only valid for push/pop/function/call",
            )),
        }
    }
}
