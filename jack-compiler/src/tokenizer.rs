//! Jack source -> token stream.
//!
//! Comments are stripped in two passes (block comments, then line comments)
//! before the token scan itself, matching the two-phase preprocessing the
//! reference tokenizer performs.

use crate::error::JackError;
use crate::token::{KEYWORDS, SYMBOLS, Token};

/// Tokenizes a full Jack source file.
///
/// # Errors
/// `LexicalError` on an unterminated block comment, unterminated string
/// constant, or an identifier that starts with a digit. `SyntaxError` if the
/// token stream doesn't start with `class` and end with `}`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, JackError> {
    let without_block_comments = strip_block_comments(source)?;
    let without_comments = strip_line_comments(&without_block_comments);
    let tokens = scan(&without_comments)?;
    validate_top_level(&tokens)?;
    Ok(tokens)
}

/// Strips `/* ... */` comments. Greedy and non-nesting: the first `*/`
/// found closes the comment, regardless of any `/*` encountered inside it.
fn strip_block_comments(source: &str) -> Result<String, JackError> {
    let mut result = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            match source[i + 2..].find("*/") {
                Some(offset) => i += 2 + offset + 2,
                None => return Err(JackError::lexical("unterminated block comment")),
            }
        } else {
            result.push(bytes[i] as char);
            i += 1;
        }
    }
    Ok(result)
}

/// Strips `// ...` to end-of-line, skipping `//` that appears inside a
/// string constant.
fn strip_line_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let bytes = line.as_bytes();
        let mut in_string = false;
        let mut cut = line.len();
        let mut j = 0;
        while j < bytes.len() {
            match bytes[j] {
                b'"' => in_string = !in_string,
                b'/' if !in_string && bytes.get(j + 1) == Some(&b'/') => {
                    cut = j;
                    break;
                }
                _ => {}
            }
            j += 1;
        }
        out.push_str(&line[..cut]);
    }
    out
}

fn scan(source: &str) -> Result<Vec<Token>, JackError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut acc = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            flush(&mut acc, &mut tokens)?;
            chars.next();
        } else if c == '"' {
            flush(&mut acc, &mut tokens)?;
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\n') | None => {
                        return Err(JackError::lexical("unterminated string constant"));
                    }
                    Some(ch) => s.push(ch),
                }
            }
            tokens.push(Token::StringConst(s));
        } else if SYMBOLS.contains(c) {
            flush(&mut acc, &mut tokens)?;
            tokens.push(Token::Symbol(c));
            chars.next();
        } else {
            acc.push(c);
            chars.next();
        }
    }
    flush(&mut acc, &mut tokens)?;
    Ok(tokens)
}

fn flush(acc: &mut String, tokens: &mut Vec<Token>) -> Result<(), JackError> {
    if acc.is_empty() {
        return Ok(());
    }
    tokens.push(classify(acc)?);
    acc.clear();
    Ok(())
}

fn classify(acc: &str) -> Result<Token, JackError> {
    let first = acc
        .chars()
        .next()
        .expect("flush only calls classify on a non-empty accumulator");

    if first.is_ascii_digit() {
        if !acc.chars().all(|c| c.is_ascii_digit()) {
            return Err(JackError::lexical(format!(
                "identifier '{acc}' must not begin with a digit"
            )));
        }
        let value: u32 = acc
            .parse()
            .map_err(|_| JackError::lexical(format!("malformed integer constant '{acc}'")))?;
        if value > 32767 {
            return Err(JackError::lexical(format!(
                "integer constant '{acc}' out of range"
            )));
        }
        return Ok(Token::IntConst(u16::try_from(value).unwrap()));
    }

    if KEYWORDS.contains(acc) {
        return Ok(Token::Keyword(acc.to_string()));
    }

    Ok(Token::Identifier(acc.to_string()))
}

fn validate_top_level(tokens: &[Token]) -> Result<(), JackError> {
    let starts_with_class = matches!(tokens.first(), Some(Token::Keyword(k)) if k == "class");
    let ends_with_brace = matches!(tokens.last(), Some(Token::Symbol('}')));
    if starts_with_class && ends_with_brace {
        Ok(())
    } else {
        Err(JackError::syntax(
            "a Jack file must start with 'class' and end with '}'",
        ))
    }
}
