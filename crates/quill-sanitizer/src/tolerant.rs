//! Tolerant recursive-descent parser for object-literal style text
//!
//! Last-resort tier for provider output that is structured in spirit but
//! not valid JSON: bare keys, single-quoted strings, trailing commas.
//! This is a real grammar over a JSON superset, never an expression
//! evaluator, so hostile text cannot execute anything.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Error from the tolerant parser, with the byte offset that failed
#[derive(Debug, Error)]
#[error("tolerant parse error at byte {pos}: {message}")]
pub struct TolerantParseError {
    pub pos: usize,
    pub message: String,
}

/// Parse a loosely-formatted object literal into a value
pub fn parse(input: &str) -> Result<Value, TolerantParseError> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(parser.error("trailing characters after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> TolerantParseError {
        TolerantParseError {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value, TolerantParseError> {
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') | Some(b'\'') => Ok(Value::String(self.parse_string()?)),
            Some(b't') | Some(b'f') | Some(b'n') => self.parse_literal(),
            Some(c) if c == b'-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c as char))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value, TolerantParseError> {
        self.bump(); // '{'
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(b',') => {
                    // Tolerate stray and trailing commas
                    self.bump();
                    continue;
                }
                Some(_) => {}
                None => return Err(self.error("unterminated object")),
            }

            let key = self.parse_key()?;
            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(self.error(format!("expected ':' after key \"{}\"", key)));
            }
            self.bump();
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b'}') => {}
                Some(c) => {
                    return Err(self.error(format!(
                        "expected ',' or '}}' after value, found '{}'",
                        c as char
                    )))
                }
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, TolerantParseError> {
        self.bump(); // '['
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(b',') => {
                    self.bump();
                    continue;
                }
                Some(_) => {}
                None => return Err(self.error("unterminated array")),
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b']') => {}
                Some(c) => {
                    return Err(self.error(format!(
                        "expected ',' or ']' after element, found '{}'",
                        c as char
                    )))
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// Object keys may be quoted (either quote style) or bare identifiers
    fn parse_key(&mut self) -> Result<String, TolerantParseError> {
        match self.peek() {
            Some(b'"') | Some(b'\'') => self.parse_string(),
            Some(c) if c == b'_' || c.is_ascii_alphanumeric() => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c == b'_' || c.is_ascii_alphanumeric()) {
                    self.pos += 1;
                }
                Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
            }
            Some(c) => Err(self.error(format!("invalid key start '{}'", c as char))),
            None => Err(self.error("unexpected end of input in key")),
        }
    }

    fn parse_string(&mut self) -> Result<String, TolerantParseError> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();

        loop {
            match self.bump() {
                Some(b) if b == quote => return Ok(out),
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push('\n'),
                    Some(b't') => out.push('\t'),
                    Some(b'r') => out.push('\r'),
                    Some(b'b') => out.push('\u{0008}'),
                    Some(b'f') => out.push('\u{000C}'),
                    Some(b'u') => out.push(self.parse_unicode_escape()?),
                    // Quotes, backslashes, and anything unknown pass through
                    Some(other) => out.push(other as char),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(b) if b.is_ascii() => out.push(b as char),
                Some(_) => {
                    // Re-read a full UTF-8 scalar starting at this byte
                    let start = self.pos - 1;
                    let rest = std::str::from_utf8(&self.input[start..])
                        .map_err(|_| self.error("invalid UTF-8 in string"))?;
                    let ch = rest.chars().next().ok_or_else(|| {
                        self.error("unterminated string")
                    })?;
                    out.push(ch);
                    self.pos = start + ch.len_utf8();
                }
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, TolerantParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|b| (b as char).to_digit(16))
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(char::from_u32(code).unwrap_or('\u{FFFD}'))
    }

    fn parse_literal(&mut self) -> Result<Value, TolerantParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        match &self.input[start..self.pos] {
            b"true" => Ok(Value::Bool(true)),
            b"false" => Ok(Value::Bool(false)),
            b"null" => Ok(Value::Null),
            other => Err(TolerantParseError {
                pos: start,
                message: format!(
                    "unknown literal \"{}\"",
                    String::from_utf8_lossy(other)
                ),
            }),
        }
    }

    fn parse_number(&mut self) -> Result<Value, TolerantParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E' | b'+' | b'-')
        ) {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;

        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        let f = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number \"{}\"", text)))?;
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("non-finite number \"{}\"", text)))
    }
}
