// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Printable term text: parser and canonical printer.
//!
//! The subset the batch surface needs: atoms (bare and quoted), integers,
//! floats, double-quoted strings, lists, and tuples. An optional trailing
//! full stop is accepted on input. The printer emits the canonical form
//! (no whitespace between elements) that [`parse`] round-trips.

use thiserror::Error;

/// A parsed term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atom(String),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Term>),
    Tuple(Vec<Term>),
}

impl Term {
    pub fn atom(s: impl Into<String>) -> Self {
        Term::Atom(s.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Term::Str(s.into())
    }

    pub fn tuple(items: impl Into<Vec<Term>>) -> Self {
        Term::Tuple(items.into())
    }

    pub fn list(items: impl Into<Vec<Term>>) -> Self {
        Term::List(items.into())
    }
}

/// Errors from term parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character {found:?} at byte {at}")]
    Unexpected { at: usize, found: char },

    #[error("bad escape sequence '\\{0}'")]
    BadEscape(char),

    #[error("malformed number at byte {0}")]
    BadNumber(usize),

    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}

/// Parse a complete term from `input`.
pub fn parse(input: &str) -> Result<Term, TermError> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_ws();
    let term = parser.term()?;
    parser.skip_ws();
    if parser.eat('.') {
        parser.skip_ws();
    }
    if parser.pos < parser.input.len() {
        return Err(TermError::TrailingInput(parser.pos));
    }
    Ok(term)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn term(&mut self) -> Result<Term, TermError> {
        match self.peek() {
            None => Err(TermError::UnexpectedEof),
            Some('[') => {
                self.pos += 1;
                self.sequence(']').map(Term::List)
            }
            Some('{') => {
                self.pos += 1;
                self.sequence('}').map(Term::Tuple)
            }
            Some('"') => {
                self.pos += 1;
                self.delimited('"').map(Term::Str)
            }
            Some('\'') => {
                self.pos += 1;
                self.delimited('\'').map(Term::Atom)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_lowercase() => Ok(Term::Atom(self.bare_atom())),
            Some(found) => Err(TermError::Unexpected { at: self.pos, found }),
        }
    }

    /// Comma-separated terms up to `close`; the opener is already consumed.
    fn sequence(&mut self, close: char) -> Result<Vec<Term>, TermError> {
        let mut items = Vec::new();
        self.skip_ws();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.term()?);
            self.skip_ws();
            if self.eat(',') {
                self.skip_ws();
                continue;
            }
            if self.eat(close) {
                return Ok(items);
            }
            return match self.peek() {
                None => Err(TermError::UnexpectedEof),
                Some(found) => Err(TermError::Unexpected { at: self.pos, found }),
            };
        }
    }

    /// Body of a quoted string or atom; the opening delimiter is consumed.
    fn delimited(&mut self, delim: char) -> Result<String, TermError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(TermError::UnexpectedEof),
                Some('\\') => match self.bump() {
                    None => return Err(TermError::UnexpectedEof),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) if c == '\\' || c == '"' || c == '\'' => out.push(c),
                    Some(c) => return Err(TermError::BadEscape(c)),
                },
                Some(c) if c == delim => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn bare_atom(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '@') {
            self.pos += 1;
        }
        self.input[start..self.pos].to_string()
    }

    fn number(&mut self) -> Result<Term, TermError> {
        let start = self.pos;
        self.eat('-');
        let mut is_float = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.')
            && self.input[self.pos + 1..].chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = &self.input[start..self.pos];
        if is_float {
            text.parse::<f64>().map(Term::Float).map_err(|_| TermError::BadNumber(start))
        } else {
            text.parse::<i64>().map(Term::Int).map_err(|_| TermError::BadNumber(start))
        }
    }
}

/// True if the atom text prints without quoting.
fn bare_printable(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@')
}

fn write_escaped(f: &mut std::fmt::Formatter<'_>, s: &str, delim: char) -> std::fmt::Result {
    use std::fmt::Write;
    f.write_char(delim)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c == delim => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(delim)
}

fn write_seq(
    f: &mut std::fmt::Formatter<'_>,
    items: &[Term],
    open: char,
    close: char,
) -> std::fmt::Result {
    use std::fmt::Write;
    f.write_char(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{item}")?;
    }
    f.write_char(close)
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Atom(s) if bare_printable(s) => f.write_str(s),
            Term::Atom(s) => write_escaped(f, s, '\''),
            Term::Int(n) => write!(f, "{n}"),
            Term::Float(x) => write!(f, "{x:?}"),
            Term::Str(s) => write_escaped(f, s, '"'),
            Term::List(items) => write_seq(f, items, '[', ']'),
            Term::Tuple(items) => write_seq(f, items, '{', '}'),
        }
    }
}

#[cfg(test)]
#[path = "term_tests.rs"]
mod tests;
