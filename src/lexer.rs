// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::cmp;
use core::fmt::{self, Debug, Formatter};
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

struct SourceInternal {
    file: String,
    contents: String,
    // Byte offset at which each line starts.
    line_starts: Vec<usize>,
}

/// A template file together with its line table.
#[derive(Clone)]
pub struct Source {
    src: Rc<SourceInternal>,
}

impl cmp::PartialEq for Source {
    fn eq(&self, other: &Source) -> bool {
        Rc::ptr_eq(&self.src, &other.src)
    }
}

impl cmp::Eq for Source {}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: String, contents: String) -> Result<Source> {
        // Spans store u32 offsets.
        let max_size = u32::MAX as usize - 2;
        if contents.len() > max_size {
            bail!("{file} exceeds maximum allowed template file size {max_size}");
        }

        let line_starts = core::iter::once(0)
            .chain(contents.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Ok(Self {
            src: Rc::new(SourceInternal {
                file,
                contents,
                line_starts,
            }),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Source> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => bail!("Failed to read {}. {e}", path.as_ref().display()),
        };
        Self::from_contents(path.as_ref().to_string_lossy().to_string(), contents)
    }

    pub fn file(&self) -> &String {
        &self.src.file
    }

    pub fn contents(&self) -> &String {
        &self.src.contents
    }

    /// Text of the zero based line `idx`, without its line terminator.
    pub fn line(&self, idx: u32) -> &str {
        let starts = &self.src.line_starts;
        let idx = idx as usize;
        let Some(&start) = starts.get(idx) else {
            return "";
        };
        let end = match starts.get(idx + 1) {
            Some(next) => next - 1,
            None => self.src.contents.len(),
        };
        self.src.contents[start..end].trim_end_matches('\r')
    }

    /// Diagnostic pointing at a one based line and column.
    pub fn message(&self, line: u32, col: u32, kind: &str, msg: &str) -> String {
        if line as usize > self.src.line_starts.len() {
            return format!("{}: invalid line {line} specified", self.src.file);
        }

        let width = line.to_string().len() + 1;
        let gutter = " ".repeat(width);
        let caret = " ".repeat((col as usize).saturating_sub(1));
        let text = self.line(line.saturating_sub(1));
        format!(
            "\n--> {}:{line}:{col}\n{gutter}|\n{line:<width$}| {text}\n{gutter}| {caret}^\n{kind}: {msg}",
            self.src.file
        )
    }

    pub fn error(&self, line: u32, col: u32, msg: &str) -> anyhow::Error {
        anyhow!(self.message(line, col, "error", msg))
    }
}

#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn message(&self, kind: &str, msg: &str) -> String {
        self.source.message(self.line, self.col, kind, msg)
    }

    pub fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        const MAX: usize = 32;
        let text = self.text();
        match text.char_indices().nth(MAX) {
            Some((cut, _)) => write!(f, "{}:{} {:?}...", self.line, self.col, &text[..cut]),
            None => write!(f, "{}:{} {:?}", self.line, self.col, text),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Symbol,
    String,
    RawString,
    Number,
    Ident,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token(pub TokenKind, pub Span);

const TWO_CHAR_SYMBOLS: [&str; 6] = ["&&", "||", "==", "!=", "<=", ">="];
const ONE_CHAR_SYMBOLS: &str = "{}[](),:;+-*/%^<>=!";

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    text: &'source str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            text: source.contents(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    // Advance past the next character, keeping line and column current.
    // A tab counts as 4 columns.
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.col = 1;
            }
            '\t' => self.col += 4,
            _ => self.col += 1,
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn span(&self, line: u32, col: u32, start: usize, end: usize) -> Span {
        Span {
            source: self.source.clone(),
            line,
            col,
            start: start as u32,
            end: end as u32,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_nth(1)) {
                (Some(' ' | '\t' | '\r' | '\n'), _) => {
                    self.bump();
                }
                (Some('#'), _) | (Some('/'), Some('/')) => self.bump_while(|c| c != '\n'),
                _ => break,
            }
        }
    }

    // Field paths such as `address.street` and function names such as
    // `string.length` are single identifiers.
    fn read_ident(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        loop {
            self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if self.peek() != Some('.') {
                break;
            }
            if !self
                .peek_nth(1)
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            {
                return Err(self.source.error(
                    self.line,
                    self.col,
                    "`.` must be followed by a member name",
                ));
            }
            self.bump();
        }
        Ok(Token(TokenKind::Ident, self.span(line, col, start, self.pos)))
    }

    // JSON number grammar without the sign, which the parser reads as a
    // unary operator.
    fn read_number(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);

        // A leading zero stands alone.
        if self.bump() != Some('0') {
            self.bump_while(|c| c.is_ascii_digit());
        }

        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            self.bump_while(|c| c.is_ascii_digit());
        }

        let text = &self.text[start..self.pos];
        let trailing = self
            .peek()
            .is_some_and(|c| c == '_' || c == '.' || c.is_ascii_alphanumeric());
        if trailing || text.parse::<f64>().is_err() {
            return Err(self.source.error(line, col, "invalid number"));
        }

        Ok(Token(TokenKind::Number, self.span(line, col, start, self.pos)))
    }

    // The token spans the contents between the quotes, escapes included.
    fn read_string(&mut self) -> Result<Token> {
        let (quote, line, col) = (self.pos, self.line, self.col);
        self.bump();

        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.source.error(line, col, "unmatched \"")),
                Some('"') => break,
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) if c < '\u{0020}' => {
                    return Err(self.source.error(
                        self.line,
                        self.col,
                        "invalid character in string",
                    ))
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let end = self.pos;
        self.bump();

        if let Err(e) = serde_json::from_str::<String>(&self.text[quote..self.pos]) {
            bail!(
                "{} {e}",
                self.source.error(line, col, "invalid escape sequence:")
            );
        }

        Ok(Token(
            TokenKind::String,
            self.span(line, col + 1, quote + 1, end),
        ))
    }

    // Raw strings may span lines and have no escapes.
    fn read_raw_string(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        self.bump();
        let start = self.pos;
        self.bump_while(|c| c != '`');
        if self.peek().is_none() {
            return Err(self.source.error(line, col, "unmatched `"));
        }
        let end = self.pos;
        self.bump();

        Ok(Token(
            TokenKind::RawString,
            self.span(line, col + 1, start, end),
        ))
    }

    fn read_symbol(&mut self, ch: char) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        let rest = &self.text[start..];

        let len = if TWO_CHAR_SYMBOLS.iter().any(|s| rest.starts_with(s)) {
            2
        } else if ONE_CHAR_SYMBOLS.contains(ch) {
            1
        } else if ch == '&' || ch == '|' {
            return Err(self
                .source
                .error(line, col, &format!("expecting `{ch}{ch}`")));
        } else {
            return Err(self.source.error(line, col, "invalid character"));
        };

        for _ in 0..len {
            self.bump();
        }
        Ok(Token(TokenKind::Symbol, self.span(line, col, start, self.pos)))
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let Some(ch) = self.peek() else {
            return Ok(Token(
                TokenKind::Eof,
                self.span(self.line, self.col, self.pos, self.pos),
            ));
        };

        match ch {
            '"' => self.read_string(),
            '`' => self.read_raw_string(),
            _ if ch.is_ascii_digit() => self.read_number(),
            _ if ch.is_ascii_alphabetic() || ch == '_' => self.read_ident(),
            _ => self.read_symbol(ch),
        }
    }
}
