use crate::app::token::{Token, TokenKind, EOF_TEXT, NEWLINE_TEXT};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 4096;

/// Pull-based tokenizer over a buffered byte stream.
///
/// The lexer never fails on malformed text. Problems such as a missing closing
/// quote or `12ab` are reported through dedicated token kinds and left to the
/// parser to reject.
pub struct Lexer<R> {
    source: PathBuf,
    reader: R,
    buffer: Vec<u8>,
    buffer_pos: usize,
    buffer_len: usize,
    current: Option<u8>,
    line: usize,
    column: usize,
    read_error: Option<io::Error>,
}

impl Lexer<File> {
    /// Opens `path` for tokenizing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(file, path))
    }
}

impl<R: Read> Lexer<R> {
    /// Wraps an arbitrary reader. `source` is only used in diagnostics.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        let mut lexer = Self {
            source: source.into(),
            reader,
            buffer: vec![0; CHUNK_SIZE],
            buffer_pos: 0,
            buffer_len: 0,
            current: None,
            line: 1,
            column: 1,
            read_error: None,
        };
        lexer.current = lexer.read_byte();
        lexer
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The error that cut the input short, if reading failed mid-stream.
    pub fn read_error(&self) -> Option<&io::Error> {
        self.read_error.as_ref()
    }

    /// Produces the next token. Returns `EndOfInput` forever once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Token {
        while let Some(byte) = self.current {
            if self.column == 1 && is_indent_byte(byte) {
                return self.scan_indent();
            }

            match byte {
                b'\n' => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    return Token::new(TokenKind::Newline, line, column, NEWLINE_TEXT);
                }
                b if b.is_ascii_whitespace() => self.advance(),
                b if is_identifier_start(b) => return self.scan_identifier(),
                b if b.is_ascii_digit() => return self.scan_number(),
                b'"' | b'\'' => return self.scan_string(),
                b'#' => self.skip_comment(),
                _ => return self.scan_symbol(),
            }
        }

        Token::new(TokenKind::EndOfInput, self.line, self.column, EOF_TEXT)
    }

    fn fill_buffer(&mut self) -> bool {
        if self.read_error.is_some() {
            return false;
        }

        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(len) => {
                    self.buffer_pos = 0;
                    self.buffer_len = len;
                    return len > 0;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    log::error!("Failed to read {}: {}", self.source.display(), err);
                    self.read_error = Some(err);
                    return false;
                }
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.buffer_pos >= self.buffer_len && !self.fill_buffer() {
            return None;
        }

        let byte = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(byte)
    }

    /// Moves to the next byte, keeping line and column on character starts.
    fn advance(&mut self) {
        let Some(previous) = self.current else {
            return;
        };

        self.current = self.read_byte();

        if previous == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if self.current.map_or(true, |b| !is_continuation_byte(b)) {
            self.column += 1;
        }
    }

    /// Consumes the current byte and any UTF-8 continuation bytes after it.
    fn bump_char(&mut self, text: &mut Vec<u8>) {
        if let Some(byte) = self.current {
            text.push(byte);
            self.advance();
        }
        while let Some(byte) = self.current.filter(|b| is_continuation_byte(*b)) {
            text.push(byte);
            self.advance();
        }
    }

    fn scan_indent(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = Vec::new();
        let mut has_spaces = false;
        let mut has_tabs = false;

        while let Some(byte) = self.current.filter(|b| is_indent_byte(*b)) {
            has_spaces |= byte == b' ';
            has_tabs |= byte == b'\t';
            text.push(byte);
            self.advance();
        }

        let kind = match (has_spaces, has_tabs) {
            (true, true) => TokenKind::IndentMixed,
            (true, false) => TokenKind::IndentSpaces,
            _ => TokenKind::IndentTabs,
        };
        Token::new(kind, line, column, into_text(text))
    }

    fn scan_identifier(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = Vec::new();

        while let Some(byte) = self.current.filter(|b| is_identifier_byte(*b)) {
            text.push(byte);
            self.advance();
        }

        Token::new(TokenKind::Identifier, line, column, into_text(text))
    }

    fn scan_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = Vec::new();

        while let Some(byte) = self.current.filter(u8::is_ascii_digit) {
            text.push(byte);
            self.advance();
        }

        if self.current.map_or(false, is_identifier_start) {
            while let Some(byte) = self.current.filter(|b| is_identifier_byte(*b)) {
                text.push(byte);
                self.advance();
            }
            return Token::new(TokenKind::InvalidNumber, line, column, into_text(text));
        }

        Token::new(TokenKind::ValidInteger, line, column, into_text(text))
    }

    fn scan_string(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let Some(quote) = self.current else {
            return Token::new(TokenKind::EndOfInput, line, column, EOF_TEXT);
        };
        let mut text = Vec::new();
        self.advance();

        loop {
            match self.current {
                None | Some(b'\n') => {
                    let mut partial = vec![quote];
                    partial.extend(text);
                    return Token::new(
                        TokenKind::UnterminatedString,
                        line,
                        column,
                        into_text(partial),
                    );
                }
                Some(byte) if byte == quote => {
                    self.advance();
                    return Token::new(TokenKind::String, line, column, into_text(text));
                }
                Some(b'\\') => {
                    text.push(b'\\');
                    self.advance();
                    // An escaped newline still ends the line.
                    if self.current != Some(b'\n') {
                        self.bump_char(&mut text);
                    }
                }
                Some(_) => self.bump_char(&mut text),
            }
        }
    }

    fn scan_symbol(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = Vec::new();
        self.bump_char(&mut text);

        let kind = match text.as_slice() {
            b":" => TokenKind::Assign,
            b"+" | b"-" => TokenKind::PathIndicator,
            _ => TokenKind::Symbol,
        };
        Token::new(kind, line, column, into_text(text))
    }

    fn skip_comment(&mut self) {
        while self.current.map_or(false, |b| b != b'\n') {
            self.advance();
        }
    }
}

fn into_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn is_indent_byte(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}
