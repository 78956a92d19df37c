//! Recursive-descent parser for comprexxion configuration files.
//!
//! Top-level lines have the shape `identifier : value`. The `structure`
//! identifier takes an indented block instead of a scalar:
//!
//! ```text
//! structure:
//!     + d "src"
//!         + f "main.c"
//!         + d "lib" *
//!     + f "README.md"
//! ```
//!
//! Parsing stops at the first error.

use crate::app::lexer::Lexer;
use crate::app::models::{ConfigValue, Schema, ValueKind};
use crate::app::token::{Token, TokenKind};
use crate::app::tree::{DirTree, NodeType, TreeError};
use std::collections::HashSet;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("Identifier expected, but got '{0}'")]
    IdentifierExpected(String),
    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("Duplicate identifier '{0}'")]
    DuplicateIdentifier(String),
    #[error("Expected ':' after '{0}'")]
    ExpectedAssign(String),
    #[error("Expected valid {expected} for '{identifier}' but got '{found}'")]
    TypeMismatch {
        expected: String,
        identifier: String,
        found: String,
    },
    #[error("Unterminated string {0}")]
    UnterminatedString(String),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("The value for '{0}' cannot be an empty string")]
    EmptyString(String),
    #[error("Invalid int32 value '{0}'")]
    IntegerOverflow(String),
    #[error("Expected newline but got '{0}'")]
    ExpectedNewline(String),
    #[error("Expected spaces or tabs after newline, but got '{0}'")]
    ExpectedIndentation(String),
    #[error("Mixed spaces and tabs")]
    MixedIndentation,
    #[error("Expected {expected} after newline, but got {found}")]
    IndentStyleMismatch { expected: String, found: String },
    #[error("Extra indentation of {0} character(s)")]
    ExtraIndentation(usize),
    #[error("Expected {expected} blocks of indentation, but got {found}")]
    IndentLevel { expected: usize, found: usize },
    #[error("Cannot nest under a file: expected at most {expected} blocks of indentation, but got {found}")]
    NestedUnderFile { expected: usize, found: usize },
    #[error("Expected path indicator (+/-), but got '{0}'")]
    ExpectedPathIndicator(String),
    #[error("Invalid path indicator '{0}'")]
    InvalidPathIndicator(String),
    #[error("Redundant usage: '+' is not allowed within a block with '*'")]
    RedundantUsage,
    #[error("Expected identifier (f/d), but got '{0}'")]
    ExpectedPathType(String),
    #[error("Invalid identifier '{0}'")]
    InvalidPathType(String),
    #[error("Expected string, but got '{0}'")]
    ExpectedPath(String),
    #[error("The path cannot be an empty string")]
    EmptyPath,
    #[error("Invalid path name '{0}'")]
    InvalidPathName(String),
    #[error("The '*' symbol can only be used in directories")]
    SelectAllOnFile,
    #[error("Duplicate path '{0}'")]
    DuplicatePath(String),
    #[error("Cannot select all of '{path}': {source}")]
    SelectAll { path: String, source: TreeError },
    #[error("Failed to read input: {0}")]
    Read(String),
}

/// A parse failure located at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("File \"{}:{line}:{column}\"\nError: {kind}", .path.display())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open \"{}\"", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Opens `path` and parses it into `schema`.
pub fn parse_file(path: impl AsRef<Path>, schema: &mut Schema) -> Result<(), LoadError> {
    let path = path.as_ref();
    let lexer = Lexer::open(path).map_err(|source| LoadError::Open {
        path: absolute(path),
        source,
    })?;
    Parser::new(lexer).parse(schema)?;
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Paths-block bookkeeping carried from one entry line to the next.
struct BlockState {
    /// Width and style of one indentation level, set by the first entry.
    unit: Option<(usize, TokenKind)>,
    last_level: usize,
    last_type: NodeType,
    select_all: bool,
}

pub struct Parser<R> {
    lexer: Lexer<R>,
    token: Token,
    path: PathBuf,
}

impl<R: Read> Parser<R> {
    pub fn new(lexer: Lexer<R>) -> Self {
        let path = absolute(lexer.source());
        Self {
            lexer,
            token: Token::begin_of_input(),
            path,
        }
    }

    /// Parses the whole input, storing every assigned value in `schema`.
    ///
    /// On error the schema may hold values assigned before the failing line.
    pub fn parse(mut self, schema: &mut Schema) -> Result<(), ParseError> {
        let mut assigned = HashSet::new();

        if self.is(TokenKind::BeginOfInput) {
            self.advance();
        }

        loop {
            self.skip_empty_lines();
            if self.is(TokenKind::EndOfInput) {
                break;
            }

            if !self.is(TokenKind::Identifier) {
                let found = self.token.text().to_string();
                return Err(self.fail(ParseErrorKind::IdentifierExpected(found)));
            }

            let identifier = self.token.text().to_string();
            let line = self.token.line();
            let Some(kind) = schema.kind_of(&identifier) else {
                return Err(self.fail(ParseErrorKind::UnknownIdentifier(identifier)));
            };
            if !assigned.insert(identifier.clone()) {
                return Err(self.fail(ParseErrorKind::DuplicateIdentifier(identifier)));
            }

            self.advance();
            if !self.is(TokenKind::Assign) {
                return Err(self.fail(ParseErrorKind::ExpectedAssign(identifier)));
            }
            self.advance();

            let value = match kind {
                ValueKind::PathsBlock => {
                    let root_name = schema.project_root().to_string();
                    self.parse_paths_block(root_name)?
                }
                scalar => {
                    let value = self.parse_scalar(&identifier, scalar)?;
                    self.advance();
                    if !self.is(TokenKind::Newline) && !self.is(TokenKind::EndOfInput) {
                        let found = self.token.text().to_string();
                        return Err(self.fail(ParseErrorKind::ExpectedNewline(found)));
                    }
                    value
                }
            };

            log::debug!("{} assigned at line {}", identifier, line);
            if let Err(err) = schema.set(&identifier, value) {
                // parse_scalar only yields values of the requested kind
                log::error!("{}", err);
            }
        }

        match self.lexer.read_error() {
            Some(err) => {
                let kind = ParseErrorKind::Read(err.to_string());
                Err(self.fail(kind))
            }
            None => Ok(()),
        }
    }

    fn parse_scalar(
        &mut self,
        identifier: &str,
        kind: ValueKind,
    ) -> Result<ConfigValue, ParseError> {
        let text = self.token.text().to_string();

        match self.token.kind() {
            TokenKind::UnterminatedString if kind == ValueKind::String => {
                return Err(self.fail(ParseErrorKind::UnterminatedString(text)));
            }
            TokenKind::InvalidNumber if kind == ValueKind::Integer => {
                return Err(self.fail(ParseErrorKind::InvalidNumber(text)));
            }
            found if Some(found) != kind.token_kind() => {
                return Err(self.fail(ParseErrorKind::TypeMismatch {
                    expected: kind.describe(),
                    identifier: identifier.to_string(),
                    found: text,
                }));
            }
            _ => {}
        }

        match kind {
            ValueKind::Integer => match text.parse::<i32>() {
                Ok(value) => Ok(ConfigValue::Integer(value)),
                Err(_) => Err(self.fail(ParseErrorKind::IntegerOverflow(text))),
            },
            _ if text.is_empty() => {
                Err(self.fail(ParseErrorKind::EmptyString(identifier.to_string())))
            }
            _ => Ok(ConfigValue::Text(text)),
        }
    }

    /// Parses the indented entries following `structure:` into a tree rooted
    /// at `root_name`.
    ///
    /// The indentation of the first entry line fixes the unit every later
    /// line must be a multiple of. The block ends at end of input or at an
    /// unindented identifier, which starts the next top-level line.
    fn parse_paths_block(&mut self, root_name: String) -> Result<ConfigValue, ParseError> {
        if !self.is(TokenKind::Newline) {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::ExpectedNewline(found)));
        }
        self.skip_empty_lines();

        if !self.token.kind().is_indent() {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::ExpectedIndentation(found)));
        }

        let mut state = BlockState {
            unit: None,
            last_level: 1,
            last_type: NodeType::File,
            select_all: false,
        };
        let mut tree = DirTree::new(root_name);

        loop {
            match self.token.kind() {
                TokenKind::EndOfInput | TokenKind::Identifier => break,
                kind if kind.is_indent() => {}
                _ => {
                    let found = self.token.text().to_string();
                    return Err(self.fail(ParseErrorKind::ExpectedIndentation(found)));
                }
            }

            let indent = self.advance();

            // Whitespace or comment only line
            if self.is(TokenKind::Newline) || self.is(TokenKind::EndOfInput) {
                self.skip_empty_lines();
                continue;
            }

            let unit_size = self.check_indent_style(&indent, &mut state)?;
            self.parse_entry(&indent, unit_size, &mut state, &mut tree)?;
        }

        log::debug!("Paths block parsed with {} node(s)", tree.len());
        Ok(ConfigValue::Tree(tree))
    }

    /// Validates `indent` against the block's unit, fixing the unit on the
    /// first entry line. Returns the unit size.
    fn check_indent_style(
        &self,
        indent: &Token,
        state: &mut BlockState,
    ) -> Result<usize, ParseError> {
        if indent.is(TokenKind::IndentMixed) {
            return Err(self.fail_at(indent, ParseErrorKind::MixedIndentation));
        }

        match state.unit {
            None => {
                state.unit = Some((indent.width(), indent.kind()));
                Ok(indent.width())
            }
            Some((size, style)) if style == indent.kind() => Ok(size),
            Some((_, style)) => Err(self.fail_at(
                indent,
                ParseErrorKind::IndentStyleMismatch {
                    expected: style.describe(),
                    found: indent.kind().describe(),
                },
            )),
        }
    }

    /// Parses one `+ d "name" [*]` line whose indentation is `indent`.
    fn parse_entry(
        &mut self,
        indent: &Token,
        unit_size: usize,
        state: &mut BlockState,
        tree: &mut DirTree,
    ) -> Result<(), ParseError> {
        let width = indent.width();
        let level = width / unit_size;
        let extra = width % unit_size;

        if level > state.last_level + 1 {
            return Err(self.fail_at(
                indent,
                ParseErrorKind::IndentLevel {
                    expected: state.last_level + 1,
                    found: level,
                },
            ));
        }
        if extra > 0 {
            return Err(self.fail_at(indent, ParseErrorKind::ExtraIndentation(extra)));
        }
        if level > state.last_level && state.last_type != NodeType::Directory {
            return Err(self.fail_at(
                indent,
                ParseErrorKind::NestedUnderFile {
                    expected: state.last_level,
                    found: level,
                },
            ));
        }

        if !self.is(TokenKind::PathIndicator) {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::ExpectedPathIndicator(found)));
        }
        // TODO: support '-' once excluded paths can be removed from a '*' import
        if self.token.text() != "+" {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::InvalidPathIndicator(found)));
        }
        if level > state.last_level && state.select_all {
            return Err(self.fail(ParseErrorKind::RedundantUsage));
        }
        self.advance();

        if !self.is(TokenKind::Identifier) {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::ExpectedPathType(found)));
        }
        let node_type = match self.token.text() {
            "d" => NodeType::Directory,
            "f" => NodeType::File,
            other => {
                let found = other.to_string();
                return Err(self.fail(ParseErrorKind::InvalidPathType(found)));
            }
        };
        self.advance();

        let path_token = match self.token.kind() {
            TokenKind::String => self.advance(),
            TokenKind::UnterminatedString => {
                let found = self.token.text().to_string();
                return Err(self.fail(ParseErrorKind::UnterminatedString(found)));
            }
            _ => {
                let found = self.token.text().to_string();
                return Err(self.fail(ParseErrorKind::ExpectedPath(found)));
            }
        };
        let name = path_token.text();
        if name.is_empty() {
            return Err(self.fail_at(&path_token, ParseErrorKind::EmptyPath));
        }
        if matches!(name, "." | "..") || name.contains(['/', '\\']) {
            let kind = ParseErrorKind::InvalidPathName(name.to_string());
            return Err(self.fail_at(&path_token, kind));
        }

        let select_all = self.is(TokenKind::Symbol) && self.token.text() == "*";
        if select_all {
            if node_type != NodeType::Directory {
                return Err(self.fail(ParseErrorKind::SelectAllOnFile));
            }
            self.advance();
        }

        if !self.is(TokenKind::Newline) && !self.is(TokenKind::EndOfInput) {
            let found = self.token.text().to_string();
            return Err(self.fail(ParseErrorKind::ExpectedNewline(found)));
        }
        self.skip_empty_lines();

        // Leave the scopes closed by this line. A directory entry was entered
        // when it was declared, so leaving it takes one more step.
        if level <= state.last_level {
            let mut steps = state.last_level - level;
            if state.last_type == NodeType::Directory {
                steps += 1;
            }
            tree.ascend_levels(steps);
        }

        let id = match tree.add_child(name, node_type) {
            Ok(id) => id,
            Err(_) => {
                let kind = ParseErrorKind::DuplicatePath(name.to_string());
                return Err(self.fail_at(&path_token, kind));
            }
        };

        if node_type == NodeType::Directory {
            tree.go_to(id);

            if select_all {
                match tree.select_all_of(id) {
                    Ok(imported) => {
                        log::debug!("Imported {} entries under '{}'", imported, name);
                    }
                    Err(source) => {
                        let kind = ParseErrorKind::SelectAll {
                            path: tree.path_of(id).display().to_string(),
                            source,
                        };
                        return Err(self.fail_at(&path_token, kind));
                    }
                }
            }
        }

        state.last_level = level;
        state.last_type = node_type;
        state.select_all = select_all;
        Ok(())
    }

    /// Pulls the next token and returns the one it replaces.
    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.token, next)
    }

    fn is(&self, kind: TokenKind) -> bool {
        self.token.is(kind)
    }

    fn skip_empty_lines(&mut self) {
        while self.is(TokenKind::Newline) {
            self.advance();
        }
    }

    fn fail(&self, kind: ParseErrorKind) -> ParseError {
        self.fail_at(&self.token, kind)
    }

    fn fail_at(&self, token: &Token, kind: ParseErrorKind) -> ParseError {
        // A truncated read explains whatever grammar error followed it
        let kind = match self.lexer.read_error() {
            Some(err) => ParseErrorKind::Read(err.to_string()),
            None => kind,
        };

        ParseError {
            kind,
            path: self.path.clone(),
            line: token.line(),
            column: token.column(),
        }
    }
}
