/// Lexical categories produced by the [`Lexer`](crate::app::lexer::Lexer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginOfInput,
    Identifier,
    String,
    /// A string whose closing quote never appeared on the same line.
    UnterminatedString,
    ValidInteger,
    /// Digits immediately followed by identifier characters (`12ab`).
    InvalidNumber,
    Newline,
    /// `:`
    Assign,
    /// Any single character without a dedicated kind.
    Symbol,
    /// `+` or `-`
    PathIndicator,
    IndentSpaces,
    IndentTabs,
    IndentMixed,
    EndOfInput,
}

impl TokenKind {
    /// Upper-case name of the kind, e.g. `VALID_INTEGER`.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::BeginOfInput => "BEGIN_OF_INPUT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::UnterminatedString => "UNTERMINATED_STRING",
            TokenKind::ValidInteger => "VALID_INTEGER",
            TokenKind::InvalidNumber => "INVALID_NUMBER",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::PathIndicator => "PATH_INDICATOR",
            TokenKind::IndentSpaces => "INDENT_SPACES",
            TokenKind::IndentTabs => "INDENT_TABS",
            TokenKind::IndentMixed => "INDENT_MIXED",
            TokenKind::EndOfInput => "END_OF_INPUT",
        }
    }

    /// Name used inside diagnostics: lower-cased, underscores become spaces.
    pub fn describe(self) -> String {
        describe_name(self.display_name())
    }

    pub fn is_indent(self) -> bool {
        matches!(
            self,
            TokenKind::IndentSpaces | TokenKind::IndentTabs | TokenKind::IndentMixed
        )
    }
}

pub(crate) fn describe_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Text carried by newline tokens.
pub const NEWLINE_TEXT: &str = "\\n";

/// Text carried by end-of-input tokens.
pub const EOF_TEXT: &str = "EOF";

/// An immutable lexical unit with the position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            text: text.into(),
        }
    }

    /// The placeholder lookahead a parser starts from.
    pub fn begin_of_input() -> Self {
        Self::new(TokenKind::BeginOfInput, 1, 1, "BEGIN_OF_INPUT")
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// 1-based line of the lexeme start.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the lexeme start, counted in characters.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character count of the raw text. Used as the width of indentation runs.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
