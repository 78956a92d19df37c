use crate::app::token::{describe_name, TokenKind};
use crate::app::tree::DirTree;
use std::path::PathBuf;
use thiserror::Error;

pub const PROJECT_NAME: &str = "project_name";
pub const PROJECT_ROOT: &str = "project_root";
pub const COMPRESS_TYPE: &str = "compress_type";
pub const COMPRESS_LEVEL: &str = "compress_level";
pub const STRUCTURE: &str = "structure";

/// Type a schema entry expects its value to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    /// The indented block under `structure`. Never produced by the lexer.
    PathsBlock,
}

impl ValueKind {
    /// Token kind carrying a scalar of this kind; `None` for blocks.
    pub fn token_kind(self) -> Option<TokenKind> {
        match self {
            ValueKind::String => Some(TokenKind::String),
            ValueKind::Integer => Some(TokenKind::ValidInteger),
            ValueKind::PathsBlock => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ValueKind::String => TokenKind::String.display_name(),
            ValueKind::Integer => TokenKind::ValidInteger.display_name(),
            ValueKind::PathsBlock => "PATHS_BLOCK",
        }
    }

    pub fn describe(self) -> String {
        describe_name(self.display_name())
    }

    pub fn accepts(self, value: &ConfigValue) -> bool {
        match value {
            ConfigValue::Text(_) => self == ValueKind::String,
            ConfigValue::Integer(_) => self == ValueKind::Integer,
            ConfigValue::Tree(_) => self == ValueKind::PathsBlock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    Integer(i32),
    Tree(DirTree),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    name: &'static str,
    kind: ValueKind,
    value: ConfigValue,
}

impl SchemaEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &ConfigValue {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("'{name}' expects a {expected} value")]
    KindMismatch { name: String, expected: String },
}

/// The recognized top-level identifiers with their kinds and current values,
/// kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    /// Builds the schema with the given defaults. `structure` starts as an
    /// empty tree rooted at `project_root`.
    pub fn new(
        project_name: impl Into<String>,
        project_root: impl Into<String>,
        compress_type: impl Into<String>,
        compress_level: i32,
    ) -> Self {
        let project_root = project_root.into();
        let structure = DirTree::new(project_root.clone());
        let entry = |name, kind, value| SchemaEntry { name, kind, value };

        Self {
            entries: vec![
                entry(
                    PROJECT_NAME,
                    ValueKind::String,
                    ConfigValue::Text(project_name.into()),
                ),
                entry(
                    PROJECT_ROOT,
                    ValueKind::String,
                    ConfigValue::Text(project_root),
                ),
                entry(
                    COMPRESS_TYPE,
                    ValueKind::String,
                    ConfigValue::Text(compress_type.into()),
                ),
                entry(
                    COMPRESS_LEVEL,
                    ValueKind::Integer,
                    ConfigValue::Integer(compress_level),
                ),
                entry(STRUCTURE, ValueKind::PathsBlock, ConfigValue::Tree(structure)),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.get(name).map(SchemaEntry::kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    /// Replaces the value of `name`. The value must match the entry's kind.
    pub fn set(&mut self, name: &str, value: ConfigValue) -> Result<(), SchemaError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| SchemaError::UnknownIdentifier(name.to_string()))?;

        if !entry.kind.accepts(&value) {
            return Err(SchemaError::KindMismatch {
                name: name.to_string(),
                expected: entry.kind.describe(),
            });
        }

        entry.value = value;
        Ok(())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)?.value() {
            ConfigValue::Text(text) => Some(text),
            ConfigValue::Integer(_) | ConfigValue::Tree(_) => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i32> {
        match self.get(name)?.value() {
            ConfigValue::Integer(value) => Some(*value),
            ConfigValue::Text(_) | ConfigValue::Tree(_) => None,
        }
    }

    pub fn tree(&self, name: &str) -> Option<&DirTree> {
        match self.get(name)?.value() {
            ConfigValue::Tree(tree) => Some(tree),
            ConfigValue::Text(_) | ConfigValue::Integer(_) => None,
        }
    }

    pub fn project_name(&self) -> &str {
        self.text(PROJECT_NAME).unwrap_or_default()
    }

    pub fn project_root(&self) -> &str {
        self.text(PROJECT_ROOT).unwrap_or_default()
    }

    pub fn compress_type(&self) -> &str {
        self.text(COMPRESS_TYPE).unwrap_or_default()
    }

    pub fn compress_level(&self) -> i32 {
        self.integer(COMPRESS_LEVEL).unwrap_or_default()
    }

    pub fn structure(&self) -> Option<&DirTree> {
        self.tree(STRUCTURE)
    }
}

/// Represents a single entry discovered while scanning a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    pub name: String,
    pub relative_path: PathBuf,
    pub depth: usize, // 1 for direct children of the scanned directory
    pub is_dir: bool,
}
