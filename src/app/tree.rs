use crate::app::scanner::Scanner;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const DIRECTORY_STYLE: &str = "\x1b[34m";
const RESET_STYLE: &str = "\x1b[0m";

/// Index of a node inside its [`DirTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("'{0}' is a file and cannot hold children")]
    ExpectedDirectory(String),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    #[error("the current node has no parent")]
    NoSuchParent,
    #[error("no child named '{0}'")]
    NoSuchChild(String),
    #[error("'{0}' is not a directory")]
    InvalidType(String),
    #[error("'{}' is not an existing directory", .0.display())]
    InvalidPath(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    node_type: NodeType,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
}

impl Node {
    fn new(name: String, node_type: NodeType, parent: Option<NodeId>) -> Self {
        Self {
            name,
            node_type,
            parent,
            children: BTreeMap::new(),
        }
    }

    /// A single path segment; the root holds the project root path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_directory(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids ordered by name.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }
}

/// One node of a depth-first listing produced by [`DirTree::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub relative_path: PathBuf,
    pub depth: usize,
    pub node_type: NodeType,
}

/// Arena-backed directory tree with a navigation cursor.
///
/// Nodes are never removed. Parent links are plain indices, so walking up the
/// tree never touches ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTree {
    nodes: Vec<Node>,
    cursor: NodeId,
}

impl DirTree {
    /// Creates a tree whose root directory is named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_name.into(), NodeType::Directory, None)],
            cursor: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Inserts a child under the cursor. The cursor does not move.
    pub fn add_child(&mut self, name: &str, node_type: NodeType) -> Result<NodeId, TreeError> {
        self.insert(self.cursor, name, node_type)
    }

    fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> Result<NodeId, TreeError> {
        let parent_node = &self.nodes[parent.0];
        if !parent_node.is_directory() {
            return Err(TreeError::ExpectedDirectory(parent_node.name.clone()));
        }
        if parent_node.children.contains_key(name) {
            return Err(TreeError::AlreadyExists(name.to_string()));
        }

        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(name.to_string(), node_type, Some(parent)));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn go_to_parent(&mut self) -> Result<(), TreeError> {
        let parent = self.nodes[self.cursor.0]
            .parent
            .ok_or(TreeError::NoSuchParent)?;
        self.cursor = parent;
        Ok(())
    }

    /// Moves the cursor to `id`, which must belong to this tree.
    pub fn go_to(&mut self, id: NodeId) {
        self.cursor = id;
    }

    pub fn go_to_child(&mut self, name: &str) -> Result<(), TreeError> {
        let child = self.nodes[self.cursor.0]
            .children
            .get(name)
            .copied()
            .ok_or_else(|| TreeError::NoSuchChild(name.to_string()))?;
        self.cursor = child;
        Ok(())
    }

    /// Moves the cursor up to `levels` times, stopping at the root.
    /// Returns the number of levels actually climbed.
    pub fn ascend_levels(&mut self, levels: usize) -> usize {
        let mut climbed = 0;
        while climbed < levels && self.go_to_parent().is_ok() {
            climbed += 1;
        }
        climbed
    }

    /// Filesystem path of `id`: the names from the root down to the node.
    pub fn path_of(&self, id: NodeId) -> PathBuf {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.iter().rev().collect()
    }

    /// Looks a node up by its path relative to the root.
    pub fn find(&self, relative: impl AsRef<Path>) -> Option<NodeId> {
        let mut current = self.root();
        for component in relative.as_ref().components() {
            match component {
                Component::Normal(name) => {
                    current = *self.nodes[current.0].children.get(name.to_str()?)?;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(current)
    }

    /// Every node below the root, depth-first, children in name order.
    pub fn entries(&self) -> Vec<TreeEntry> {
        let mut entries = Vec::new();
        let mut stack: Vec<(NodeId, PathBuf, usize)> = self.nodes[0]
            .children
            .values()
            .rev()
            .map(|id| (*id, PathBuf::new(), 1))
            .collect();

        while let Some((id, parent_path, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            let relative_path = parent_path.join(&node.name);
            for child in node.children.values().rev() {
                stack.push((*child, relative_path.clone(), depth + 1));
            }
            entries.push(TreeEntry {
                relative_path,
                depth,
                node_type: node.node_type,
            });
        }

        entries
    }

    /// Imports everything on disk beneath `id` as children of `id`.
    ///
    /// Existing children are kept; an on-disk entry whose name is already
    /// taken is merged into (directories) or skipped (type conflicts, along
    /// with its contents). Leaves the cursor on `id` and returns the number of
    /// nodes added.
    pub fn select_all_of(&mut self, id: NodeId) -> Result<usize, TreeError> {
        let node = &self.nodes[id.0];
        if !node.is_directory() {
            return Err(TreeError::InvalidType(node.name.clone()));
        }

        let directory = self.path_of(id);
        if !directory.is_dir() {
            return Err(TreeError::InvalidPath(directory));
        }

        // stack[d] is the tree node standing for the scanned entry at depth d,
        // `None` when that entry could not be placed.
        let mut stack: Vec<Option<NodeId>> = vec![Some(id)];
        let mut imported = 0;

        for entry in Scanner::new(directory).scan() {
            // A directory the scanner dropped leaves a hole at its depth, so
            // its descendants find no parent and are skipped too.
            stack.resize(entry.depth, None);
            let parent = stack.last().copied().flatten();

            let placed = match parent {
                Some(parent) => {
                    let node_type = if entry.is_dir {
                        NodeType::Directory
                    } else {
                        NodeType::File
                    };
                    match self.insert(parent, &entry.name, node_type) {
                        Ok(child) => {
                            imported += 1;
                            Some(child)
                        }
                        Err(TreeError::AlreadyExists(_)) => {
                            let existing = self.nodes[parent.0].children[&entry.name];
                            (self.nodes[existing.0].node_type == node_type).then_some(existing)
                        }
                        Err(err) => {
                            log::debug!("Skipping {}: {}", entry.relative_path.display(), err);
                            None
                        }
                    }
                }
                None => None,
            };
            stack.push(placed);
        }

        self.cursor = id;
        Ok(imported)
    }

    /// Draws the tree with box connectors, every line prefixed by `indent`
    /// spaces. Directories are painted blue when `styled` is set.
    pub fn render(&self, indent: usize, styled: bool) -> String {
        let pad = " ".repeat(indent);
        let paint = |node: &Node| {
            if styled && node.is_directory() {
                format!("{DIRECTORY_STYLE}{}{RESET_STYLE}", node.name)
            } else {
                node.name.clone()
            }
        };

        let mut output = String::new();
        let root = &self.nodes[0];
        let _ = writeln!(output, "{pad}root({})", paint(root));

        let mut stack: Vec<(Vec<NodeId>, usize)> = vec![(root.children().collect(), 0)];

        while let Some((siblings, position)) = stack.last_mut() {
            if *position >= siblings.len() {
                stack.pop();
                continue;
            }

            let id = siblings[*position];
            *position += 1;
            let is_last = *position == siblings.len();

            output.push_str(&pad);
            for (ancestors, next) in &stack[..stack.len() - 1] {
                output.push_str(if *next < ancestors.len() { "│   " } else { "    " });
            }
            output.push_str(if is_last { "└── " } else { "├── " });

            let node = &self.nodes[id.0];
            let _ = writeln!(output, "{}", paint(node));

            if node.is_directory() && !node.children.is_empty() {
                stack.push((node.children().collect(), 0));
            }
        }

        output
    }

    /// Writes [`render`](Self::render) to stdout, styled when it is a terminal.
    pub fn print_tree(&self, indent: usize) {
        print!("{}", self.render(indent, std::io::stdout().is_terminal()));
    }
}
