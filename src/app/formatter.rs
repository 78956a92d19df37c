use crate::app::models::{ConfigValue, Schema};
use crate::app::tree::{DirTree, NodeType};

/// Column the structure tree is indented to, just past the `{:<14}: ` labels.
const TREE_INDENT: usize = 11;

pub struct OutputGenerator;

impl OutputGenerator {
    /// One `name: value` line per schema entry; the structure is drawn as a
    /// tree below its label.
    pub fn generate_config(schema: &Schema, styled: bool) -> String {
        let mut output = String::new();

        for entry in schema.iter() {
            match entry.value() {
                ConfigValue::Text(text) => {
                    output.push_str(&format!("{:<14}: {}\n", entry.name(), text));
                }
                ConfigValue::Integer(value) => {
                    output.push_str(&format!("{:<14}: {}\n", entry.name(), value));
                }
                ConfigValue::Tree(tree) => {
                    output.push_str(&format!("{}:\n", entry.name()));
                    output.push_str(&tree.render(TREE_INDENT, styled));
                }
            }
        }

        output.trim_end().to_string()
    }

    /// Flat listing of every selected path, four spaces per level and a
    /// trailing `/` on directories.
    pub fn generate_listing(tree: &DirTree) -> String {
        tree.entries()
            .iter()
            .map(|entry| {
                let name = entry
                    .relative_path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_default();
                let marker = match entry.node_type {
                    NodeType::Directory => "/",
                    NodeType::File => "",
                };
                let width = 4 * entry.depth.saturating_sub(1);
                format!("{:width$}{name}{marker}", "")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
