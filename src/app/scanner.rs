use crate::app::models::ScannedEntry;
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Depth-first walker over a real directory, used to expand `*` entries.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Lists everything under the root, parents before their children and
    /// siblings in file name order. Only the project's own `.gitignore` files
    /// filter the walk, and only inside git repositories.
    pub fn scan(&self) -> Vec<ScannedEntry> {
        let mut entries = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(false) // Dotfiles are part of a project bundle
            .git_ignore(true)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
                    if let Some(processed) = self.process_entry(entry.path(), entry.depth(), is_dir)
                    {
                        entries.push(processed);
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        entries
    }

    fn process_entry(&self, path: &Path, depth: usize, is_dir: bool) -> Option<ScannedEntry> {
        // Skip the root folder itself from the list
        if depth == 0 {
            return None;
        }

        let relative_path = diff_paths(path, &self.root)?;
        let name = path.file_name()?.to_str().or_else(|| {
            log::warn!("Skipping non UTF-8 path: {}", path.display());
            None
        })?;

        Some(ScannedEntry {
            name: name.to_string(),
            relative_path,
            depth,
            is_dir,
        })
    }
}
