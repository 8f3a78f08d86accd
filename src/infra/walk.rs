//! Gitignore-aware file walker for the leverage file sets.
//!
//! Backed by ripgrep's `ignore` crate with `globset` extra patterns. Extra
//! globs are applied twice: early, to prune whole directories during
//! traversal, and late, against root-relative paths, to drop files that
//! slipped through. Output order is sorted for deterministic alignment maps.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Walker with additional ignore globs on top of .gitignore rules.
pub struct FileWalker {
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,
}

impl FileWalker {
    /// Build a walker with additional ignore patterns (e.g. `"*.bak"`,
    /// `"drafts/**"`). Patterns match root-relative paths.
    pub fn new(additional_ignores: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in additional_ignores {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            ignore_patterns: builder.build()?,
        })
    }

    fn build_walk(&self, root: &Path) -> WalkBuilder {
        let mut b = WalkBuilder::new(root);

        // Skip dotfiles; document trees don't keep content there
        b.hidden(true);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning with the extra globs
        let extra = self.ignore_patterns.clone();
        b.filter_entry(move |entry: &DirEntry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            !(is_dir && extra.is_match(entry.path()))
        });

        b
    }

    /// Traverse files under `root`, respecting ignore rules and extra
    /// globs. Returns a sorted list for determinism.
    pub fn walk_files<P: AsRef<Path>>(&self, root: P) -> Vec<PathBuf> {
        let root_path = root.as_ref();
        let walker = self.build_walk(root_path).build();

        let mut out: Vec<PathBuf> = walker
            .filter_map(|res| res.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|abs| {
                let rel = abs.strip_prefix(root_path).unwrap_or(abs);
                !self.ignore_patterns.is_match(rel)
            })
            .collect();

        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_file(root: &Path, rel: &str, contents: &str) -> Result<()> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    #[test]
    fn walks_files_in_sorted_order() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        write_file(root, "b/second.txt", "b")?;
        write_file(root, "a/first.txt", "a")?;

        let walker = FileWalker::new(&[])?;
        let files = walker.walk_files(root);

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/first.txt"));
        assert!(files[1].ends_with("b/second.txt"));
        Ok(())
    }

    #[test]
    fn extra_globs_filter_files_and_dirs() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        write_file(root, "keep.txt", "k")?;
        write_file(root, "note.bak", "b")?;
        write_file(root, "drafts/wip.txt", "w")?;

        let walker = FileWalker::new(&["*.bak".into(), "drafts/**".into()])?;
        let files = walker.walk_files(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.txt"));
        Ok(())
    }

    #[test]
    fn hidden_files_are_skipped() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        write_file(root, ".hidden.txt", "h")?;
        write_file(root, "visible.txt", "v")?;

        let walker = FileWalker::new(&[])?;
        let files = walker.walk_files(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.txt"));
        Ok(())
    }
}
