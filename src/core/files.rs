//! File alignment across document trees.
//!
//! Matches a "new" file set against an old-source set (and optionally an
//! old-target set) by path relative to each declared root. Per new file the
//! result is a 1-0, 1-1, or 1-1-1 record. A relative path appearing twice
//! within any single set makes the mapping ambiguous and is rejected up
//! front, while the maps are built, never deferred to alignment time.

use std::path::Path;

use anyhow::{Context as _, Result};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::error::EngineError;
use crate::infra::walk::FileWalker;

/// One new file and its counterparts in the old tree(s).
#[derive(Debug, Clone, Serialize)]
pub struct FileAlignment {
    /// Path relative to the new root, `/`-separated
    pub relative: String,
    pub new_file: Utf8PathBuf,
    pub old_source: Option<Utf8PathBuf>,
    pub old_target: Option<Utf8PathBuf>,
}

/// Aligns file trees by relative path.
pub struct FileAligner {
    case_insensitive: bool,
    walker: FileWalker,
}

impl FileAligner {
    pub fn new(case_insensitive: bool, ignore_patterns: &[String]) -> Result<Self> {
        Ok(Self {
            case_insensitive,
            walker: FileWalker::new(ignore_patterns)?,
        })
    }

    /// Align the files under `new_root` against `old_source_root` and,
    /// when given, `old_target_root`. One record per new file, in walk
    /// order.
    pub fn align_trees(
        &self,
        new_root: &Path,
        old_source_root: &Path,
        old_target_root: Option<&Path>,
    ) -> Result<Vec<FileAlignment>> {
        let new_map = self.relative_map(new_root, "new")?;
        let old_source_map = self.relative_map(old_source_root, "old-source")?;
        let old_target_map = match old_target_root {
            Some(root) => Some(self.relative_map(root, "old-target")?),
            None => None,
        };

        let alignments = new_map
            .into_iter()
            .map(|(key, (relative, new_file))| FileAlignment {
                relative,
                new_file,
                old_source: old_source_map.get(&key).map(|(_, p)| p.clone()),
                old_target: old_target_map
                    .as_ref()
                    .and_then(|m| m.get(&key).map(|(_, p)| p.clone())),
            })
            .collect();
        Ok(alignments)
    }

    /// Map matching key -> (display-relative path, absolute file) for one
    /// root. Keys are `/`-separated relative paths, lowercased in
    /// case-insensitive mode; a duplicate key is a fatal configuration
    /// error.
    fn relative_map(
        &self,
        root: &Path,
        set: &str,
    ) -> Result<IndexMap<String, (String, Utf8PathBuf)>> {
        let root = dunce::canonicalize(root)
            .with_context(|| format!("resolve {} root {}", set, root.display()))?;

        let mut map = IndexMap::new();
        for file in self.walker.walk_files(&root) {
            let rel = file
                .strip_prefix(&root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            let key = if self.case_insensitive {
                rel.to_lowercase()
            } else {
                rel.clone()
            };
            let file = Utf8PathBuf::from_path_buf(file)
                .map_err(|p| anyhow::anyhow!("non-UTF-8 path {}", p.display()))?;

            if map.insert(key.clone(), (rel, file)).is_some() {
                return Err(EngineError::DuplicatePath {
                    path: key,
                    set: set.to_owned(),
                }
                .into());
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_file(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    fn aligner(case_insensitive: bool) -> FileAligner {
        FileAligner::new(case_insensitive, &[]).unwrap()
    }

    #[test]
    fn matches_by_relative_path() {
        let new = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        write_file(new.path(), "a/doc.txt");
        write_file(new.path(), "b/only-new.txt");
        write_file(old.path(), "a/doc.txt");

        let records = aligner(false)
            .align_trees(new.path(), old.path(), None)
            .unwrap();

        assert_eq!(records.len(), 2);
        let doc = records.iter().find(|r| r.relative == "a/doc.txt").unwrap();
        assert!(doc.old_source.is_some());
        assert!(doc.old_target.is_none());
        let only = records.iter().find(|r| r.relative == "b/only-new.txt").unwrap();
        assert!(only.old_source.is_none());
    }

    #[test]
    fn three_way_alignment_fills_old_target() {
        let new = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        let old_target = TempDir::new().unwrap();
        write_file(new.path(), "doc.txt");
        write_file(old.path(), "doc.txt");
        write_file(old_target.path(), "doc.txt");

        let records = aligner(false)
            .align_trees(new.path(), old.path(), Some(old_target.path()))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].old_source.is_some());
        assert!(records[0].old_target.is_some());
    }

    #[test]
    fn case_insensitive_matching_joins_mixed_case_paths() {
        let new = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        write_file(new.path(), "Docs/Guide.txt");
        write_file(old.path(), "docs/guide.txt");

        let records = aligner(true)
            .align_trees(new.path(), old.path(), None)
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].old_source.is_some());
        // The display path keeps the new tree's original casing
        assert_eq!(records[0].relative, "Docs/Guide.txt");
    }

    #[test]
    fn duplicate_relative_path_is_fatal() {
        let new = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        // Case-insensitive collision inside one set
        write_file(new.path(), "a/b.xml");
        write_file(new.path(), "A/B.xml");
        write_file(old.path(), "a/b.xml");

        let err = aligner(true)
            .align_trees(new.path(), old.path(), None)
            .unwrap_err();
        let engine = err.downcast_ref::<EngineError>().unwrap();
        assert!(matches!(engine, EngineError::DuplicatePath { .. }));
    }

    #[test]
    fn exact_mode_keeps_mixed_case_paths_distinct() {
        let new = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        write_file(new.path(), "a/b.xml");
        write_file(new.path(), "A/B.xml");
        write_file(old.path(), "a/b.xml");

        let records = aligner(false)
            .align_trees(new.path(), old.path(), None)
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
