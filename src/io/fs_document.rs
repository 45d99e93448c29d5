use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use futures::future::LocalBoxFuture;
use tempfile::NamedTempFile;

use crate::error::TaskError;
use crate::model::document::Document;

/// A markdown file on disk, identified by its path relative to the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsDocument {
    id: String,
    abs_path: PathBuf,
}

impl FsDocument {
    /// `abs_path` outside `root` keeps its full path as id
    pub fn new(root: &Path, abs_path: PathBuf) -> Self {
        FsDocument {
            id: relative_id(root, &abs_path),
            abs_path,
        }
    }

    /// From a root-relative path such as `notes/today.md`
    pub fn from_relative(root: &Path, relative: &str) -> Self {
        FsDocument::new(root, root.join(relative))
    }

    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }
}

impl Document for FsDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn path(&self) -> &str {
        &self.id
    }

    fn read_content(&self) -> LocalBoxFuture<'_, io::Result<String>> {
        Box::pin(async move { fs::read_to_string(&self.abs_path) })
    }

    fn write_content(&self, content: String) -> LocalBoxFuture<'_, io::Result<()>> {
        Box::pin(async move { atomic_write(&self.abs_path, content.as_bytes()) })
    }
}

/// Root-relative path with `/` separators
pub fn relative_id(root: &Path, abs_path: &Path) -> String {
    match abs_path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => abs_path.to_string_lossy().into_owned(),
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Collect every `.md` file under `root`, skipping dot-directories.
/// Sorted by id so entry order is stable across runs.
pub fn discover_documents(root: &Path) -> Result<Vec<FsDocument>, TaskError> {
    let mut documents = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).map_err(|e| TaskError::read(dir.display().to_string(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| TaskError::read(dir.display().to_string(), e))?;
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                continue;
            }
            let file_type = entry
                .file_type()
                .map_err(|e| TaskError::read(path.display().to_string(), e))?;
            // Symlinked folders are not followed; one pointing at an ancestor never ends.
            if file_type.is_dir() {
                pending.push(path);
            } else if is_markdown(&path) {
                documents.push(FsDocument::new(root, path));
            }
        }
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use tempfile::TempDir;

    #[test]
    fn test_discover_documents() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Projects/deep")).unwrap();
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        fs::write(root.join("b.md"), "").unwrap();
        fs::write(root.join("Projects/a.md"), "").unwrap();
        fs::write(root.join("Projects/deep/c.md"), "").unwrap();
        fs::write(root.join("Projects/image.png"), "").unwrap();
        fs::write(root.join(".obsidian/workspace.md"), "").unwrap();

        let ids: Vec<String> = discover_documents(root)
            .unwrap()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["Projects/a.md", "Projects/deep/c.md", "b.md"]);
    }

    #[test]
    fn test_read_and_write_content() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("notes")).unwrap();
        fs::write(tmp.path().join("notes/today.md"), "- [ ] a\n").unwrap();

        let doc = FsDocument::from_relative(tmp.path(), "notes/today.md");
        assert_eq!(doc.id(), "notes/today.md");
        assert_eq!(doc.name(), "today.md");
        assert!(doc.is_in_folder("Notes"));

        let content = block_on(doc.read_content()).unwrap();
        assert_eq!(content, "- [ ] a\n");
        block_on(doc.write_content("- [x] a\n".to_string())).unwrap();
        assert_eq!(doc.abs_path(), tmp.path().join("notes/today.md"));
        assert_eq!(fs::read_to_string(doc.abs_path()).unwrap(), "- [x] a\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_symlinked_folders() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("notes")).unwrap();
        fs::write(root.join("notes/a.md"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("notes/back-to-root")).unwrap();

        let ids: Vec<String> = discover_documents(root)
            .unwrap()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["notes/a.md"]);
    }

    #[test]
    fn test_missing_file_read_fails() {
        let tmp = TempDir::new().unwrap();
        let doc = FsDocument::from_relative(tmp.path(), "gone.md");
        assert!(block_on(doc.read_content()).is_err());
    }
}
