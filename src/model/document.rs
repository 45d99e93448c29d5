use std::fmt;
use std::io;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// A host-owned text document.
///
/// The core never touches storage itself: it identifies documents by `id`,
/// uses `path` for containment checks and error context, and reads or
/// rewrites the whole body through the two content methods.
pub trait Document: fmt::Debug {
    /// Stable identity used for index lookups
    fn id(&self) -> &str;

    /// Location, for display and folder containment
    fn path(&self) -> &str;

    /// File name, for display
    fn name(&self) -> &str {
        self.path().rsplit('/').next().unwrap_or_else(|| self.path())
    }

    /// Case-insensitive test that the document lives under `prefix`
    fn is_in_folder(&self, prefix: &str) -> bool {
        path_in_folder(self.path(), prefix)
    }

    fn read_content(&self) -> LocalBoxFuture<'_, io::Result<String>>;

    fn write_content(&self, content: String) -> LocalBoxFuture<'_, io::Result<()>>;
}

/// Shared handle to a document. Tasks and index entries hold clones of it.
pub type DocumentRef = Rc<dyn Document>;

/// `Archive` contains `archive/2024.md` and `ARCHIVE/old/x.md`, but not `Archived.md`.
pub fn path_in_folder(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_matches('/').to_lowercase();
    if prefix.is_empty() {
        return true;
    }
    let path = path.trim_start_matches('/').to_lowercase();
    path == prefix
        || path
            .strip_prefix(&prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
