use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};

use crate::model::document::Document;

/// A document held entirely in memory.
///
/// Used by embedding hosts that own their own storage, and by tests.
/// Counts reads and writes so callers can check I/O batching.
#[derive(Debug)]
pub struct MemoryDocument {
    id: String,
    path: String,
    content: RefCell<String>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    fail_reads: Cell<bool>,
}

impl MemoryDocument {
    /// A document whose id is its path
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        MemoryDocument {
            id: path.clone(),
            path,
            content: RefCell::new(content.into()),
            reads: Cell::new(0),
            writes: Cell::new(0),
            fail_reads: Cell::new(false),
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        MemoryDocument {
            id: id.into(),
            ..MemoryDocument::new(path, content)
        }
    }

    pub fn shared(path: impl Into<String>, content: impl Into<String>) -> Rc<MemoryDocument> {
        Rc::new(MemoryDocument::new(path, content))
    }

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    /// Replace the content without counting a write
    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.borrow_mut() = content.into();
    }

    /// Make subsequent reads fail with an I/O error
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Document for MemoryDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn read_content(&self) -> LocalBoxFuture<'_, io::Result<String>> {
        self.reads.set(self.reads.get() + 1);
        let result = if self.fail_reads.get() {
            Err(io::Error::other(format!("{} is unreadable", self.path)))
        } else {
            Ok(self.content())
        };
        Box::pin(future::ready(result))
    }

    fn write_content(&self, content: String) -> LocalBoxFuture<'_, io::Result<()>> {
        self.writes.set(self.writes.get() + 1);
        *self.content.borrow_mut() = content;
        Box::pin(future::ready(Ok(())))
    }
}
