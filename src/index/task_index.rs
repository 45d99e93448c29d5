use std::cell::OnceCell;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use futures::FutureExt;
use tracing::debug;

use crate::error::{TaskError, report};
use crate::index::ignore::IgnorePolicy;
use crate::index::listeners::{ListenerResult, Listeners, SubscriptionId};
use crate::model::config::{AttributeSyntax, TasksConfig};
use crate::model::document::DocumentRef;
use crate::model::task::Task;
use crate::parse::{parse_documents, read_and_parse};

/// A tracked document and its current task forest
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    pub document: DocumentRef,
    pub tasks: Vec<Task>,
}

/// Document lifecycle signal from the host
#[derive(Debug, Clone)]
pub enum DocumentEvent {
    Created(DocumentRef),
    Updated(DocumentRef),
    Deleted(DocumentRef),
    Renamed { old_id: String, document: DocumentRef },
}

/// In-memory index of every task in a set of documents.
///
/// Document text is the source of truth; entries are replaced wholesale on
/// every reparse. The flattened view is memoized and dropped on every
/// structural change, and each successful change notifies subscribers once.
#[derive(Debug)]
pub struct TaskIndex {
    syntax: AttributeSyntax,
    ignore: IgnorePolicy,
    entries: Vec<DocumentEntry>,
    flattened: OnceCell<Rc<Vec<Task>>>,
    listeners: Listeners,
}

impl TaskIndex {
    pub fn new(config: &TasksConfig) -> Self {
        TaskIndex {
            syntax: config.attribute_syntax,
            ignore: IgnorePolicy::from_config(config),
            entries: Vec::new(),
            flattened: OnceCell::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All top-level tasks, in entry order, each with its subtasks.
    ///
    /// Returns the same allocation until the next change.
    pub fn tasks(&self) -> Rc<Vec<Task>> {
        self.flattened
            .get_or_init(|| {
                Rc::new(
                    self.entries
                        .iter()
                        .flat_map(|e| e.tasks.iter().cloned())
                        .collect(),
                )
            })
            .clone()
    }

    pub fn subscribe<F, Fut>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(Rc<Vec<Task>>) -> Fut + 'static,
        Fut: Future<Output = ListenerResult> + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Replace the whole index with the given documents
    pub async fn load_all(&mut self, documents: Vec<DocumentRef>) {
        let documents: Vec<DocumentRef> = documents
            .into_iter()
            .filter(|d| !self.ignore.is_ignored(&**d))
            .collect();

        let parsed = AssertUnwindSafe(parse_documents(&documents, self.syntax))
            .catch_unwind()
            .await;
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(payload) => {
                report(&TaskError::from_panic("<all documents>", payload));
                return;
            }
        };

        self.entries = documents
            .into_iter()
            .zip(parsed)
            .map(|(document, tasks)| DocumentEntry { document, tasks })
            .collect();
        self.changed().await;
    }

    /// Reparse a changed document, or start or stop tracking it when its
    /// ignore status changed
    pub async fn document_updated(&mut self, document: DocumentRef) {
        let ignored = self.ignore.is_ignored(&*document);
        match (self.position(document.id()), ignored) {
            (Some(idx), true) => {
                debug!(path = document.path(), "document became ignored");
                self.entries.remove(idx);
                self.changed().await;
            }
            (None, true) => {}
            (None, false) => {
                debug!(path = document.path(), "tracking previously ignored document");
                self.add_entry(document).await;
            }
            (Some(_), false) => match read_and_parse(&document, self.syntax).await {
                Ok(tasks) => {
                    // Look the entry up again: it may have moved while we were reading.
                    if let Some(idx) = self.position(document.id()) {
                        self.entries[idx].tasks = tasks;
                        self.changed().await;
                    }
                }
                Err(err) => report(&err),
            },
        }
    }

    pub async fn document_created(&mut self, document: DocumentRef) {
        if self.ignore.is_ignored(&*document) {
            return;
        }
        self.add_entry(document).await;
    }

    /// Stop tracking a deleted document.
    ///
    /// Deleting a document the index never saw means the index and the host
    /// disagree, so it is an error rather than a no-op.
    pub async fn document_deleted(&mut self, document: &DocumentRef) -> Result<(), TaskError> {
        if self.ignore.is_ignored(&**document) {
            return Ok(());
        }
        let idx = self
            .position(document.id())
            .ok_or_else(|| TaskError::UnknownDocument {
                path: document.path().to_string(),
            })?;
        self.entries.remove(idx);
        self.changed().await;
        Ok(())
    }

    /// Move an entry to its new document without reparsing
    pub async fn document_renamed(&mut self, old_id: &str, document: DocumentRef) {
        let Some(idx) = self.position(old_id) else {
            debug!(old_id, path = document.path(), "rename of untracked document");
            return;
        };
        if self.ignore.is_ignored(&*document) {
            self.entries.remove(idx);
        } else {
            let entry = &mut self.entries[idx];
            for task in &mut entry.tasks {
                task.retarget(&document);
            }
            entry.document = document;
        }
        self.changed().await;
    }

    /// Route a lifecycle event to the matching handler
    pub async fn apply(&mut self, event: DocumentEvent) -> Result<(), TaskError> {
        match event {
            DocumentEvent::Created(document) => self.document_created(document).await,
            DocumentEvent::Updated(document) => self.document_updated(document).await,
            DocumentEvent::Deleted(document) => self.document_deleted(&document).await?,
            DocumentEvent::Renamed { old_id, document } => {
                self.document_renamed(&old_id, document).await
            }
        }
        Ok(())
    }

    async fn add_entry(&mut self, document: DocumentRef) {
        match read_and_parse(&document, self.syntax).await {
            Ok(tasks) => {
                self.entries.push(DocumentEntry { document, tasks });
                self.changed().await;
            }
            Err(err) => report(&err),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.document.id() == id)
    }

    fn invalidate(&mut self) {
        self.flattened.take();
    }

    async fn changed(&mut self) {
        self.invalidate();
        if !self.listeners.is_empty() {
            let tasks = self.tasks();
            self.listeners.notify(tasks).await;
        }
    }
}
