use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::index::DocumentEvent;
use crate::io::fs_document::{FsDocument, is_markdown, relative_id};
use crate::model::document::Document;

/// Filesystem changes to markdown files under the watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

/// A file system watcher for a notes folder.
pub struct FolderWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl FolderWatcher {
    /// Start watching `root` recursively.
    /// Returns a `FolderWatcher` whose `poll()` method should be called each tick.
    pub fn start(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root_owned = root.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                for file_event in translate(event, &root_owned) {
                    let _ = tx.send(file_event);
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(FolderWatcher {
            root: root.to_path_buf(),
            _watcher: watcher,
            rx,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Non-blocking poll for pending file events.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

/// Turn one notify event into file events for visible markdown files
pub fn translate(event: Event, root: &Path) -> Vec<FileEvent> {
    let relevant = |p: &PathBuf| p.starts_with(root) && is_markdown(p) && !is_hidden(root, p);

    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let (from, to) = (&event.paths[0], &event.paths[1]);
            match (relevant(from), relevant(to)) {
                (true, true) => vec![FileEvent::Renamed {
                    from: from.clone(),
                    to: to.clone(),
                }],
                (true, false) => vec![FileEvent::Removed(from.clone())],
                (false, true) => vec![FileEvent::Created(to.clone())],
                (false, false) => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => event
            .paths
            .into_iter()
            .filter(relevant)
            .map(FileEvent::Removed)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) | EventKind::Create(_) => event
            .paths
            .into_iter()
            .filter(relevant)
            .map(FileEvent::Created)
            .collect(),
        // FSEvents and kqueue report each side of a move separately, with no
        // direction. Whether the path still exists tells the two apart.
        EventKind::Modify(ModifyKind::Name(RenameMode::Any | RenameMode::Other)) => event
            .paths
            .into_iter()
            .filter(relevant)
            .map(|p| {
                if p.exists() {
                    FileEvent::Created(p)
                } else {
                    FileEvent::Removed(p)
                }
            })
            .collect(),
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .filter(relevant)
            .map(FileEvent::Modified)
            .collect(),
        _ => Vec::new(),
    }
}

/// Map a file event onto the index lifecycle.
///
/// Atomic saves show up as creates of an existing file, so a create for a
/// document the index already tracks is treated as an update.
pub fn document_event(root: &Path, event: FileEvent, is_tracked: impl Fn(&str) -> bool) -> DocumentEvent {
    let doc = |p: PathBuf| Rc::new(FsDocument::new(root, p));
    match event {
        FileEvent::Created(p) => {
            let d = doc(p);
            if is_tracked(d.id()) {
                DocumentEvent::Updated(d)
            } else {
                DocumentEvent::Created(d)
            }
        }
        FileEvent::Modified(p) => DocumentEvent::Updated(doc(p)),
        FileEvent::Removed(p) => DocumentEvent::Deleted(doc(p)),
        FileEvent::Renamed { from, to } => DocumentEvent::Renamed {
            old_id: relative_id(root, &from),
            document: doc(to),
        },
    }
}

fn is_hidden(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root).is_ok_and(|rel| {
        rel.components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    })
}
