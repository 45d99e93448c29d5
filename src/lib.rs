//! Checkbox tasks in plain-text markdown notes.
//!
//! Parses task lines (`- [ ] text @due(2025-01-01) #tag`) into a nested
//! forest per document, keeps an incrementally updated index across many
//! documents, and rewrites individual lines in place for status and
//! attribute changes without disturbing the rest of the file.

pub mod cli;
pub mod error;
pub mod index;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;

pub use error::{Severity, TaskError};
pub use index::{DocumentEvent, TaskIndex};
pub use model::{AttributeSyntax, Document, DocumentRef, Task, TaskStatus, TasksConfig};
