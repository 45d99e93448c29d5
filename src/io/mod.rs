pub mod config_io;
pub mod fs_document;
pub mod memory_document;
pub mod watcher;

pub use fs_document::{FsDocument, discover_documents};
pub use memory_document::MemoryDocument;
