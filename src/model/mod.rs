pub mod config;
pub mod document;
pub mod task;

pub use config::*;
pub use document::*;
pub use task::*;
