pub mod ignore;
pub mod listeners;
pub mod task_index;

pub use ignore::IgnorePolicy;
pub use listeners::{ListenerResult, SubscriptionId};
pub use task_index::{DocumentEntry, DocumentEvent, TaskIndex};
