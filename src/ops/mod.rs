pub mod follow_up;
pub mod line_mutator;

pub use follow_up::FollowUpComposer;
pub use line_mutator::LineMutator;
