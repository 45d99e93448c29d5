use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tn", about = concat!("[x] tasknote v", env!("CARGO_PKG_VERSION"), " - tasks in your notes"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Notes folder to work in (default: current directory)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every task in the notes folder
    List,
    /// Change a task's status
    Status(StatusArgs),
    /// Mark one or more tasks in a file complete
    Done(DoneArgs),
    /// Set an attribute on a task
    Set(SetArgs),
    /// Remove an attribute from a task
    Unset(UnsetArgs),
    /// Add a follow-up task below an existing one
    FollowUp(FollowUpArgs),
    /// Watch the folder and report index updates
    Watch,
}

#[derive(Args)]
pub struct StatusArgs {
    /// File containing the task, relative to the notes folder
    pub file: String,
    /// Zero-based line of the task
    pub line: usize,
    /// New status (todo, in-progress, delegated, complete, canceled, attention-required)
    pub status: String,
}

#[derive(Args)]
pub struct DoneArgs {
    /// File containing the tasks
    pub file: String,
    /// Zero-based lines of the tasks
    #[arg(required = true)]
    pub lines: Vec<usize>,
}

#[derive(Args)]
pub struct SetArgs {
    pub file: String,
    pub line: usize,
    /// Attribute name
    pub key: String,
    /// Attribute value (omit for a bare flag)
    pub value: Option<String>,
}

#[derive(Args)]
pub struct UnsetArgs {
    pub file: String,
    pub line: usize,
    /// Attribute name
    pub key: String,
}

#[derive(Args)]
pub struct FollowUpArgs {
    pub file: String,
    pub line: usize,
    /// Due date for the follow-up (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Complete the original task first
    #[arg(long)]
    pub complete: bool,
}
