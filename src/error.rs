use std::any::Any;
use std::fmt;

/// How loudly a failure should be surfaced to a human.
/// Never used to change control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Kind of document I/O that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
    Delete,
    Rename,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOp::Read => write!(f, "read"),
            FileOp::Write => write!(f, "write"),
            FileOp::Delete => write!(f, "delete"),
            FileOp::Rename => write!(f, "rename"),
        }
    }
}

/// Error type for parsing, indexing and editing tasks
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("could not parse tasks in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("could not {op} {path}: {source}")]
    FileOperation {
        path: String,
        op: FileOp,
        source: std::io::Error,
    },
    #[error("document is not indexed: {path}")]
    UnknownDocument { path: String },
    #[error("task has no known line: {text}")]
    MissingLine { text: String },
    #[error("line {line} is out of range for {path} ({len} lines)")]
    LineOutOfRange {
        path: String,
        line: usize,
        len: usize,
    },
    #[error("no task at {path}:{line}")]
    TaskNotFound { path: String, line: usize },
    #[error("invalid settings in {path}: {message}")]
    Settings { path: String, message: String },
}

impl TaskError {
    pub fn read(path: impl Into<String>, source: std::io::Error) -> Self {
        TaskError::FileOperation {
            path: path.into(),
            op: FileOp::Read,
            source,
        }
    }

    pub fn write(path: impl Into<String>, source: std::io::Error) -> Self {
        TaskError::FileOperation {
            path: path.into(),
            op: FileOp::Write,
            source,
        }
    }

    /// Turn a panic payload into a message-bearing parse error
    pub fn from_panic(path: impl Into<String>, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown failure".to_string()
        };
        TaskError::Parse {
            path: path.into(),
            message,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            TaskError::UnknownDocument { .. } | TaskError::LineOutOfRange { .. } => {
                Severity::Critical
            }
            TaskError::FileOperation { op: FileOp::Write, .. } => Severity::Critical,
            TaskError::FileOperation { .. } | TaskError::Settings { .. } => Severity::High,
            TaskError::Parse { .. } | TaskError::MissingLine { .. } => Severity::Medium,
            TaskError::TaskNotFound { .. } => Severity::Low,
        }
    }

    /// Document path the failure relates to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            TaskError::Parse { path, .. }
            | TaskError::FileOperation { path, .. }
            | TaskError::UnknownDocument { path }
            | TaskError::LineOutOfRange { path, .. }
            | TaskError::TaskNotFound { path, .. }
            | TaskError::Settings { path, .. } => Some(path),
            TaskError::MissingLine { .. } => None,
        }
    }
}

/// Log a failure that is handled here rather than returned to the caller
pub fn report(err: &TaskError) {
    let path = err.path().unwrap_or("");
    match err.severity() {
        Severity::Critical | Severity::High => tracing::error!(path, "{}", err),
        Severity::Medium => tracing::warn!(path, "{}", err),
        Severity::Low => tracing::info!(path, "{}", err),
    }
}
