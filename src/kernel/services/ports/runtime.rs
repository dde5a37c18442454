//! 执行桥：外部解释器的契约。
//!
//! 核心只调用这些接口，不实现解释器本身。

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Receives runtime output as it is produced.
pub trait OutputSink: Send {
    fn stdout(&mut self, text: &str);
    fn stderr(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    AlreadyExists,
    Rejected(String),
    Io(String),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::AlreadyExists => write!(f, "already exists"),
            FsError::Rejected(reason) => write!(f, "rejected: {reason}"),
            FsError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FsError {}

/// File system of the external runtime. Paths are `/`-joined and relative to
/// the runtime's working directory (e.g. `./src/main.py`).
pub trait RuntimeFs {
    fn mkdir(&self, path: &str) -> Result<(), FsError>;
    fn write_file(&self, path: &str, contents: &[u8]) -> Result<(), FsError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    pub message: String,
}

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BridgeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The program raised; the message is the runtime's rendering of it.
    Raised(String),
    Exited { code: Option<i32> },
    Io(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Raised(message) => f.write_str(message),
            ExecutionError::Exited { code: Some(code) } => {
                write!(f, "Process exited with status {code}")
            }
            ExecutionError::Exited { code: None } => write!(f, "Process terminated by signal"),
            ExecutionError::Io(e) => write!(f, "Runtime I/O error: {e}"),
        }
    }
}

impl std::error::Error for ExecutionError {}

pub trait ExecutionBridge: Send + Sync {
    type Handle: RuntimeFs + Send + Sync + 'static;

    /// Human readable runtime name, e.g. `Python 3.11`.
    fn label(&self) -> &str;

    /// Bulk initialization. Called at most once per session through
    /// [`crate::kernel::bridge::RuntimeGate`].
    fn start(&self) -> BoxFuture<'_, Result<Arc<Self::Handle>, BridgeError>>;

    /// Runs `source`. Stdout/stderr go to `sink` incrementally; a raised
    /// exception is reported to `sink.stderr` first and then returned.
    fn execute<'a>(
        &'a self,
        handle: &'a Self::Handle,
        source: &'a str,
        sink: &'a mut dyn OutputSink,
    ) -> BoxFuture<'a, Result<(), ExecutionError>>;
}
