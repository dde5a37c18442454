//! Service ports: traits + data contracts.

pub mod chat;
pub mod runtime;
pub mod settings;

pub use chat::{ChatClient, ChatError};
pub use runtime::{
    BoxFuture, BridgeError, ExecutionBridge, ExecutionError, FsError, OutputSink, RuntimeFs,
};
pub use settings::{AgentSettings, ChatSettings, RuntimeSettings, Settings, TerminalSettings};
