//! Headless application core: workspace terminal, execution bridge and agent session.

pub mod agents;
pub mod bridge;
pub mod chat;
pub mod command;
pub mod demo;
pub mod interpreter;
pub mod language;
pub mod services;
pub mod session;
pub mod terminal;

pub use agents::{AgentBoard, AgentRole, OrchestrationMode, Pacing, SingleAgentKind};
pub use bridge::{sync_tree, RuntimeGate, SyncReport};
pub use command::TerminalCommand;
pub use demo::{demo_tasks, find_demo, DemoTask};
pub use interpreter::{CommandInterpreter, CommandOutcome, RuntimeStatus};
pub use language::LanguageId;
pub use session::{AskOutcome, Session, SessionBusy, SessionError, SharedSession};
pub use terminal::{LineKind, TerminalLine, Transcript};
