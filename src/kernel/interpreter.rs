//! 终端命令解释器
//!
//! 每条输入先记录为 `Input` 行，再按语法分派。`python` 命令会把整个工作区
//! 同步到外部运行时后执行目标文件，输出逐条写回 transcript。

use crate::kernel::bridge::{sync_tree, RuntimeGate};
use crate::kernel::command::TerminalCommand;
use crate::kernel::services::ports::{ExecutionBridge, OutputSink, TerminalSettings};
use crate::kernel::terminal::{LineKind, Transcript};
use crate::models::{FileTree, NodeKind};

pub const BOOT_MESSAGE: &str = "System initialized. Waiting for Python...";
pub const NOT_READY_MESSAGE: &str = "Python is still loading...";
pub const UNRECOGNIZED_MESSAGE: &str = "Command not recognized. Try: python <filename>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Executed,
    ExecutionFailed,
    NotFound,
    Listed,
    Cleared,
    RuntimeNotReady,
    Unrecognized,
}

pub struct CommandInterpreter<B: ExecutionBridge> {
    gate: RuntimeGate<B>,
    status: RuntimeStatus,
    transcript: Transcript,
    last_error: Option<String>,
    base_path: String,
}

impl<B: ExecutionBridge> CommandInterpreter<B> {
    pub fn new(bridge: B, settings: &TerminalSettings) -> Self {
        let mut transcript = Transcript::new(settings.scrollback_lines);
        transcript.push(LineKind::Info, BOOT_MESSAGE);
        Self {
            gate: RuntimeGate::new(bridge),
            status: RuntimeStatus::Loading,
            transcript,
            last_error: None,
            base_path: settings.base_path.clone(),
        }
    }

    /// Waits for the runtime. A failure is final for this interpreter.
    pub async fn boot(&mut self) -> bool {
        match self.gate.ensure_ready().await {
            Ok(_) => {
                self.status = RuntimeStatus::Ready;
                let label = self.gate.bridge().label();
                self.transcript
                    .push(LineKind::Info, format!("{label} Runtime Ready."));
                true
            }
            Err(e) => {
                self.transcript
                    .push(LineKind::Error, format!("Failed to load Python: {e}"));
                self.status = RuntimeStatus::Failed(e.message);
                false
            }
        }
    }

    pub fn status(&self) -> &RuntimeStatus {
        &self.status
    }

    pub fn bridge(&self) -> &B {
        self.gate.bridge()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Error text of the most recent command, kept for the fix-suggestion flow.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `&mut self` keeps a second command from starting while one is in flight.
    pub async fn submit(&mut self, tree: &FileTree, line: &str) -> CommandOutcome {
        self.transcript.push(LineKind::Input, line);
        self.last_error = None;

        match &self.status {
            RuntimeStatus::Ready => {}
            RuntimeStatus::Loading => {
                self.transcript.push(LineKind::Error, NOT_READY_MESSAGE);
                return CommandOutcome::RuntimeNotReady;
            }
            RuntimeStatus::Failed(reason) => {
                let message = format!("Python runtime unavailable: {reason}");
                self.transcript.push(LineKind::Error, message);
                return CommandOutcome::RuntimeNotReady;
            }
        }

        let command = TerminalCommand::parse(line);
        tracing::debug!(command = command.name(), "terminal command");
        match command {
            TerminalCommand::Python { file } => self.run_python(tree, &file).await,
            TerminalCommand::Clear => {
                self.transcript.clear();
                CommandOutcome::Cleared
            }
            TerminalCommand::List => {
                for entry in tree.list_children(tree.root()) {
                    let suffix = if entry.kind == NodeKind::Folder { "/" } else { "" };
                    self.transcript
                        .push(LineKind::Output, format!("{}{suffix}", entry.name));
                }
                CommandOutcome::Listed
            }
            TerminalCommand::Unrecognized => {
                self.transcript.push(LineKind::Error, UNRECOGNIZED_MESSAGE);
                CommandOutcome::Unrecognized
            }
        }
    }

    async fn run_python(&mut self, tree: &FileTree, file: &str) -> CommandOutcome {
        let Some(id) = tree.find_by_name(file) else {
            self.transcript.push(
                LineKind::Error,
                format!("File '{file}' not found in virtual workspace."),
            );
            return CommandOutcome::NotFound;
        };

        self.transcript
            .push(LineKind::Info, format!("Running {file}..."));

        let handle = match self.gate.ensure_ready().await {
            Ok(handle) => handle,
            Err(e) => {
                self.transcript
                    .push(LineKind::Error, format!("Failed to load Python: {e}"));
                self.status = RuntimeStatus::Failed(e.message);
                return CommandOutcome::RuntimeNotReady;
            }
        };

        let report = sync_tree(&*handle, tree, &self.base_path);
        if !report.failures.is_empty() {
            tracing::warn!(
                failures = report.failures.len(),
                "workspace partially mirrored before run"
            );
        }

        let source = tree.content(id).unwrap_or_default();
        let mut sink = TranscriptSink {
            transcript: &mut self.transcript,
            stderr: String::new(),
        };
        let result = self
            .gate
            .bridge()
            .execute(&handle, source, &mut sink)
            .await;
        let captured = sink.stderr;

        match result {
            Ok(()) => {
                if !captured.is_empty() {
                    self.last_error = Some(captured);
                }
                CommandOutcome::Executed
            }
            Err(e) => {
                let message = e.to_string();
                tracing::info!(file, error = %message, "execution failed");
                let reported = !message.is_empty() && captured.contains(message.trim());
                if !reported {
                    self.transcript.push(LineKind::Error, message.clone());
                }
                self.last_error = Some(match (captured.is_empty(), reported) {
                    (true, _) => message,
                    (false, true) => captured,
                    (false, false) => format!("{captured}\n{message}"),
                });
                CommandOutcome::ExecutionFailed
            }
        }
    }
}

struct TranscriptSink<'t> {
    transcript: &'t mut Transcript,
    stderr: String,
}

impl OutputSink for TranscriptSink<'_> {
    fn stdout(&mut self, text: &str) {
        self.transcript
            .push(LineKind::Output, strip_trailing_newline(text));
    }

    fn stderr(&mut self, text: &str) {
        let text = strip_trailing_newline(text);
        self.transcript.push(LineKind::Error, text);
        if !self.stderr.is_empty() {
            self.stderr.push('\n');
        }
        self.stderr.push_str(text);
    }
}

fn strip_trailing_newline(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/interpreter.rs"]
mod tests;
