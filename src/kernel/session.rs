//! 会话：一个工作区连同它的终端、Agent 看板与对话记录。
//!
//! 所有修改都经由 `&mut self`，同一时刻只会有一条终端命令在执行。
//! 跨任务共享时使用 [`SharedSession`]。

use crate::kernel::agents::{
    run_script, workflow_script, AgentBoard, AgentRole, OrchestrationMode, Pacing,
    SingleAgentKind, ToolStatus,
};
use crate::kernel::chat::{
    compose_message, extract_code_block, ChatLog, IdeContext, OpenFile, PendingSuggestion,
    EMPTY_REPLY_MESSAGE, MISSING_KEY_MESSAGE, NO_ACTIVE_FILE_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
};
use crate::kernel::demo::DemoTask;
use crate::kernel::interpreter::{CommandInterpreter, CommandOutcome, RuntimeStatus};
use crate::kernel::services::ports::{ChatClient, ExecutionBridge, Settings};
use crate::kernel::terminal::{LineKind, Transcript};
use crate::models::{FileTree, FileTreeError, ImportedFile, NodeId, NodeKind};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NoActiveFile,
    NoPendingSuggestion,
    Tree(FileTreeError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoActiveFile => write!(f, "no file is open"),
            SessionError::NoPendingSuggestion => write!(f, "no suggestion is waiting"),
            SessionError::Tree(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<FileTreeError> for SessionError {
    fn from(e: FileTreeError) -> Self {
        SessionError::Tree(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    /// No chat client is configured.
    MissingKey,
    /// The reply was recorded; nothing to apply.
    Replied,
    /// The reply carried code and a suggestion is waiting for confirmation.
    Suggested,
    /// The reply carried code but no file was open.
    NoTarget,
    /// Transport or API failure; the fallback message was recorded.
    Failed,
}

pub struct Session<B: ExecutionBridge> {
    tree: FileTree,
    interpreter: CommandInterpreter<B>,
    agents: AgentBoard,
    chat: ChatLog,
    pending: Option<PendingSuggestion>,
    mode: OrchestrationMode,
    single_agent: SingleAgentKind,
    pacing: Pacing,
}

impl<B: ExecutionBridge> Session<B> {
    pub fn new(bridge: B, settings: &Settings) -> Self {
        Self {
            tree: FileTree::default_scaffold(),
            interpreter: CommandInterpreter::new(bridge, &settings.terminal),
            agents: AgentBoard::new(),
            chat: ChatLog::new(),
            pending: None,
            mode: OrchestrationMode::default(),
            single_agent: SingleAgentKind::default(),
            pacing: Pacing::from_settings(&settings.agents),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub async fn boot(&mut self) -> bool {
        self.interpreter.boot().await
    }

    pub async fn submit(&mut self, line: &str) -> CommandOutcome {
        self.interpreter.submit(&self.tree, line).await
    }

    // ---- accessors ----

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn transcript(&self) -> &Transcript {
        self.interpreter.transcript()
    }

    pub fn runtime_status(&self) -> &RuntimeStatus {
        self.interpreter.status()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.interpreter.last_error()
    }

    pub fn agents(&self) -> &AgentBoard {
        &self.agents
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn pending_suggestion(&self) -> Option<&PendingSuggestion> {
        self.pending.as_ref()
    }

    pub fn mode(&self) -> OrchestrationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OrchestrationMode) {
        self.mode = mode;
    }

    pub fn single_agent(&self) -> SingleAgentKind {
        self.single_agent
    }

    pub fn set_single_agent(&mut self, kind: SingleAgentKind) {
        self.single_agent = kind;
    }

    pub fn active_file(&self) -> Option<NodeId> {
        self.tree
            .selected()
            .filter(|&id| self.tree.kind(id) == Some(NodeKind::File))
    }

    // ---- workspace ----

    /// Creates next to the current selection. A new file becomes the
    /// selection; a new folder does not.
    pub fn create_entry(&mut self, kind: NodeKind, name: &str) -> Result<NodeId, SessionError> {
        let hint = self.tree.selected();
        let id = self.tree.create_entry(hint, name, kind)?;
        if kind == NodeKind::File {
            self.tree.set_selected(Some(id));
        }
        Ok(id)
    }

    /// Returns `false` for an id that is not part of the workspace.
    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.tree.set_selected(Some(id));
        true
    }

    pub fn edit_active(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        let id = self.active_file().ok_or(SessionError::NoActiveFile)?;
        self.tree.set_content(id, content)?;
        Ok(())
    }

    pub fn import<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = ImportedFile>,
    {
        let count = self.tree.bulk_import(files);
        tracing::info!(count, "workspace import");
        self.interpreter
            .transcript_mut()
            .push(LineKind::Info, format!("Imported {count} files successfully."));
        count
    }

    /// Replaces the workspace with the task's files, runs its initial command
    /// and returns the request meant for the agent.
    pub async fn load_demo(&mut self, task: &DemoTask, mode: OrchestrationMode) -> &'static str {
        tracing::info!(task = task.id, mode = mode.label(), "loading demo task");
        self.mode = mode;
        self.pending = None;
        self.tree.replace_with(&task.files);
        self.interpreter
            .transcript_mut()
            .reset(format!("Initializing Evaluation Task: {}", task.title));

        let root = self.tree.root();
        let first_file = self
            .tree
            .list_children(root)
            .into_iter()
            .find(|entry| entry.kind == NodeKind::File)
            .map(|entry| entry.id);
        self.tree.set_selected(first_file);

        self.submit(task.initial_command).await;
        task.user_prompt
    }

    // ---- agent ----

    pub async fn ask(&mut self, client: Option<&dyn ChatClient>, prompt: &str) -> AskOutcome {
        self.chat.push_user(prompt);
        let Some(client) = client else {
            self.chat.push_system(MISSING_KEY_MESSAGE);
            return AskOutcome::MissingKey;
        };

        let has_error = self.last_error().is_some();
        let script = workflow_script(self.mode, self.single_agent);
        run_script(&mut self.agents, &script, has_error, self.pacing).await;

        let message = self.compose(prompt);
        let (reply, failed) = match client.send(&message).await {
            Ok(Some(text)) if !text.trim().is_empty() => (text, false),
            Ok(_) => (EMPTY_REPLY_MESSAGE.to_string(), false),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                (TRANSPORT_FAILURE_MESSAGE.to_string(), true)
            }
        };
        self.chat.push_agent(reply.as_str());

        let outcome = if failed {
            AskOutcome::Failed
        } else {
            match extract_code_block(&reply) {
                None => AskOutcome::Replied,
                Some(code) => self.offer_suggestion(code),
            }
        };
        self.agents.set_status(AgentRole::Orchestrator, false, "");
        outcome
    }

    fn compose(&self, prompt: &str) -> String {
        let snapshot = self.tree.snapshot();
        let open_file = self.active_file().and_then(|id| {
            Some(OpenFile {
                name: self.tree.name(id)?,
                content: self.tree.content(id)?,
            })
        });
        let context = IdeContext {
            mode: self.mode,
            single_agent: self.single_agent,
            structure: &snapshot,
            open_file,
        };
        compose_message(prompt, Some(&context.render()), self.last_error())
    }

    fn offer_suggestion(&mut self, code: &str) -> AskOutcome {
        let target = self
            .active_file()
            .and_then(|id| Some((id, self.tree.name(id)?.to_string())));
        match target {
            Some((target, target_name)) => {
                tracing::info!(file = %target_name, "code suggestion pending");
                self.pending = Some(PendingSuggestion {
                    target,
                    target_name,
                    code: code.to_string(),
                });
                AskOutcome::Suggested
            }
            None => {
                self.chat.push_system(NO_ACTIVE_FILE_MESSAGE);
                AskOutcome::NoTarget
            }
        }
    }

    /// Writes the pending code into its target file. Returns the file name.
    pub fn confirm_suggestion(&mut self) -> Result<String, SessionError> {
        let suggestion = self
            .pending
            .take()
            .ok_or(SessionError::NoPendingSuggestion)?;
        self.tree.set_content(suggestion.target, suggestion.code)?;

        let name = suggestion.target_name;
        self.agents.add_tool_log(
            "apply_patch",
            ToolStatus::Success,
            format!("Updated {name}"),
        );
        self.interpreter.transcript_mut().push(
            LineKind::Info,
            format!("Successfully updated {name} with agent's suggestion."),
        );
        Ok(name)
    }

    pub fn discard_suggestion(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionBusy;

impl fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a command is already running")
    }
}

impl std::error::Error for SessionBusy {}

/// Session shared across tasks. Commands never queue: a second submission
/// while one is running is refused with [`SessionBusy`].
pub struct SharedSession<B: ExecutionBridge> {
    inner: Arc<Mutex<Session<B>>>,
}

impl<B: ExecutionBridge> Clone for SharedSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: ExecutionBridge> SharedSession<B> {
    pub fn new(session: Session<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn try_submit(&self, line: &str) -> Result<CommandOutcome, SessionBusy> {
        let mut session = self.inner.try_lock().map_err(|_| SessionBusy)?;
        Ok(session.submit(line).await)
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session<B>> {
        self.inner.lock().await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
