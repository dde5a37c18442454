//! Chat request contract: the IDE context sent with each prompt, the reply
//! fallbacks, and extraction of code suggestions from replies.

use crate::kernel::agents::{AgentRole, OrchestrationMode, SingleAgentKind};
use crate::models::{NodeId, TreeSnapshot};
use regex::Regex;
use std::sync::LazyLock;

pub const WELCOME_MESSAGE: &str =
    "I'm ready. Upload your code or run a script in the terminal. If it fails, I can help fix it.";
pub const MISSING_KEY_MESSAGE: &str = "Please add an API key to continue.";
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Error communicating with the Agent Core. Please check your API Key and quota.";
pub const EMPTY_REPLY_MESSAGE: &str = "I processed the request but returned no text.";
pub const SUGGESTION_EXPLANATION: &str =
    "The Agent generated code changes to fix the issue. Do you want to apply them to the current file?";
pub const NO_ACTIVE_FILE_MESSAGE: &str =
    "Received code suggestion but no file is active to apply it to.";

const CONTEXT_HEADER: &str = "\n\n--- CURRENT IDE CONTEXT ---\n";
const ERROR_HEADER: &str = "\n\n--- LAST RUNTIME ERROR/OUTPUT ---\n";
const ERROR_INSTRUCTION: &str =
    "\n\nINSTRUCTION: The user encountered the error above. Analyze it and fix the code.";

const MODEL_INSTRUCTION: &str = "Instruction to Model:
If Single Agent LangChain mode is active, structure your response as if you are a LangChain AgentExecutor (e.g., \"Thought: ..., Action: ..., Observation: ...\").
If Single Agent ReAct mode is active, use standard ReAct prompting style.
If Multi-Agent, act as the Orchestrator summarizing the swarm's work.";

static CODE_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:python|bash|javascript|typescript)?\s*(.*?)```").ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Agent,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub kind: MessageKind,
    pub role: Option<AgentRole>,
    pub content: String,
}

/// Conversation shown beside the editor. Starts with the orchestrator's
/// greeting.
#[derive(Debug)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        let mut log = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        log.push(MessageKind::Agent, Some(AgentRole::Orchestrator), WELCOME_MESSAGE);
        log
    }

    fn push(&mut self, kind: MessageKind, role: Option<AgentRole>, content: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            kind,
            role,
            content: content.into(),
        });
        id
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> u64 {
        self.push(MessageKind::User, None, content)
    }

    pub fn push_agent(&mut self, content: impl Into<String>) -> u64 {
        self.push(MessageKind::Agent, Some(AgentRole::Orchestrator), content)
    }

    pub fn push_system(&mut self, content: impl Into<String>) -> u64 {
        self.push(MessageKind::System, None, content)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn since(&self, id: Option<u64>) -> &[ChatMessage] {
        let Some(id) = id else {
            return &self.messages;
        };
        let start = self.messages.partition_point(|m| m.id <= id);
        &self.messages[start..]
    }

    pub fn last_id(&self) -> Option<u64> {
        self.messages.last().map(|m| m.id)
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpenFile<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

/// Snapshot of the editor state attached to every prompt.
#[derive(Debug, Clone)]
pub struct IdeContext<'a> {
    pub mode: OrchestrationMode,
    pub single_agent: SingleAgentKind,
    pub structure: &'a TreeSnapshot,
    pub open_file: Option<OpenFile<'a>>,
}

impl IdeContext<'_> {
    pub fn architecture(&self) -> &'static str {
        match self.mode {
            OrchestrationMode::Single => self.single_agent.label(),
            OrchestrationMode::Multi => "Multi-Agent Swarm",
        }
    }

    pub fn render(&self) -> String {
        let structure = serde_json::to_string_pretty(self.structure).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to serialize project structure");
            String::from("{}")
        });
        let (file_name, file_content) = match self.open_file {
            Some(file) => (file.name, file.content),
            None => ("None", "N/A"),
        };

        format!(
            "Current Mode: {mode} Agent\n\
             Specific Architecture: {arch}\n\
             Project Structure JSON:\n\
             {structure}\n\
             \n\
             Currently Open File: {file_name}\n\
             File Content:\n\
             {file_content}\n\
             \n\
             {MODEL_INSTRUCTION}",
            mode = self.mode.label(),
            arch = self.architecture(),
        )
    }
}

pub fn compose_message(prompt: &str, context: Option<&str>, last_error: Option<&str>) -> String {
    let mut message = String::from(prompt);
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        message.push_str(CONTEXT_HEADER);
        message.push_str(context);
    }
    if let Some(error) = last_error.filter(|e| !e.is_empty()) {
        message.push_str(ERROR_HEADER);
        message.push_str(error);
        message.push_str(ERROR_INSTRUCTION);
    }
    message
}

/// Body of the first fenced block. Blocks with an empty body do not count.
pub fn extract_code_block(reply: &str) -> Option<&str> {
    let regex = CODE_BLOCK.as_ref()?;
    let body = regex.captures(reply)?.get(1)?.as_str();
    (!body.is_empty()).then_some(body)
}

/// Code waiting for confirmation, bound to the file that was active when
/// the reply arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    pub target: NodeId,
    pub target_name: String,
    pub code: String,
}

impl PendingSuggestion {
    pub fn prompt(&self) -> String {
        format!("{SUGGESTION_EXPLANATION} (Target: {})", self.target_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/chat.rs"]
mod tests;
