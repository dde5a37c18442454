//! Agent 状态看板与脚本化的工作流阶段。
//!
//! 只是展示用的状态流转，真正的回答来自 chat 客户端。

use crate::kernel::services::ports::AgentSettings;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Orchestrator,
    Planner,
    Coder,
    Critic,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Orchestrator,
        AgentRole::Planner,
        AgentRole::Coder,
        AgentRole::Critic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "ORCHESTRATOR",
            AgentRole::Planner => "PLANNER",
            AgentRole::Coder => "CODER",
            AgentRole::Critic => "CRITIC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestrationMode {
    Single,
    #[default]
    Multi,
}

impl OrchestrationMode {
    pub fn label(self) -> &'static str {
        match self {
            OrchestrationMode::Single => "SINGLE",
            OrchestrationMode::Multi => "MULTI",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "single" => Some(OrchestrationMode::Single),
            "multi" => Some(OrchestrationMode::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleAgentKind {
    #[default]
    React,
    LangChain,
}

impl SingleAgentKind {
    pub fn label(self) -> &'static str {
        match self {
            SingleAgentKind::React => "REACT",
            SingleAgentKind::LangChain => "LANGCHAIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "react" => Some(SingleAgentKind::React),
            "langchain" => Some(SingleAgentKind::LangChain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub role: AgentRole,
    pub is_active: bool,
    pub current_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Running,
    Success,
    Error,
}

impl ToolStatus {
    pub fn label(self) -> &'static str {
        match self {
            ToolStatus::Running => "running",
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLog {
    pub id: u64,
    pub tool_name: String,
    pub status: ToolStatus,
    pub args: String,
}

#[derive(Debug)]
pub struct AgentBoard {
    statuses: Vec<AgentStatus>,
    tool_logs: Vec<ToolLog>,
    next_log_id: u64,
}

impl AgentBoard {
    pub fn new() -> Self {
        Self {
            statuses: AgentRole::ALL
                .iter()
                .map(|&role| AgentStatus {
                    role,
                    is_active: false,
                    current_action: String::new(),
                })
                .collect(),
            tool_logs: Vec::new(),
            next_log_id: 1,
        }
    }

    pub fn statuses(&self) -> &[AgentStatus] {
        &self.statuses
    }

    pub fn status(&self, role: AgentRole) -> Option<&AgentStatus> {
        self.statuses.iter().find(|status| status.role == role)
    }

    pub fn set_status(&mut self, role: AgentRole, is_active: bool, action: impl Into<String>) {
        if let Some(status) = self.statuses.iter_mut().find(|status| status.role == role) {
            status.is_active = is_active;
            status.current_action = action.into();
        }
    }

    pub fn active_roles(&self) -> Vec<AgentRole> {
        self.statuses
            .iter()
            .filter(|status| status.is_active)
            .map(|status| status.role)
            .collect()
    }

    /// Newest entry first.
    pub fn tool_logs(&self) -> &[ToolLog] {
        &self.tool_logs
    }

    pub fn add_tool_log(
        &mut self,
        tool_name: impl Into<String>,
        status: ToolStatus,
        args: impl Into<String>,
    ) -> u64 {
        let id = self.next_log_id;
        self.next_log_id += 1;
        let log = ToolLog {
            id,
            tool_name: tool_name.into(),
            status,
            args: args.into(),
        };
        tracing::debug!(tool = %log.tool_name, status = log.status.label(), "tool log");
        self.tool_logs.insert(0, log);
        id
    }
}

impl Default for AgentBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Status {
        role: AgentRole,
        active: bool,
        action: &'static str,
    },
    /// Recorded as a running tool; `when_error` steps only fire when the
    /// terminal has a pending error.
    Tool {
        name: &'static str,
        args: &'static str,
        when_error: bool,
    },
    Pause {
        ms: u64,
    },
}

fn on(role: AgentRole, action: &'static str) -> WorkflowStep {
    WorkflowStep::Status {
        role,
        active: true,
        action,
    }
}

fn off(role: AgentRole) -> WorkflowStep {
    WorkflowStep::Status {
        role,
        active: false,
        action: "",
    }
}

fn pause(ms: u64) -> WorkflowStep {
    WorkflowStep::Pause { ms }
}

fn tool(name: &'static str, args: &'static str, when_error: bool) -> WorkflowStep {
    WorkflowStep::Tool {
        name,
        args,
        when_error,
    }
}

pub fn workflow_script(mode: OrchestrationMode, kind: SingleAgentKind) -> Vec<WorkflowStep> {
    use AgentRole::*;

    match (mode, kind) {
        (OrchestrationMode::Multi, _) => vec![
            on(Orchestrator, "Reading IDE Context..."),
            pause(600),
            off(Orchestrator),
            on(Planner, "Analyzing Code & Errors"),
            tool("analyze_error", "Processing traceback...", true),
            pause(800),
            off(Planner),
            on(Coder, "Formulating Fix"),
            pause(1000),
            off(Coder),
            on(Critic, "Reviewing Logic"),
            pause(800),
            off(Critic),
            on(Orchestrator, "Generating Response"),
        ],
        (OrchestrationMode::Single, SingleAgentKind::LangChain) => vec![
            on(Orchestrator, "AgentExecutor: Invoking Chain"),
            pause(700),
            on(Orchestrator, "AgentExecutor: Formatting Prompt"),
            tool("LangChain", "Retrieving tool schemas...", false),
            pause(800),
            on(Orchestrator, "AgentExecutor: Selecting Tool"),
            on(Coder, "ToolNode: Ready"),
            pause(600),
            tool("ToolNode", "Executing python_repl_ast...", true),
            on(Coder, "ToolNode: Executing"),
            pause(1000),
            off(Coder),
            on(Orchestrator, "AgentExecutor: Parsing Output"),
        ],
        (OrchestrationMode::Single, SingleAgentKind::React) => vec![
            on(Orchestrator, "ReAct: Reasoning..."),
            pause(800),
            tool("analyze_error", "Self-correction trace...", true),
            on(Orchestrator, "ReAct: Action -> Executing Tools"),
            on(Coder, "System: Execution Phase"),
            pause(1000),
            off(Coder),
            on(Orchestrator, "ReAct: Observation -> Finalizing"),
        ],
    }
}

/// Scales the scripted pauses. A factor of `0` skips sleeping entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    factor: f64,
}

impl Pacing {
    pub fn new(factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            0.0
        };
        Self { factor }
    }

    pub fn instant() -> Self {
        Self { factor: 0.0 }
    }

    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self::new(settings.pacing)
    }

    pub fn scale(self, ms: u64) -> Duration {
        Duration::from_secs_f64(ms as f64 * self.factor / 1000.0)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(1.0)
    }
}

pub async fn run_script(
    board: &mut AgentBoard,
    steps: &[WorkflowStep],
    has_error: bool,
    pacing: Pacing,
) {
    for step in steps {
        match *step {
            WorkflowStep::Status {
                role,
                active,
                action,
            } => board.set_status(role, active, action),
            WorkflowStep::Tool {
                name,
                args,
                when_error,
            } => {
                if !when_error || has_error {
                    board.add_tool_log(name, ToolStatus::Running, args);
                }
            }
            WorkflowStep::Pause { ms } => {
                let delay = pacing.scale(ms);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/agents.rs"]
mod tests;
