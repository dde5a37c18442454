use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub runtime: RuntimeSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub agents: AgentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Interpreter executable, looked up on `PATH` when not absolute.
    pub python: String,
    pub label: String,
    /// Directory the workspace is mirrored into before each run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            label: "Python 3".to_string(),
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl ChatSettings {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    pub scrollback_lines: usize,
    /// Runtime directory the workspace root is mirrored onto.
    pub base_path: String,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            scrollback_lines: crate::kernel::terminal::DEFAULT_SCROLLBACK_LINES,
            base_path: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Multiplier for the scripted agent delays; `0` disables them.
    pub pacing: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { pacing: 1.0 }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
