//! Gemini `generateContent` client with chat-session semantics: the
//! conversation is resent on every turn together with a fixed system
//! instruction.

use crate::kernel::services::ports::{BoxFuture, ChatClient, ChatError, ChatSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;

pub const SYSTEM_INSTRUCTION: &str = r#"You are the "Agent Core" of a Multi-Agent Coding Assistant designed for course-scale repositories.
Your architecture consists of:
1. Orchestrator (You): Coordinate the workflow.
2. Planner: Decompose tasks into sub-tasks.
3. Coder: Write code and apply patches.
4. Critic: Run tests and review diffs.

You are integrated into a Web IDE. The user's current code context (active file and project structure) is provided.
You also have access to the "Last Runtime Output/Error" from the user's terminal.

If the user reports an error or asks for a fix:
1. Analyze the "Last Runtime Error".
2. Explain what caused the error in the context of the code.
3. Provide the corrected code or specific changes to apply.

When the user asks a coding question:
1. Analyze the provided code context.
2. Briefly acknowledge the complexity.
3. Pretend to delegate to the Planner, Coder, and Critic.
4. Summarize the changes made.

Keep your final response concise and professional."#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Concatenated text parts of the first candidate.
fn reply_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    (!text.is_empty()).then_some(text)
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    history: Mutex<Vec<Content>>,
}

impl GeminiClient {
    pub fn new(settings: &ChatSettings, api_key: String) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint(settings),
            api_key,
            history: Mutex::new(Vec::new()),
        })
    }

    /// Reads the key from the environment variable named in the settings.
    pub fn from_settings(settings: &ChatSettings) -> Result<Self, ChatError> {
        let api_key = settings.api_key().ok_or(ChatError::MissingApiKey)?;
        Self::new(settings, api_key)
    }
}

fn endpoint(settings: &ChatSettings) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        settings.api_base.trim_end_matches('/'),
        settings.model
    )
}

impl ChatClient for GeminiClient {
    fn send<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<Option<String>, ChatError>> {
        Box::pin(async move {
            let mut history = self.history.lock().await;
            let mut contents = history.clone();
            contents.push(Content::text(Some("user"), message));

            let request = GenerateRequest {
                system_instruction: Content::text(None, SYSTEM_INSTRUCTION),
                contents: &contents,
            };
            tracing::debug!(turns = contents.len(), "sending chat request");

            let response = self
                .http
                .post(self.endpoint.as_str())
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| ChatError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ChatError::Status {
                    code: status.as_u16(),
                    body,
                });
            }

            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| ChatError::Parse(e.to_string()))?;
            let text = reply_text(&parsed);

            // Failed turns are not remembered.
            contents.push(Content::text(Some("model"), text.clone().unwrap_or_default()));
            *history = contents;
            Ok(text)
        })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/gemini.rs"]
mod tests;
