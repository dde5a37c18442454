//! 文件语言提示：按文件名后缀推断，仅用于展示。

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Python,
    Rust,
    Go,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    Java,
    Json,
    Yaml,
    Toml,
    Html,
    Css,
    Markdown,
    Bash,
    Text,
}

impl LanguageId {
    /// Unknown or missing suffixes map to [`LanguageId::Text`].
    pub fn from_name(name: &str) -> Self {
        let Some(ext) = Path::new(name).extension().and_then(|s| s.to_str()) else {
            return Self::Text;
        };
        match ext {
            "py" | "pyi" => Self::Python,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Self::TypeScript,
            "c" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" | "h" => Self::Cpp,
            "java" => Self::Java,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "md" | "markdown" => Self::Markdown,
            "sh" | "bash" | "zsh" => Self::Bash,
            _ => Self::Text,
        }
    }

    pub fn language_id(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Html => "html",
            Self::Css => "css",
            Self::Markdown => "markdown",
            Self::Bash => "bash",
            Self::Text => "text",
        }
    }

    pub fn is_runnable(self) -> bool {
        self == Self::Python
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
