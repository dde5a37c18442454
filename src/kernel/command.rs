//! 终端命令语法：按空白切分，大小写敏感，不支持引号与转义。

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// `python <file>`
    Python { file: String },
    /// `clear`
    Clear,
    /// `ls`
    List,
    Unrecognized,
}

impl TerminalCommand {
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["python", file] => TerminalCommand::Python {
                file: (*file).to_string(),
            },
            ["clear"] => TerminalCommand::Clear,
            ["ls"] => TerminalCommand::List,
            _ => TerminalCommand::Unrecognized,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerminalCommand::Python { .. } => "python",
            TerminalCommand::Clear => "clear",
            TerminalCommand::List => "ls",
            TerminalCommand::Unrecognized => "unrecognized",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/command.rs"]
mod tests;
