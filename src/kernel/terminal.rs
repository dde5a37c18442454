pub type LineId = u64;

pub const DEFAULT_SCROLLBACK_LINES: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Input,
    Output,
    Error,
    Info,
}

impl LineKind {
    pub fn label(self) -> &'static str {
        match self {
            LineKind::Input => "input",
            LineKind::Output => "output",
            LineKind::Error => "error",
            LineKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub id: LineId,
    pub kind: LineKind,
    pub content: String,
}

/// Ordered terminal log. Lines are only appended; `clear`/`reset` are the
/// only ways to drop them besides the scrollback cap.
#[derive(Debug)]
pub struct Transcript {
    lines: Vec<TerminalLine>,
    next_id: LineId,
    scrollback: usize,
}

impl Transcript {
    pub fn new(scrollback: usize) -> Self {
        Self {
            lines: Vec::new(),
            next_id: 1,
            scrollback: scrollback.max(1),
        }
    }

    pub fn push(&mut self, kind: LineKind, content: impl Into<String>) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(TerminalLine {
            id,
            kind,
            content: content.into(),
        });

        if self.lines.len() > self.scrollback {
            let overflow = self.lines.len() - self.scrollback;
            self.lines.drain(..overflow);
        }
        id
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn reset(&mut self, info: impl Into<String>) {
        self.lines.clear();
        self.push(LineKind::Info, info);
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    /// Lines appended after `id`, for callers that print incrementally.
    pub fn since(&self, id: Option<LineId>) -> &[TerminalLine] {
        let Some(id) = id else {
            return &self.lines;
        };
        let start = self.lines.partition_point(|line| line.id <= id);
        &self.lines[start..]
    }

    pub fn last_id(&self) -> Option<LineId> {
        self.lines.last().map(|line| line.id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_LINES)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/terminal.rs"]
mod tests;
