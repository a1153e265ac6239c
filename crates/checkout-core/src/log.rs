//! Flow Log
//!
//! Ordered, append-only audit trail returned to the caller. Every entry is
//! also emitted as a `tracing` event.

use serde::{Deserialize, Serialize};

/// Pipeline stages, declared in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Init,
    Token,
    OrderCreate,
    OrderDetails,
    OrderUpdate,
    Confirmation,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Token => "token",
            Self::OrderCreate => "order-create",
            Self::OrderDetails => "order-details",
            Self::OrderUpdate => "order-update",
            Self::Confirmation => "confirmation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry classification
///
/// `FallbackUsed` is informational: the token stage degraded but the flow
/// carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    FallbackUsed,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub stage: Stage,
    pub kind: LogKind,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowLog {
    entries: Vec<LogEntry>,
}

impl FlowLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(stage, LogKind::Info, message.into());
    }

    pub fn fallback(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(stage, LogKind::FallbackUsed, message.into());
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(stage, LogKind::Error, message.into());
    }

    fn push(&mut self, stage: Stage, kind: LogKind, message: String) {
        match kind {
            LogKind::Info => tracing::info!(stage = %stage, "{}", message),
            LogKind::FallbackUsed => tracing::warn!(stage = %stage, fallback = true, "{}", message),
            LogKind::Error => tracing::error!(stage = %stage, "{}", message),
        }
        self.entries.push(LogEntry { stage, kind, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stages in log order, with consecutive repeats collapsed
    ///
    /// A stage that reappears after another one is listed again.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = Vec::new();
        for entry in &self.entries {
            if stages.last() != Some(&entry.stage) {
                stages.push(entry.stage);
            }
        }
        stages
    }

    pub fn contains_kind(&self, kind: LogKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Plain lines, as shown in a debug console
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }
}
