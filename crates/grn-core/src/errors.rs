//! Structured error types shared across the synthesis crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SynthError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (names, counts, positions, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type of the synthesis pipeline.
///
/// Each variant corresponds to one failure family; all of them abort the
/// worker, there is no in-core recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SynthError {
    /// Malformed input document or unknown fields.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// A specie or automaton state name violates the naming rules.
    #[error("invalid name: {0}")]
    InvalidName(ErrorInfo),
    /// A level or threshold lies outside the range of its specie.
    #[error("value out of range: {0}")]
    OutOfRange(ErrorInfo),
    /// A parameter specification names a regulatory context that does not exist.
    #[error("unknown context: {0}")]
    UnknownContext(ErrorInfo),
    /// Two regulations share the same (source, target, threshold) triple.
    #[error("duplicate regulation: {0}")]
    DuplicateRegulation(ErrorInfo),
    /// No regulatory context matched a state; indicates a construction bug.
    #[error("no context match: {0}")]
    NoContextMatch(ErrorInfo),
    /// The platform failed the bitmask self-test.
    #[error("malformed bits: {0}")]
    MalformedBits(ErrorInfo),
    /// A constructed structure exceeds the addressable range.
    #[error("state explosion: {0}")]
    StateExplosion(ErrorInfo),
    /// An external mask filter disagrees with the derived batch count.
    #[error("batch mismatch: {0}")]
    BatchMismatch(ErrorInfo),
    /// A backing file could not be read or written.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl SynthError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SynthError::Parse(info)
            | SynthError::InvalidName(info)
            | SynthError::OutOfRange(info)
            | SynthError::UnknownContext(info)
            | SynthError::DuplicateRegulation(info)
            | SynthError::NoContextMatch(info)
            | SynthError::MalformedBits(info)
            | SynthError::StateExplosion(info)
            | SynthError::BatchMismatch(info)
            | SynthError::Io(info) => info,
        }
    }

    /// Wraps a std io error together with the path it occurred on.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        SynthError::Io(
            ErrorInfo::new("io", err.to_string()).with_context("path", path),
        )
    }
}
