//! Error handling for the normalization engine
//!
//! The engine itself is a total function over strings and never fails; the
//! error type here exists for the CLI layer (file and stream I/O). Degraded
//! normalization quality is reported through warnings, not errors.

use std::fmt;

/// Engine error type (CLI surface only)
#[derive(Debug, Clone)]
pub enum EngineError {
    /// IO error (for file operations)
    IoError { message: String },
    /// Invalid invocation (bad flag combination, unreadable path)
    InvalidInput { message: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            EngineError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError {
            message: err.to_string(),
        }
    }
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unified CLI Diagnostic System
// =============================================================================

/// Severity level for CLI diagnostics (determines coloring and behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Critical issues (red) - e.g., placeholder restoration mismatch
    Error,
    /// Warnings (yellow) - e.g., unterminated brace group
    Warning,
    /// Informational (cyan) - e.g., dangling dollar left untouched
    Info,
}

/// Unified diagnostic type for CLI output.
///
/// Normalization warnings convert into this for display; the severity drives
/// coloring and the `--check` exit status.
#[derive(Debug, Clone)]
pub struct CliDiagnostic {
    /// Severity level (for coloring and strict mode)
    pub severity: DiagnosticSeverity,
    /// Warning kind as string (e.g., "unterminated group")
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// Location context (e.g., "\\frac", "offset 42")
    pub location: Option<String>,
}

impl CliDiagnostic {
    /// Create a new diagnostic.
    pub fn new(
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind: kind.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Add location context.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Get ANSI color code for this diagnostic's severity.
    pub fn color_code(&self) -> &'static str {
        match self.severity {
            DiagnosticSeverity::Error => "\x1b[31m",   // red
            DiagnosticSeverity::Warning => "\x1b[33m", // yellow
            DiagnosticSeverity::Info => "\x1b[36m",    // cyan
        }
    }
}

impl fmt::Display for CliDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = EngineError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = CliDiagnostic::new(
            DiagnosticSeverity::Warning,
            "unterminated group",
            "brace group ran to end of input",
        )
        .with_location("\\frac");
        let msg = diag.to_string();
        assert!(msg.contains("[unterminated group]"));
        assert!(msg.contains("\\frac"));
    }

    #[test]
    fn test_severity_colors_differ() {
        let e = CliDiagnostic::new(DiagnosticSeverity::Error, "k", "m");
        let w = CliDiagnostic::new(DiagnosticSeverity::Warning, "k", "m");
        assert_ne!(e.color_code(), w.color_code());
    }
}
