//! Math notation normalization pipeline
//!
//! Rewrites free-form AI-generated prose so that bare LaTeX-style math is
//! wrapped in the `$`/`$$` delimiters a markdown+math renderer expects. The
//! pipeline runs six pure stages per call: escape normalization, protection
//! of already-delimited spans, command scanning, bracket-run scanning, span
//! merging, and placeholder restoration.

pub mod bracket;
pub mod context;
pub mod environment;
pub mod escape;
pub mod merge;
pub mod protect;
pub mod scanner;

use serde::Serialize;

pub use context::{CandidateSpan, NormalizeOptions, Normalizer, SpanKind};

// =============================================================================
// Warning System
// =============================================================================

/// Kind of warning generated during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An unmatched `$` delimiter was left in place, unprotected
    DanglingDelimiter,
    /// A brace or paren group ran to the end of the input
    UnterminatedGroup,
    /// A `\begin{...}` had no matching `\end{...}`
    UnterminatedEnvironment,
    /// A placeholder token was restored zero times or more than once
    PlaceholderMismatch,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::DanglingDelimiter => write!(f, "dangling delimiter"),
            WarningKind::UnterminatedGroup => write!(f, "unterminated group"),
            WarningKind::UnterminatedEnvironment => write!(f, "unterminated environment"),
            WarningKind::PlaceholderMismatch => write!(f, "placeholder mismatch"),
        }
    }
}

/// A warning generated while normalizing. Warnings never abort the pipeline;
/// the returned text is always best-effort.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeWarning {
    /// The kind of warning
    pub kind: WarningKind,
    /// Human-readable message
    pub message: String,
    /// Location context (e.g., "\\frac" or "offset 42")
    pub location: Option<String>,
}

impl NormalizeWarning {
    /// Create a new warning
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        NormalizeWarning {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Add location context to the warning
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Create a dangling-delimiter warning
    pub fn dangling_delimiter(offset: usize) -> Self {
        NormalizeWarning::new(
            WarningKind::DanglingDelimiter,
            "unmatched '$' left untouched",
        )
        .with_location(format!("offset {}", offset))
    }

    /// Create an unterminated-group warning
    pub fn unterminated_group(command: &str) -> Self {
        NormalizeWarning::new(
            WarningKind::UnterminatedGroup,
            "bracket group ran to end of input",
        )
        .with_location(format!("\\{}", command))
    }

    /// Create an unterminated-environment warning
    pub fn unterminated_environment(name: &str) -> Self {
        NormalizeWarning::new(
            WarningKind::UnterminatedEnvironment,
            format!("\\begin{{{}}} has no matching \\end", name),
        )
        .with_location(format!("\\begin{{{}}}", name))
    }

    /// Create a placeholder-mismatch warning (internal invariant breach)
    pub fn placeholder_mismatch(index: usize, detail: &str) -> Self {
        NormalizeWarning::new(
            WarningKind::PlaceholderMismatch,
            format!("protected span {} {}", index, detail),
        )
        .with_location(format!("placeholder {}", index))
    }
}

impl std::fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl From<NormalizeWarning> for crate::utils::error::CliDiagnostic {
    fn from(warning: NormalizeWarning) -> Self {
        use crate::utils::error::{CliDiagnostic, DiagnosticSeverity};

        let severity = match warning.kind {
            WarningKind::PlaceholderMismatch => DiagnosticSeverity::Error,
            WarningKind::UnterminatedGroup | WarningKind::UnterminatedEnvironment => {
                DiagnosticSeverity::Warning
            }
            WarningKind::DanglingDelimiter => DiagnosticSeverity::Info,
        };

        let mut diag = CliDiagnostic::new(severity, warning.kind.to_string(), warning.message);
        if let Some(loc) = warning.location {
            diag = diag.with_location(loc);
        }
        diag
    }
}

/// Result of normalization with diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeResult {
    /// The normalized output
    pub output: String,
    /// Warnings generated during normalization
    pub warnings: Vec<NormalizeWarning>,
}

impl NormalizeResult {
    /// Create a new result with no warnings
    pub fn ok(output: String) -> Self {
        NormalizeResult {
            output,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings
    pub fn with_warnings(output: String, warnings: Vec<NormalizeWarning>) -> Self {
        NormalizeResult { output, warnings }
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get warnings as formatted strings
    pub fn format_warnings(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

/// Normalize chat text with default options.
pub fn normalize(input: &str) -> String {
    Normalizer::new().normalize(input)
}

/// Normalize chat text with explicit options.
pub fn normalize_with_options(input: &str, options: NormalizeOptions) -> String {
    Normalizer::with_options(options).normalize(input)
}

/// Normalize chat text and report degraded-quality diagnostics.
///
/// This is the recommended entry point for applications that want to log
/// dangling delimiters, truncated groups, and similar best-effort events.
///
/// # Example
///
/// ```
/// use mathfence::normalize_with_diagnostics;
///
/// let result = normalize_with_diagnostics(r"Compute \sin(x) now");
/// assert_eq!(result.output, r"Compute $\sin(x)$ now");
/// assert!(!result.has_warnings());
/// ```
pub fn normalize_with_diagnostics(input: &str) -> NormalizeResult {
    Normalizer::new().normalize_with_diagnostics(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = NormalizeWarning::unterminated_group("frac");
        let msg = warning.to_string();
        assert!(msg.contains("unterminated group"));
        assert!(msg.contains("\\frac"));
    }

    #[test]
    fn test_result_warning_accessors() {
        let ok = NormalizeResult::ok("x".to_string());
        assert!(!ok.has_warnings());

        let with = NormalizeResult::with_warnings(
            "x".to_string(),
            vec![NormalizeWarning::dangling_delimiter(3)],
        );
        assert!(with.has_warnings());
        assert_eq!(with.format_warnings().len(), 1);
    }

    #[test]
    fn test_severity_mapping() {
        use crate::utils::error::{CliDiagnostic, DiagnosticSeverity};

        let diag = CliDiagnostic::from(NormalizeWarning::placeholder_mismatch(0, "missing"));
        assert_eq!(diag.severity, DiagnosticSeverity::Error);

        let diag = CliDiagnostic::from(NormalizeWarning::dangling_delimiter(0));
        assert_eq!(diag.severity, DiagnosticSeverity::Info);
    }
}
