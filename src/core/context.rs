//! Core state and structures for math notation normalization
//!
//! This module contains the normalizer struct, its options, and the
//! candidate-span data model shared by the scanning stages.

use serde::{Deserialize, Serialize};

use super::{bracket, environment, escape, merge, protect, scanner};
use super::{NormalizeResult, NormalizeWarning};
use crate::data::commands::is_math_command;

// =============================================================================
// Normalization Options
// =============================================================================

/// Options for math notation normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Collapse doubled backslashes (`\\frac` -> `\frac`) before scanning.
    /// Default: true
    pub collapse_double_escapes: bool,

    /// Convert `\(...\)` to `$...$` and `\[...\]` to `$$...$$`.
    /// Default: true
    pub convert_bracket_delimiters: bool,

    /// Wrap bare math environments (`\begin{align}...\end{align}`) in
    /// `$$...$$` block delimiters.
    /// Default: true
    pub wrap_environments: bool,

    /// Command names accepted in addition to the built-in set, without the
    /// leading backslash. The built-in table is never mutated.
    /// Default: empty
    pub extra_commands: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            collapse_double_escapes: true,
            convert_bracket_delimiters: true,
            wrap_environments: true,
            extra_commands: Vec::new(),
        }
    }
}

impl NormalizeOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Core stages only: no environment wrapping, no escape rewriting.
    /// Useful when the input is known to be raw (non-JSON-escaped) text.
    pub fn minimal() -> Self {
        Self {
            collapse_double_escapes: false,
            convert_bracket_delimiters: true,
            wrap_environments: false,
            extra_commands: Vec::new(),
        }
    }

    /// Check a command name against the static table plus `extra_commands`.
    pub(crate) fn is_known_command(&self, name: &str) -> bool {
        is_math_command(name) || self.extra_commands.iter().any(|c| c == name)
    }
}

// =============================================================================
// Candidate Spans
// =============================================================================

/// Whether a candidate gets inline or block delimiters when wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Inline,
    Block,
}

/// A tentative character-offset range identified as "this should become
/// delimited math", subject to overlap resolution in the merger.
///
/// Offsets are half-open `[start, end)` char indices into the working text
/// as it exists after placeholder substitution. `text` is the replacement
/// content; for bracket candidates it is the run with the outer bracket
/// already stripped.
#[derive(Debug, Clone)]
pub struct CandidateSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub kind: SpanKind,
}

impl CandidateSpan {
    pub fn inline(start: usize, end: usize, text: String) -> Self {
        CandidateSpan {
            start,
            end,
            text,
            kind: SpanKind::Inline,
        }
    }

    pub fn block(start: usize, end: usize, text: String) -> Self {
        CandidateSpan {
            start,
            end,
            text,
            kind: SpanKind::Block,
        }
    }

    /// Half-open range intersection test.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// True if `[start, end)` intersects any accepted span.
pub(crate) fn overlaps_any(spans: &[CandidateSpan], start: usize, end: usize) -> bool {
    spans.iter().any(|s| s.overlaps(start, end))
}

/// Start offset of the nearest accepted span at or after `from`, if any.
/// Scanners use this to cap greedy extension so spans never grow into
/// regions already claimed by an earlier stage.
pub(crate) fn claim_limit(spans: &[CandidateSpan], from: usize) -> Option<usize> {
    spans.iter().map(|s| s.start).filter(|&s| s >= from).min()
}

/// True if the `$` (or any char) at `i` is preceded by an odd number of
/// backslashes, i.e. escaped.
pub(crate) fn is_escaped(chars: &[char], i: usize) -> bool {
    let mut backslashes = 0usize;
    let mut k = i;
    while k > 0 && chars[k - 1] == '\\' {
        backslashes += 1;
        k -= 1;
    }
    backslashes % 2 == 1
}

// =============================================================================
// Normalizer
// =============================================================================

/// The normalization engine.
///
/// Holds only immutable per-call configuration; no state survives between
/// invocations and the same input always yields the same output.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Create a normalizer with default options
    pub fn new() -> Self {
        Normalizer {
            options: NormalizeOptions::default(),
        }
    }

    /// Create a normalizer with the given options
    pub fn with_options(options: NormalizeOptions) -> Self {
        Normalizer { options }
    }

    /// Access the active options
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize text, discarding diagnostics.
    pub fn normalize(&self, input: &str) -> String {
        self.normalize_with_diagnostics(input).output
    }

    /// Run the full six-stage pipeline.
    ///
    /// Total over all string inputs: degraded quality is reported through
    /// warnings, never through an error or panic.
    pub fn normalize_with_diagnostics(&self, input: &str) -> NormalizeResult {
        // Nothing resembling math anywhere: contract requires a byte-exact
        // no-op, so skip the pipeline entirely.
        if !input.contains('\\') && !input.contains('$') {
            return NormalizeResult::ok(input.to_string());
        }

        let mut warnings: Vec<NormalizeWarning> = Vec::new();

        // Stage 1: escape normalization
        let text = escape::normalize_escapes(input, &self.options);

        // Stage 2: shield already-delimited math behind placeholders
        let (text, protected) = protect::extract_protected(&text, &mut warnings);

        // Stages 3-4 (+ environment supplement) collect candidates against
        // the placeholder-substituted text, coarsest collector first.
        let chars: Vec<char> = text.chars().collect();
        let mut candidates: Vec<CandidateSpan> = Vec::new();
        if self.options.wrap_environments {
            environment::scan_environments(&chars, &mut candidates, &mut warnings);
        }
        scanner::scan_commands(&chars, &self.options, &mut candidates, &mut warnings);
        bracket::scan_bracketed(&chars, &mut candidates);

        // Stage 5: wrap accepted candidates, highest offset first
        let merged = merge::apply_candidates(chars, candidates);

        // Stage 6: put the protected spans back
        let output = protect::restore_protected(&merged, &protected, &mut warnings);

        NormalizeResult::with_warnings(output, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = NormalizeOptions::default();
        assert!(options.collapse_double_escapes);
        assert!(options.convert_bracket_delimiters);
        assert!(options.wrap_environments);
        assert!(options.extra_commands.is_empty());
    }

    #[test]
    fn test_extra_commands_extend_the_set() {
        let mut options = NormalizeOptions::default();
        assert!(!options.is_known_command("myop"));
        options.extra_commands.push("myop".to_string());
        assert!(options.is_known_command("myop"));
        assert!(options.is_known_command("frac"));
    }

    #[test]
    fn test_span_overlap() {
        let span = CandidateSpan::inline(2, 5, "abc".to_string());
        assert!(span.overlaps(4, 6));
        assert!(span.overlaps(0, 3));
        assert!(!span.overlaps(5, 8));
        assert!(!span.overlaps(0, 2));
    }

    #[test]
    fn test_claim_limit() {
        let spans = vec![
            CandidateSpan::inline(10, 12, "a".to_string()),
            CandidateSpan::inline(4, 6, "b".to_string()),
        ];
        assert_eq!(claim_limit(&spans, 0), Some(4));
        assert_eq!(claim_limit(&spans, 5), Some(10));
        assert_eq!(claim_limit(&spans, 11), None);
    }

    #[test]
    fn test_is_escaped() {
        let chars: Vec<char> = r"a\$b".chars().collect();
        assert!(is_escaped(&chars, 2));
        let chars: Vec<char> = r"a\\$b".chars().collect();
        assert!(!is_escaped(&chars, 3));
    }

    #[test]
    fn test_plain_text_fast_path() {
        let normalizer = Normalizer::new();
        let input = "just words, numbers 42, and (parens)";
        assert_eq!(normalizer.normalize(input), input);
    }
}
