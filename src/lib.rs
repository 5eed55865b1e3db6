//! Mathfence - math notation normalizer for AI chat output
//!
//! Takes free-form prose that may contain bare LaTeX-style math mixed with
//! markdown and rewrites it so a markdown+math renderer can typeset it:
//! bare expressions get wrapped in `$`/`$$` delimiters, `\(...\)` and
//! `\[...\]` become dollar form, and text that is already correctly
//! delimited is never touched twice.
//!
//! The entry point is a single total function:
//!
//! ```
//! use mathfence::normalize;
//!
//! assert_eq!(normalize(r"Compute \sin(x) now"), r"Compute $\sin(x)$ now");
//! assert_eq!(normalize(r"$\sin(x)$"), r"$\sin(x)$");
//! ```
//!
//! Normalization never fails and never allocates global state: each call is
//! an independent, deterministic text transform, cheap enough to re-run on
//! every incremental render of a streaming response.

pub mod core;
pub mod data;
pub mod utils;

pub use crate::core::{
    normalize, normalize_with_diagnostics, normalize_with_options, CandidateSpan,
    NormalizeOptions, NormalizeResult, NormalizeWarning, Normalizer, SpanKind, WarningKind,
};
pub use crate::utils::error::{CliDiagnostic, DiagnosticSeverity, EngineError, EngineResult};
