//! Span merging and overlap resolution (pipeline stage 5)
//!
//! Candidates are applied from the highest start offset down to the lowest,
//! so every insertion is computed against a prefix that has not moved yet.
//! A candidate that touches an existing `$` is skipped outright: the merger
//! must never produce nested or doubled delimiters.

use super::context::{CandidateSpan, SpanKind};

/// Wrap every surviving candidate in delimiters and return the new text.
pub fn apply_candidates(chars: Vec<char>, mut candidates: Vec<CandidateSpan>) -> String {
    if candidates.is_empty() {
        return chars.into_iter().collect();
    }

    candidates.sort_by(|a, b| b.start.cmp(&a.start));

    let mut chars = chars;
    let mut accepted: Vec<(usize, usize)> = Vec::new();

    for cand in candidates {
        if cand.text.is_empty() {
            continue;
        }
        if accepted
            .iter()
            .any(|&(s, e)| cand.start < e && s < cand.end)
        {
            continue;
        }
        // Abutment check against the current text state: offsets at or after
        // `end` may already hold a freshly inserted `$`.
        if cand.start > 0 && chars[cand.start - 1] == '$' {
            continue;
        }
        if cand.end < chars.len() && chars[cand.end] == '$' {
            continue;
        }

        let wrapped = match cand.kind {
            SpanKind::Inline => format!("${}$", cand.text),
            SpanKind::Block => format!("$${}$$", cand.text),
        };
        chars.splice(cand.start..cand.end, wrapped.chars());
        accepted.push((cand.start, cand.end));
    }

    chars.into_iter().collect()
}
