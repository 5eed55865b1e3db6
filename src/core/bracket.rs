//! Bracket-wrapped expression scanning (pipeline stage 4)
//!
//! A parenthesized or bracketed run that contains a command token is treated
//! as one expression, with the outer bracket stripped. This patches cases
//! where per-command expansion produced nothing usable, e.g. a command deep
//! inside an enclosing bracket that failed the lookahead guard.

use super::context::{is_escaped, overlaps_any, CandidateSpan};
use super::protect::PLACEHOLDER_OPEN;
use super::scanner::COMMAND_TOKEN;

/// Scan for whole-bracket candidates and append them to `candidates`.
pub fn scan_bracketed(chars: &[char], candidates: &mut Vec<CandidateSpan>) {
    let mut parity = 0u32;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c == '$' {
            if !is_escaped(chars, i) {
                parity ^= 1;
            }
            i += 1;
            continue;
        }
        if (c != '(' && c != '[') || parity == 1 || overlaps_any(candidates, i, i + 1) {
            i += 1;
            continue;
        }

        let Some(close) = find_bracket_close(chars, i) else {
            i += 1;
            continue;
        };
        if overlaps_any(candidates, i, close + 1) {
            i += 1;
            continue;
        }

        let inner: String = chars[i + 1..close].iter().collect();
        if inner.contains(PLACEHOLDER_OPEN)
            || inner.contains('$')
            || !COMMAND_TOKEN.is_match(&inner)
        {
            i += 1;
            continue;
        }

        let text = inner.trim().to_string();
        if text.is_empty() {
            i += 1;
            continue;
        }

        candidates.push(CandidateSpan::inline(i, close + 1, text));
        i = close + 1;
    }
}

/// Index of the matching close bracket, same kind only, tracking depth.
/// Fails on an embedded newline or end of input.
fn find_bracket_close(chars: &[char], open_idx: usize) -> Option<usize> {
    let open = chars[open_idx];
    let close = if open == '(' { ')' } else { ']' };
    let mut depth = 0i32;
    let mut i = open_idx;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            return None;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<CandidateSpan> {
        let chars: Vec<char> = input.chars().collect();
        let mut candidates = Vec::new();
        scan_bracketed(&chars, &mut candidates);
        candidates
    }

    #[test]
    fn test_bracketed_command_run() {
        let found = scan(r"value (\alpha + 1) end");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\alpha + 1");
        assert_eq!(found[0].start, 6);
        assert_eq!(found[0].end, 18);
    }

    #[test]
    fn test_square_brackets() {
        let found = scan(r"[\alpha, \beta]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\alpha, \beta");
    }

    #[test]
    fn test_plain_parens_ignored() {
        assert!(scan("sum (1 + 2) done").is_empty());
    }

    #[test]
    fn test_newline_breaks_run() {
        assert!(scan("(\\alpha\n+ 1)").is_empty());
    }

    #[test]
    fn test_nested_parens_matched() {
        let found = scan(r"(\cos(6x))");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\cos(6x)");
        assert_eq!(found[0].start, 0);
        assert_eq!(found[0].end, 10);
    }

    #[test]
    fn test_overlapping_accepted_span_skipped() {
        let chars: Vec<char> = r"(\cos(6x))".chars().collect();
        let mut candidates = vec![CandidateSpan::inline(1, 9, r"\cos(6x)".to_string())];
        scan_bracketed(&chars, &mut candidates);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_dollar_inside_run_is_conservative() {
        assert!(scan(r"(\alpha $x)").is_empty());
    }
}
