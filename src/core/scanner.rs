//! Command scanning (pipeline stage 3)
//!
//! Walks the placeholder-substituted text looking for backslash commands
//! and greedily expands each into a candidate expression span: balanced
//! `{...}` and `(...)` groups, `^`/`_` scripts, chained commands, and
//! operator/digit continuation runs. This approximates "how far does the
//! math extend" without a grammar; the bracket scanner exists to patch the
//! cases it misses.

use lazy_static::lazy_static;
use regex::Regex;

use super::context::{claim_limit, is_escaped, overlaps_any, CandidateSpan, NormalizeOptions};
use super::protect::PLACEHOLDER_OPEN;
use super::NormalizeWarning;

lazy_static! {
    /// A command token: a backslash followed by one or more letters.
    pub(crate) static ref COMMAND_TOKEN: Regex = Regex::new(r"\\([a-zA-Z]+)").unwrap();

    /// Generic accepted shape for spans built around an unrecognized
    /// command: backslash-letters followed by an opening delimiter or digit.
    static ref GENERIC_SHAPE: Regex = Regex::new(r"^\\[a-zA-Z]+\s*[({\d]").unwrap();
}

/// Scan for command-rooted candidate spans and append them to `candidates`.
///
/// Occurrences inside a live (odd-parity) `$` region, inside placeholder
/// tokens, or inside spans claimed by an earlier collector are skipped.
pub fn scan_commands(
    chars: &[char],
    options: &NormalizeOptions,
    candidates: &mut Vec<CandidateSpan>,
    warnings: &mut Vec<NormalizeWarning>,
) {
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
        if c != '\\' {
            i += 1;
            continue;
        }

        let name_end = scan_command_name(chars, i);
        if name_end == i + 1 {
            // Lone backslash or escaped symbol, not a command token.
            i += 1;
            continue;
        }
        if parity == 1 || overlaps_any(candidates, i, name_end) {
            i = name_end;
            continue;
        }

        let name: String = chars[i + 1..name_end].iter().collect();
        if !options.is_known_command(&name) && !speculative_guard(chars, name_end) {
            i = name_end;
            continue;
        }

        // Never extend into a region claimed by an earlier collector.
        let limit = claim_limit(candidates, i)
            .unwrap_or(chars.len())
            .min(chars.len());
        let raw_end = extend_span(chars, name_end, limit, &name, warnings);
        let (start, end) = trim_range(chars, i, raw_end);
        if end <= start {
            i = name_end;
            continue;
        }

        let text: String = chars[start..end].iter().collect();
        if text.contains(PLACEHOLDER_OPEN) {
            // Wrapping would nest delimiters around protected math.
            i = raw_end.max(name_end);
            continue;
        }
        if !span_is_math(&text, options) {
            i = name_end;
            continue;
        }

        candidates.push(CandidateSpan::inline(start, end, text));
        i = raw_end.max(name_end);
    }
}

/// End of the letter run after the backslash at `i` (exclusive). Equal to
/// `i + 1` when the backslash introduces no letters.
fn scan_command_name(chars: &[char], i: usize) -> usize {
    let mut j = i + 1;
    while j < chars.len() && chars[j].is_ascii_alphabetic() {
        j += 1;
    }
    j
}

/// Lookahead guard for commands not in the recognized set: the next two
/// characters must each be an opening brace, opening paren, digit, or
/// whitespace. Fewer than two remaining characters fails the guard, which
/// keeps truncated stream chunks conservative.
fn speculative_guard(chars: &[char], pos: usize) -> bool {
    fn in_class(c: char) -> bool {
        c == '{' || c == '(' || c.is_ascii_digit() || c.is_whitespace()
    }
    match (chars.get(pos), chars.get(pos + 1)) {
        (Some(&a), Some(&b)) => in_class(a) && in_class(b),
        _ => false,
    }
}

/// Characters that may continue an expression when more math follows.
fn is_continuation(c: char) -> bool {
    matches!(c, ' ' | '\t') || c.is_ascii_digit() || is_operator(c)
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '=' | '<' | '>' | ',' | '.' | ';' | ':' | '!' | '?' | '\'' | '|'
            | '&' | '%' | '~'
    )
}

/// Core operators/digits that justify keeping a trailing run when the input
/// ends mid-expression.
fn run_reaches_math(run: &[char]) -> bool {
    run.iter()
        .any(|&c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '=' | '<' | '>'))
}

/// Greedily extend a span from `from` (just past the command name), never
/// crossing `limit`. Returns the exclusive end of the raw span.
fn extend_span(
    chars: &[char],
    from: usize,
    limit: usize,
    command: &str,
    warnings: &mut Vec<NormalizeWarning>,
) -> usize {
    let mut i = from;

    while i < limit {
        match chars[i] {
            '{' => i = consume_group(chars, i, limit, '{', '}', command, warnings),
            '(' => i = consume_group(chars, i, limit, '(', ')', command, warnings),
            '^' | '_' => {
                if i + 1 < limit && chars[i + 1] == '{' {
                    i = consume_group(chars, i + 1, limit, '{', '}', command, warnings);
                } else if i + 1 < limit && chars[i + 1].is_alphanumeric() {
                    i += 2;
                } else {
                    break;
                }
            }
            '\\' => {
                // Chained command, or a spacing escape like `\,`.
                let mut j = i + 1;
                while j < limit && chars[j].is_ascii_alphabetic() {
                    j += 1;
                }
                if j > i + 1 {
                    i = j;
                } else if i + 1 < limit && matches!(chars[i + 1], ',' | ';' | ':' | '!') {
                    i += 2;
                } else {
                    break;
                }
            }
            c if is_continuation(c) => {
                // Tentative run; committed only if more math follows.
                let run_start = i;
                let mut j = i;
                while j < limit && is_continuation(chars[j]) {
                    j += 1;
                }
                if j < limit {
                    match chars[j] {
                        '{' | '(' | '^' | '_' => {
                            i = j;
                            continue;
                        }
                        '\\' if j + 1 < limit
                            && (chars[j + 1].is_ascii_alphabetic()
                                || matches!(chars[j + 1], ',' | ';' | ':' | '!')) =>
                        {
                            i = j;
                            continue;
                        }
                        _ => break,
                    }
                }
                // Ran to the end of input: keep it only if it still looks
                // like math rather than trailing prose punctuation.
                if run_reaches_math(&chars[run_start..j]) {
                    i = j;
                }
                break;
            }
            c if c.is_alphabetic() => {
                // A bare letter followed by whitespace or another letter
                // reads as prose; anything else glues on (e.g. `...}x+1`).
                match chars.get(i + 1) {
                    Some(&next) if i + 1 < limit => {
                        if next.is_whitespace() || next.is_alphabetic() {
                            break;
                        }
                        i += 1;
                    }
                    _ => {
                        i += 1;
                        break;
                    }
                }
            }
            _ => break,
        }
    }

    i.min(limit)
}

/// Consume a balanced bracket group starting at `open_idx`, tracking depth.
/// An unbalanced group stops at `limit` with a diagnostic.
fn consume_group(
    chars: &[char],
    open_idx: usize,
    limit: usize,
    open: char,
    close: char,
    command: &str,
    warnings: &mut Vec<NormalizeWarning>,
) -> usize {
    let mut depth = 0i32;
    let mut i = open_idx;
    while i < limit {
        let c = chars[i];
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    warnings.push(NormalizeWarning::unterminated_group(command));
    limit
}

/// Shrink `[start, end)` past leading whitespace and trailing whitespace or
/// sentence punctuation, so the merger wraps exactly what it replaces.
fn trim_range(chars: &[char], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start {
        let c = chars[end - 1];
        if c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '!' | '?') {
            end -= 1;
        } else {
            break;
        }
    }
    (start, end)
}

/// Final acceptance filter: the span must contain a recognized command, or
/// at least match the generic command-plus-argument shape. Guards against
/// wrapping plain backslashed words.
fn span_is_math(text: &str, options: &NormalizeOptions) -> bool {
    for cap in COMMAND_TOKEN.captures_iter(text) {
        if options.is_known_command(&cap[1]) {
            return true;
        }
    }
    GENERIC_SHAPE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<CandidateSpan> {
        let chars: Vec<char> = input.chars().collect();
        let mut candidates = Vec::new();
        let mut warnings = Vec::new();
        scan_commands(
            &chars,
            &NormalizeOptions::default(),
            &mut candidates,
            &mut warnings,
        );
        candidates
    }

    #[test]
    fn test_known_command_with_parens() {
        let found = scan(r"Compute \sin(x) now");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\sin(x)");
        assert_eq!(found[0].start, 8);
        assert_eq!(found[0].end, 15);
    }

    #[test]
    fn test_brace_groups_consumed() {
        let found = scan(r"half is \frac{1}{2} of one");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\frac{1}{2}");
    }

    #[test]
    fn test_scripts_consumed() {
        let found = scan(r"area \pi r^2");
        // The run after \pi ends at a bare letter, so only the command
        // itself is captured.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\pi");

        let found = scan(r"\sum_{i=1}^{n} i");
        assert_eq!(found[0].text, r"\sum_{i=1}^{n}");
    }

    #[test]
    fn test_chained_commands() {
        let found = scan(r"then \alpha + \beta follows");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\alpha + \beta");
    }

    #[test]
    fn test_unknown_command_rejected_in_prose() {
        let found = scan(r"see \foobar word");
        assert!(found.is_empty());
    }

    #[test]
    fn test_unknown_command_with_argument_shape_accepted() {
        let found = scan(r"use \dd{3} here");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\dd{3}");
    }

    #[test]
    fn test_live_math_region_skipped() {
        // Odd dollar parity marks an unprotected math region.
        let found = scan(r"$ \sin(x) plus");
        assert!(found.is_empty());
    }

    #[test]
    fn test_unterminated_group_stops_at_end() {
        let chars: Vec<char> = r"\frac{1".chars().collect();
        let mut candidates = Vec::new();
        let mut warnings = Vec::new();
        scan_commands(
            &chars,
            &NormalizeOptions::default(),
            &mut candidates,
            &mut warnings,
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, r"\frac{1");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_trailing_punctuation_trimmed() {
        let found = scan(r"Use \frac{1}{2}.");
        assert_eq!(found[0].text, r"\frac{1}{2}");
    }

    #[test]
    fn test_trailing_equation_kept_at_end_of_input() {
        let found = scan(r"so \frac{1}{2} = 0.5");
        assert_eq!(found[0].text, r"\frac{1}{2} = 0.5");
    }

    #[test]
    fn test_claimed_region_not_rescanned() {
        let chars: Vec<char> = r"\alpha and \beta".chars().collect();
        let mut candidates = vec![CandidateSpan::block(0, 6, r"\alpha".to_string())];
        let mut warnings = Vec::new();
        scan_commands(
            &chars,
            &NormalizeOptions::default(),
            &mut candidates,
            &mut warnings,
        );
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].text, r"\beta");
    }
}
