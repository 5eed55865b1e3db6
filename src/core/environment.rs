//! Math environment wrapping
//!
//! A bare `\begin{align}...\end{align}` in chat output should render as a
//! display block, so recognized environments become block candidates before
//! the per-command scanner runs. Same-name nesting is tracked by depth;
//! an unterminated environment is skipped with a diagnostic.

use super::context::{is_escaped, overlaps_any, CandidateSpan};
use super::protect::PLACEHOLDER_OPEN;
use super::NormalizeWarning;

/// Environments treated as display math when found bare in prose.
pub const MATH_ENVIRONMENTS: &[&str] = &[
    // Equation environments
    "equation",
    "equation*",
    "align",
    "align*",
    "gather",
    "gather*",
    // Multi-line environments
    "multline",
    "multline*",
    "split",
    "alignat",
    "alignat*",
    // Matrix/cases environments
    "matrix",
    "pmatrix",
    "bmatrix",
    "Bmatrix",
    "vmatrix",
    "Vmatrix",
    "cases",
    // Nested/alignment environments
    "aligned",
    "gathered",
    "alignedat",
];

fn is_math_environment(name: &str) -> bool {
    MATH_ENVIRONMENTS.contains(&name)
}

/// Collect whole `\begin{env}...\end{env}` regions as block candidates.
pub fn scan_environments(
    chars: &[char],
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
        if c != '\\' || !matches_at(chars, i, &BEGIN_PREFIX) {
            i += 1;
            continue;
        }

        let Some((name, after)) = parse_env_name(chars, i + 6) else {
            i += 1;
            continue;
        };
        if !is_math_environment(&name) || parity == 1 {
            i = after;
            continue;
        }

        match find_env_end(chars, after, &name) {
            Some(end) => {
                if overlaps_any(candidates, i, end)
                    || chars[i..end].contains(&PLACEHOLDER_OPEN)
                {
                    i = end;
                    continue;
                }
                let text: String = chars[i..end].iter().collect();
                candidates.push(CandidateSpan::block(i, end, text));
                i = end;
            }
            None => {
                warnings.push(NormalizeWarning::unterminated_environment(&name));
                i = after;
            }
        }
    }
}

const BEGIN_PREFIX: [char; 7] = ['\\', 'b', 'e', 'g', 'i', 'n', '{'];

fn matches_at(chars: &[char], at: usize, pattern: &[char]) -> bool {
    at + pattern.len() <= chars.len() && chars[at..at + pattern.len()] == *pattern
}

/// Parse the name inside `\begin{...}`; `brace_idx` points at the `{`.
/// Returns the name and the index just past the closing `}`.
fn parse_env_name(chars: &[char], brace_idx: usize) -> Option<(String, usize)> {
    let mut j = brace_idx + 1;
    let mut name = String::new();
    while j < chars.len() {
        let c = chars[j];
        if c == '}' {
            if name.is_empty() {
                return None;
            }
            return Some((name, j + 1));
        }
        if c.is_ascii_alphabetic() || c == '*' {
            name.push(c);
            j += 1;
            continue;
        }
        return None;
    }
    None
}

/// Find the index just past the matching `\end{name}`, honoring same-name
/// nesting.
fn find_env_end(chars: &[char], from: usize, name: &str) -> Option<usize> {
    let begin_pat: Vec<char> = format!("\\begin{{{}}}", name).chars().collect();
    let end_pat: Vec<char> = format!("\\end{{{}}}", name).chars().collect();
    let mut depth = 1i32;
    let mut i = from;

    while i < chars.len() {
        if matches_at(chars, i, &begin_pat) {
            depth += 1;
            i += begin_pat.len();
            continue;
        }
        if matches_at(chars, i, &end_pat) {
            depth -= 1;
            i += end_pat.len();
            if depth == 0 {
                return Some(i);
            }
            continue;
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpanKind;

    fn scan(input: &str) -> (Vec<CandidateSpan>, Vec<NormalizeWarning>) {
        let chars: Vec<char> = input.chars().collect();
        let mut candidates = Vec::new();
        let mut warnings = Vec::new();
        scan_environments(&chars, &mut candidates, &mut warnings);
        (candidates, warnings)
    }

    #[test]
    fn test_equation_environment() {
        let input = r"\begin{equation} x^2 = y \end{equation}";
        let (found, warnings) = scan(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SpanKind::Block);
        assert_eq!(found[0].text, input);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_starred_environment() {
        let (found, _) = scan(r"see \begin{align*} a = b \end{align*} here");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, r"\begin{align*} a = b \end{align*}");
    }

    #[test]
    fn test_unknown_environment_ignored() {
        let (found, warnings) = scan(r"\begin{theorem} claim \end{theorem}");
        assert!(found.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unterminated_environment_diagnosed() {
        let (found, warnings) = scan(r"\begin{align} a = b");
        assert!(found.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_nested_same_name() {
        let input = r"\begin{align} \begin{align} x \end{align} y \end{align}";
        let (found, _) = scan(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, input);
    }

    #[test]
    fn test_prefix_name_not_confused() {
        // \begin{aligned} inside \begin{align} must not close early.
        let input = r"\begin{align} \begin{aligned} x \end{aligned} \end{align}";
        let (found, _) = scan(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, input);
    }
}
