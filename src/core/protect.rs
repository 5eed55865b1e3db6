//! Protected-span extraction and restoration (pipeline stages 2 and 6)
//!
//! Text already wrapped in canonical `$...$` / `$$...$$` delimiters is
//! replaced by an index-tagged sentinel token so the scanning stages cannot
//! touch it, then substituted back after merging. Restoration is lossless:
//! each protected substring reappears byte-for-byte.

use indexmap::IndexMap;

use super::context::is_escaped;
use super::NormalizeWarning;

/// Sentinel frame around the placeholder index. Private-use characters do
/// not occur in ordinary chat text.
pub(crate) const PLACEHOLDER_OPEN: char = '\u{E000}';
pub(crate) const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Ordered table of protected spans for one invocation. Insertion order is
/// the placeholder index.
#[derive(Debug, Clone, Default)]
pub struct ProtectedSpans {
    spans: IndexMap<String, String>,
}

impl ProtectedSpans {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn push(&mut self, original: String) -> String {
        let token = format!(
            "{}{}{}",
            PLACEHOLDER_OPEN,
            self.spans.len(),
            PLACEHOLDER_CLOSE
        );
        self.spans.insert(token.clone(), original);
        token
    }

    fn original(&self, index: usize) -> Option<&str> {
        self.spans.get_index(index).map(|(_, v)| v.as_str())
    }
}

/// Replace each canonically delimited math span with a placeholder token.
///
/// Inline `$...$` (non-empty, no embedded newline or unescaped `$`) is tried
/// first; `$$...$$` is tried only where the inline pattern did not match.
/// Dangling delimiters stay in the text untouched and are diagnosed.
pub fn extract_protected(
    input: &str,
    warnings: &mut Vec<NormalizeWarning>,
) -> (String, ProtectedSpans) {
    if !input.contains('$') {
        return (input.to_string(), ProtectedSpans::default());
    }

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut spans = ProtectedSpans::default();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c != '$' || is_escaped(&chars, i) {
            out.push(c);
            i += 1;
            continue;
        }

        if let Some(close) = match_inline(&chars, i) {
            let original: String = chars[i..=close].iter().collect();
            out.push_str(&spans.push(original));
            i = close + 1;
            continue;
        }

        if let Some(close) = match_block(&chars, i) {
            let original: String = chars[i..=close].iter().collect();
            out.push_str(&spans.push(original));
            i = close + 1;
            continue;
        }

        // Dangling delimiter: leave it visible to later stages.
        if i + 1 < chars.len() && chars[i + 1] == '$' {
            warnings.push(NormalizeWarning::dangling_delimiter(i));
            out.push_str("$$");
            i += 2;
        } else {
            warnings.push(NormalizeWarning::dangling_delimiter(i));
            out.push('$');
            i += 1;
        }
    }

    (out, spans)
}

/// Index of the closing `$` of an inline span opening at `start`, if any.
fn match_inline(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    // An immediate second `$` means empty content; that is the block
    // pattern's territory.
    if j < chars.len() && chars[j] == '$' {
        return None;
    }
    while j < chars.len() {
        let c = chars[j];
        if c == '\n' {
            return None;
        }
        if c == '$' && !is_escaped(chars, j) {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// Index of the last `$` of a `$$...$$` block opening at `start`, if any.
/// Block content may span lines but must not be all whitespace.
fn match_block(chars: &[char], start: usize) -> Option<usize> {
    if start + 1 >= chars.len() || chars[start + 1] != '$' {
        return None;
    }
    let mut j = start + 2;
    let mut saw_content = false;
    while j + 1 < chars.len() {
        if chars[j] == '$' && chars[j + 1] == '$' && !is_escaped(chars, j) {
            if saw_content {
                return Some(j + 1);
            }
            return None;
        }
        if !chars[j].is_whitespace() {
            saw_content = true;
        }
        j += 1;
    }
    None
}

/// Substitute every placeholder back with its original text (stage 6).
///
/// Placeholders are unique and non-overlapping by construction, so a single
/// builder pass suffices. A token restored zero times or more than once is
/// an internal invariant breach; it is diagnosed and handled best-effort
/// rather than raised.
pub fn restore_protected(
    input: &str,
    spans: &ProtectedSpans,
    warnings: &mut Vec<NormalizeWarning>,
) -> String {
    if spans.is_empty() {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len() + 16);
    let mut restored = vec![false; spans.len()];
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != PLACEHOLDER_OPEN {
            out.push(c);
            continue;
        }

        // Read the index digits up to the closing sentinel.
        let mut digits = String::new();
        let mut closed = false;
        while let Some(&next) = chars.peek() {
            if next == PLACEHOLDER_CLOSE {
                chars.next();
                closed = true;
                break;
            }
            if next.is_ascii_digit() {
                digits.push(next);
                chars.next();
                continue;
            }
            break;
        }

        let index = if closed { digits.parse::<usize>().ok() } else { None };
        match index.and_then(|idx| spans.original(idx).map(|orig| (idx, orig))) {
            Some((idx, original)) => {
                if restored[idx] {
                    warnings.push(NormalizeWarning::placeholder_mismatch(
                        idx,
                        "restored more than once",
                    ));
                }
                restored[idx] = true;
                out.push_str(original);
            }
            None => {
                // Raw sentinel characters in the input; emit what we saw.
                out.push(PLACEHOLDER_OPEN);
                out.push_str(&digits);
                if closed {
                    out.push(PLACEHOLDER_CLOSE);
                }
            }
        }
    }

    for (idx, done) in restored.iter().enumerate() {
        if !done {
            warnings.push(NormalizeWarning::placeholder_mismatch(idx, "never restored"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &str) -> (String, usize, Vec<NormalizeWarning>) {
        let mut warnings = Vec::new();
        let (text, spans) = extract_protected(input, &mut warnings);
        let restored = restore_protected(&text, &spans, &mut warnings);
        (restored, spans.len(), warnings)
    }

    #[test]
    fn test_inline_protection_roundtrip() {
        let (restored, count, warnings) = roundtrip("a $x + 1$ b");
        assert_eq!(restored, "a $x + 1$ b");
        assert_eq!(count, 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_block_protection_roundtrip() {
        let (restored, count, _) = roundtrip("$$x^2\n+ y^2$$ end");
        assert_eq!(restored, "$$x^2\n+ y^2$$ end");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_multiple_spans() {
        let (restored, count, _) = roundtrip("$a$ and $b$ and $$c$$");
        assert_eq!(restored, "$a$ and $b$ and $$c$$");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_placeholders_replace_math() {
        let mut warnings = Vec::new();
        let (text, spans) = extract_protected("see $x$ here", &mut warnings);
        assert_eq!(spans.len(), 1);
        assert!(!text.contains('$'));
        assert!(text.contains(PLACEHOLDER_OPEN));
        assert!(text.starts_with("see "));
        assert!(text.ends_with(" here"));
    }

    #[test]
    fn test_dangling_dollar_left_alone() {
        let mut warnings = Vec::new();
        let (text, spans) = extract_protected("price is $5 only", &mut warnings);
        assert_eq!(text, "price is $5 only");
        assert!(spans.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_escaped_dollars_not_protected() {
        let mut warnings = Vec::new();
        let (text, spans) = extract_protected(r"costs \$5 or \$6", &mut warnings);
        assert_eq!(text, r"costs \$5 or \$6");
        assert!(spans.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_inline_does_not_cross_newline() {
        let mut warnings = Vec::new();
        let (text, spans) = extract_protected("a $x\ny$ b", &mut warnings);
        assert_eq!(text, "a $x\ny$ b");
        assert!(spans.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_missing_placeholder_is_diagnosed() {
        let mut warnings = Vec::new();
        let (_, spans) = extract_protected("$x$", &mut warnings);
        let out = restore_protected("token went missing", &spans, &mut warnings);
        assert_eq!(out, "token went missing");
        assert_eq!(warnings.len(), 1);
    }
}
