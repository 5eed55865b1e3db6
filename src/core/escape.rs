//! Escape normalization (pipeline stage 1)
//!
//! Collapses doubled backslashes left over from JSON transport, converts
//! `\(...\)` / `\[...\]` delimiters to dollar form, and drops stray escapes.
//! Pure string rewriting; nothing here knows what the commands mean.

use super::context::NormalizeOptions;

/// Characters that sneak into copied math identifiers and break command
/// recognition. Stripped only when the input contains a backslash, so text
/// with no math passes through byte-exact.
fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Apply all stage-1 rewrites. Fast no-op when there is no backslash.
pub fn normalize_escapes(input: &str, options: &NormalizeOptions) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let mut text: String = input.chars().filter(|c| !is_zero_width(*c)).collect();
    if options.collapse_double_escapes {
        text = collapse_double_escapes(&text);
    }
    if options.convert_bracket_delimiters {
        text = convert_bracket_delimiters(&text);
    }
    strip_stray_escapes(&text)
}

/// `\\` -> `\`, left to right, non-overlapping.
fn collapse_double_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' && chars.peek() == Some(&'\\') {
            chars.next();
        }
    }
    out
}

/// `\(`/`\)` -> `$`, `\[`/`\]` -> `$$`.
fn convert_bracket_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('(') | Some(')') => {
                chars.next();
                out.push('$');
            }
            Some('[') | Some(']') => {
                chars.next();
                out.push_str("$$");
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Drop a backslash that escapes nothing: one immediately followed by
/// whitespace or end of input.
fn strip_stray_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if next.is_whitespace() => continue,
                None => continue,
                _ => {}
            }
        }
        out.push(c);
    }
    out
}
