//! The `.properties` text format the credential file is written in.
//!
//! One `key=value` pair per logical line. The dialect matches what the
//! JVM's `Properties` class reads and writes, so a file produced by an
//! older deployment loads unchanged:
//!
//! - `#` or `!` starts a comment line; blank lines are ignored.
//! - The key ends at the first unescaped `=`, `:`, or whitespace.
//! - A line ending in an odd number of backslashes continues on the next
//!   line (leading whitespace of the continuation is dropped).
//! - Escapes: `\t \n \r \f`, `\uXXXX`, and `\c` for any other `c`.
//!
//! Values are captured verbatim after the separator, so a secret with
//! trailing spaces round-trips. A leading space in a value is written as
//! `\ ` so it survives the separator's whitespace skipping.

use crate::StoreError;

/// Parses the whole file into `(key, value)` pairs in file order.
///
/// # Errors
/// Returns [`StoreError::MalformedEscape`] for a `\u` escape that isn't
/// followed by four hex digits.
pub(crate) fn parse(text: &str) -> Result<Vec<(String, String)>, StoreError> {
    let mut entries = Vec::new();
    let mut lines = text.lines().enumerate().peekable();

    while let Some((index, raw)) = lines.next() {
        let first = raw.trim_start_matches(is_blank);
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        let line = index + 1;
        entries.push((unescape(key, line)?, unescape(value, line)?));
    }

    Ok(entries)
}

/// Renders entries as file text, header comment first.
pub(crate) fn render<'a>(
    header: &str,
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut out = String::new();
    for line in header.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
    for (key, value) in entries {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// An odd run of trailing backslashes means the last one escapes the
/// line break.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line into its raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, StoreError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or(StoreError::MalformedEscape { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            // A lone trailing backslash is dropped, as the JVM reader does.
            None => {}
        }
    }

    Ok(out)
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
}
