//! Balanced-bracket scanning over decorator metadata.
//!
//! These helpers work on raw TypeScript text. They count brackets and
//! commas and know nothing about strings, template literals or regex
//! literals, so a stray bracket inside a string can throw them off.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::collapse_whitespace;

static RE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("Invalid identifier regex"));

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Index of the bracket closing the one at `open_index`.
///
/// Only the bracket kind found at `open_index` is counted. Returns `None`
/// when `open_index` is not an opening bracket or the text runs out first.
pub fn balanced_end(content: &str, open_index: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let open = *bytes.get(open_index)?;
    let close = closer_for(open)?;

    let mut depth = 0usize;
    for (offset, &b) in bytes[open_index..].iter().enumerate() {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_index + offset);
            }
        }
    }
    None
}

/// Text between the bracket at `open_index` and its match, exclusive.
pub fn extract_balanced(content: &str, open_index: usize) -> Option<&str> {
    let end = balanced_end(content, open_index)?;
    content.get(open_index + 1..end)
}

/// Contents of the `name: [ ... ]` array in an object literal.
///
/// The key match is case-insensitive and word-bounded, so `providers` does
/// not pick up `viewProviders`. Missing or unbalanced sections give `""`.
pub fn get_section<'a>(content: &'a str, name: &str) -> &'a str {
    find_section(content, name).flatten().unwrap_or("")
}

/// Like [`get_section`] but tells a missing key from an unbalanced array.
///
/// `None` when there is no `name: [` at all, `Some(None)` when the array
/// never closes.
pub fn find_section<'a>(content: &'a str, name: &str) -> Option<Option<&'a str>> {
    let pattern = format!(r"(?i)(?:^|[^\w$]){}\s*:\s*\[", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(content)?;
    // The match ends just after the opening bracket
    Some(extract_balanced(content, m.end() - 1))
}

/// Split on commas that sit outside every `()`, `[]` and `{}` pair.
///
/// Each element is trimmed with inner whitespace runs collapsed; empty
/// elements (for example from a trailing comma) are dropped.
pub fn split_top_level(section: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for c in section.chars() {
        match c {
            ',' if depth <= 0 => {
                push_element(&mut result, &current);
                current.clear();
            }
            '{' | '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            '}' | ')' | ']' => {
                depth -= 1;
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    push_element(&mut result, &current);
    result
}

fn push_element(result: &mut Vec<String>, raw: &str) {
    let element = collapse_whitespace(raw);
    if !element.is_empty() {
        result.push(element);
    }
}

/// Index of the first `:` outside any bracket pair, ignoring `::`.
pub fn top_level_colon(element: &str) -> Option<usize> {
    top_level_colons(element).into_iter().next()
}

/// Index of the last `:` outside any bracket pair.
pub fn last_top_level_colon(element: &str) -> Option<usize> {
    top_level_colons(element).into_iter().last()
}

fn top_level_colons(element: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth: i32 = 0;
    for (i, c) in element.char_indices() {
        match c {
            '{' | '(' | '[' | '<' => depth += 1,
            '}' | ')' | ']' | '>' => depth -= 1,
            ':' if depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Split an object-literal property into key and value.
///
/// Quotes around the key are removed. Shorthand properties (`{ foo }`)
/// return the key as both key and value.
pub fn split_key_value(element: &str) -> Option<(String, String)> {
    let element = element.trim();
    if element.is_empty() {
        return None;
    }
    match top_level_colon(element) {
        Some(idx) => {
            let key = unquote(element[..idx].trim()).to_string();
            let value = element[idx + 1..].trim().to_string();
            Some((key, value))
        }
        None if is_identifier(element) => Some((element.to_string(), element.to_string())),
        None => None,
    }
}

/// Strip one pair of matching `'`, `"` or backtick quotes.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['\'', '"', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Whether `text` is a plain JavaScript identifier.
pub fn is_identifier(text: &str) -> bool {
    RE_IDENTIFIER.is_match(text)
}

/// Drop a trailing generic argument list: `Store<AppState>` gives `Store`.
pub fn strip_generics(type_name: &str) -> &str {
    match type_name.find('<') {
        Some(idx) => type_name[..idx].trim(),
        None => type_name.trim(),
    }
}
