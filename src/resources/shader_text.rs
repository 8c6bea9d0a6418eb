//! GLSL text rules.
//!
//! The derivation rules never parse GLSL. They rely on a handful of fixed
//! textual patterns, collected here so every rule matches them the same way:
//!
//! | Rule | Pattern |
//! |------|---------|
//! | [`replace_main`] | `void` ws+ `main` ws* `(` ws* [`void`] ws* `)` |
//! | [`contains_word`] | `word` with identifier boundaries on both sides |
//! | [`contains_call`] | `name(` preceded by at least one whitespace byte |
//!
//! All patterns are ASCII, so byte offsets of matches are always valid
//! `str` boundaries.

use std::borrow::Cow;

#[inline]
fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Matches an entry-point signature starting at `start` (which points at
/// `void`). Returns the exclusive end offset on success.
fn match_entry_point(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 4;

    let after_ws = skip_ws(bytes, i);
    if after_ws == i {
        return None;
    }
    i = after_ws;

    if !bytes[i..].starts_with(b"main") {
        return None;
    }
    i = skip_ws(bytes, i + 4);

    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i = skip_ws(bytes, i + 1);

    if bytes[i..].starts_with(b"void") {
        i = skip_ws(bytes, i + 4);
    }

    (bytes.get(i) == Some(&b')')).then_some(i + 1)
}

/// Renames every `main` entry point in `source` to `new_name`.
///
/// Each matched signature is rewritten to `void {new_name}()`. Sources
/// without an entry point are returned borrowed and unchanged.
#[must_use]
pub fn replace_main<'a>(source: &'a str, new_name: &str) -> Cow<'a, str> {
    let bytes = source.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find("void") {
        let start = cursor + offset;
        let at_boundary = start == 0 || !is_ident(bytes[start - 1]);

        if at_boundary && let Some(end) = match_entry_point(bytes, start) {
            let buf = out.get_or_insert_with(|| String::with_capacity(source.len() + new_name.len()));
            buf.push_str(&source[copied..start]);
            buf.push_str("void ");
            buf.push_str(new_name);
            buf.push_str("()");
            copied = end;
            cursor = end;
            continue;
        }

        cursor = start + 4;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&source[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(source),
    }
}

/// Returns `true` if `word` occurs as a whole identifier in `source`.
#[must_use]
pub fn contains_word(source: &str, word: &str) -> bool {
    let bytes = source.as_bytes();
    source.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = start == 0 || !is_ident(bytes[start - 1]);
        let after = end == bytes.len() || !is_ident(bytes[end]);
        before && after
    })
}

/// Returns `true` if `source` calls `name` (i.e. contains `name(`) with at
/// least one whitespace character immediately before the call.
#[must_use]
pub fn contains_call(source: &str, name: &str) -> bool {
    let bytes = source.as_bytes();
    let call = format!("{name}(");
    source
        .match_indices(call.as_str())
        .any(|(start, _)| start > 0 && bytes[start - 1].is_ascii_whitespace())
}
