//! The word-bolding transform.
//!
//! Metaguiding wraps the leading half of every word in a `<b>` marker so the
//! eye can anchor on the bolded prefix. [`transform`] applies or removes the
//! markup on one document; the two modes are exact inverses:
//! `transform(transform(d, Apply), Remove) == d` for any document that did
//! not already contain the marker tag.

use std::borrow::Cow;

use crate::tokenizer::{Token, Tokenizer};

/// Marker tag inserted around each word prefix. Always emitted bare, which is
/// what lets [`Mode::Remove`] recognize and strip exactly its own output.
const MARKER_OPEN: &str = "<b>";
const MARKER_CLOSE: &str = "</b>";

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Insert metaguiding markup.
    Apply,
    /// Strip previously inserted metaguiding markup.
    Remove,
}

/// Boundary index for bolding a word of `word_length` units: the first
/// `ceil(word_length / 2)` units are bolded. A one-unit word is fully bolded.
pub fn split_index(word_length: usize) -> usize {
    word_length.div_ceil(2)
}

/// Apply or remove metaguiding on one markup document.
///
/// Returns `Cow::Borrowed` when the input is passed through unchanged, which
/// happens when [`Mode::Apply`] finds the marker tag already present (the
/// document-level idempotency guard). Never fails: malformed markup degrades
/// to literal text via the tokenizer.
pub fn transform(input: &str, mode: Mode) -> Cow<'_, str> {
    match mode {
        Mode::Apply => apply(input),
        Mode::Remove => remove(input),
    }
}

/// Transform one document at the byte-stream boundary.
///
/// Decodes the bytes (UTF-8, with a declared-encoding or Windows-1252
/// fallback) and returns the transformed document as UTF-8.
pub fn metaguide_document(input: &[u8], mode: Mode) -> Vec<u8> {
    let text = crate::util::decode_text(input);
    transform(&text, mode).into_owned().into_bytes()
}

fn apply(input: &str) -> Cow<'_, str> {
    // The marker check must see the whole document before any word is
    // rewritten, so collect tokens up front.
    let tokens: Vec<Token<'_>> = Tokenizer::new(input).collect();
    if tokens
        .iter()
        .any(|t| matches!(t, Token::Tag(raw) if *raw == MARKER_OPEN))
    {
        log::warn!("document already contains metaguiding markup, skipping");
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + input.len() / 2);
    for token in &tokens {
        match token {
            Token::Tag(raw) => out.push_str(raw),
            // A `<` can only reach a text run through the tokenizer's
            // unterminated-markup fallback. Bolding words there would put
            // marker tags after the dangling `<`, and on the next pass they
            // would tokenize together with it as one tag, stranding the
            // closer. Degraded runs pass through untouched.
            Token::Text(raw) if raw.contains('<') => out.push_str(raw),
            Token::Text(raw) => bold_words(raw, &mut out),
        }
    }
    Cow::Owned(out)
}

fn remove(input: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(input.len());
    // A `</b>` may close an attributed `<b ...>` that APPLY never produced,
    // so closers are only stripped when they pair with a stripped opener.
    // One flag per open bold element: true if its opener was the marker.
    let mut open_bolds: Vec<bool> = Vec::new();
    let mut changed = false;
    for token in Tokenizer::new(input) {
        match token {
            Token::Tag(raw) if raw == MARKER_OPEN => {
                open_bolds.push(true);
                changed = true;
            }
            Token::Tag(raw) if raw == MARKER_CLOSE => {
                // An unpaired closer was not produced by APPLY; keep it.
                if !open_bolds.pop().unwrap_or(false) {
                    out.push_str(raw);
                }
            }
            Token::Tag(raw) => {
                if is_attributed_bold_open(raw) {
                    open_bolds.push(false);
                }
                out.push_str(raw);
            }
            Token::Text(raw) => out.push_str(raw),
        }
    }
    if changed { Cow::Owned(out) } else { Cow::Borrowed(input) }
}

/// An attributed `<b ...>` opener: not the tool's marker, but its `</b>`
/// closer must survive removal. Self-closing forms have no closer to pair
/// with and are not tracked.
fn is_attributed_bold_open(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.starts_with(b"<b")
        && bytes.len() > 3
        && bytes[2].is_ascii_whitespace()
        && !raw.ends_with("/>")
}

/// Bold the leading half of every word in a text run.
///
/// A word is a maximal run of non-whitespace units, where a unit is one
/// `char` or one entity reference (`&amp;`, `&#160;`, ...). Entities count as
/// a single unit and are never split internally; only entities that denote a
/// whitespace character break words.
fn bold_words(text: &str, out: &mut String) {
    // Byte ranges of the units in the current word.
    let mut word: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let (end, is_whitespace) = next_unit(text, pos);
        if is_whitespace {
            flush_word(text, &mut word, out);
            out.push_str(&text[pos..end]);
        } else {
            word.push((pos, end));
        }
        pos = end;
    }
    flush_word(text, &mut word, out);
}

fn flush_word(text: &str, word: &mut Vec<(usize, usize)>, out: &mut String) {
    let Some(&(start, _)) = word.first() else {
        return;
    };
    let end = word[word.len() - 1].1;
    let mid = word[split_index(word.len()) - 1].1;
    out.push_str(MARKER_OPEN);
    out.push_str(&text[start..mid]);
    out.push_str(MARKER_CLOSE);
    out.push_str(&text[mid..end]);
    word.clear();
}

/// One unit of text starting at byte `pos`: returns its end offset and
/// whether it is word-breaking.
fn next_unit(text: &str, pos: usize) -> (usize, bool) {
    let rest = &text[pos..];
    if rest.starts_with('&')
        && let Some(len) = entity_len(rest)
    {
        return (pos + len, entity_is_whitespace(&rest[..len]));
    }
    let ch = rest.chars().next().expect("pos is within text");
    (pos + ch.len_utf8(), ch.is_whitespace())
}

/// Length of the entity reference at the start of `rest`, or `None` if the
/// `&` does not open a well-formed reference (then it is a literal char).
fn entity_len(rest: &str) -> Option<usize> {
    // Entity names are short; cap the scan so a stray `&` followed much
    // later by a `;` is not swallowed as one unit.
    const MAX_ENTITY_LEN: usize = 32;
    let bytes = rest.as_bytes();
    for (i, &b) in bytes.iter().enumerate().take(MAX_ENTITY_LEN).skip(1) {
        match b {
            b';' => return if i > 1 { Some(i + 1) } else { None },
            b'#' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => {}
            _ => return None,
        }
    }
    None
}

/// Whether an entity reference denotes a whitespace character. `&nbsp;` is
/// non-breaking by definition, so only explicit whitespace code points and
/// the named tab/newline references qualify.
fn entity_is_whitespace(entity: &str) -> bool {
    let body = &entity[1..entity.len() - 1];
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => numeric.parse(),
        };
        return code
            .ok()
            .and_then(char::from_u32)
            .is_some_and(char::is_whitespace);
    }
    matches!(body, "Tab" | "NewLine")
}
