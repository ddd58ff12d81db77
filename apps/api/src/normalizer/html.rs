//! Markup stripping: reduces an HTML fragment to its visible text.
//!
//! Tags vanish without leaving a separator (`<p>a</p><p>b</p>` → `ab`), which is
//! how the training corpus was flattened. Comments, declarations, processing
//! instructions and the bodies of `<script>`/`<style>` are dropped entirely.
//! Character references are decoded against the full HTML5 table; unknown
//! ones stay as literal text.

use std::borrow::Cow;

use super::entities::{self, WINDOWS_1252};

/// Returns the visible text of `input` with all markup removed.
pub fn strip_html(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                if let Some(end) = markup_end(input, i) {
                    out.push_str(&input[text_start..i]);
                    i = end;
                    text_start = end;
                    continue;
                }
            }
            b'&' => {
                if let Some((decoded, consumed)) = decode_entity(&input[i..]) {
                    out.push_str(&input[text_start..i]);
                    out.push_str(&decoded);
                    i += consumed;
                    text_start = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&input[text_start..]);
    out
}

/// If a markup construct starts at `start`, returns the byte offset just past it.
/// A `<` that does not open a tag, comment or declaration is plain text.
fn markup_end(input: &str, start: usize) -> Option<usize> {
    let rest = &input[start..];

    if let Some(body) = rest.strip_prefix("<!--") {
        // An unterminated comment swallows the rest of the document.
        return Some(body.find("-->").map_or(input.len(), |p| start + 4 + p + 3));
    }

    let bytes = rest.as_bytes();
    match bytes.get(1) {
        Some(b'!') | Some(b'?') => rest.find('>').map(|p| start + p + 1),
        Some(b'/') if bytes.get(2).is_some_and(u8::is_ascii_alphabetic) => {
            tag_close(rest).map(|p| start + p)
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let close = tag_close(rest)?;
            let name = tag_name(&rest[1..]);
            let self_closing = rest[..close].ends_with("/>");
            if (name == "script" || name == "style") && !self_closing {
                Some(start + raw_text_end(rest, close, &name))
            } else {
                Some(start + close)
            }
        }
        _ => None,
    }
}

/// Offset just past the `>` closing the tag that opens `tag`, skipping over
/// quoted attribute values.
fn tag_close(tag: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (idx, &b) in tag.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(idx + 1),
            None => {}
        }
    }
    None
}

fn tag_name(after_lt: &str) -> String {
    after_lt
        .bytes()
        .take_while(u8::is_ascii_alphanumeric)
        .map(|b| b.to_ascii_lowercase() as char)
        .collect()
}

/// Finds the end of a raw-text element (`script`/`style`) whose opening tag
/// ends at `from`. Without a closing tag the element runs to end of input.
fn raw_text_end(rest: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{name}");
    let haystack = rest.as_bytes();
    let mut idx = from;
    while idx + needle.len() <= haystack.len() {
        if haystack[idx..idx + needle.len()].eq_ignore_ascii_case(needle.as_bytes()) {
            return rest[idx..].find('>').map_or(rest.len(), |p| idx + p + 1);
        }
        idx += 1;
    }
    rest.len()
}

/// Longest run of characters read as a reference name.
const MAX_NAME_LEN: usize = 32;

/// Decodes a character reference at the start of `rest` (which begins with `&`).
/// Returns the replacement text and the number of bytes consumed.
///
/// Follows the HTML5 tokenizer as the training pipeline's parser applies it:
/// the trailing `;` is optional for numeric references and for the legacy
/// named set, and a legacy name also matches as a prefix (`&copyx;` is `©x;`).
fn decode_entity(rest: &str) -> Option<(Cow<'static, str>, usize)> {
    let body = &rest[1..];
    if let Some(num) = body.strip_prefix('#') {
        return decode_numeric(num).map(|(text, len)| (text, len + 2));
    }
    decode_named(body).map(|(text, len)| (Cow::Borrowed(text), len + 1))
}

fn decode_numeric(num: &str) -> Option<(Cow<'static, str>, usize)> {
    let (digits, radix, marker) = match num.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16, 1),
        None => (num, 10, 0),
    };
    let len = digits
        .bytes()
        .take_while(|b| (*b as char).is_digit(radix))
        .count();
    if len == 0 {
        return None;
    }

    let code = digits[..len]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc.saturating_mul(radix).saturating_add(d));
    let semi = usize::from(digits[len..].starts_with(';'));

    Some((numeric_replacement(code), marker + len + semi))
}

fn numeric_replacement(code: u32) -> Cow<'static, str> {
    let c = match code {
        0 | 0xD800..=0xDFFF => char::REPLACEMENT_CHARACTER,
        0x0D => '\r',
        0x80..=0x9F => WINDOWS_1252[(code - 0x80) as usize],
        _ if code > 0x10FFFF => char::REPLACEMENT_CHARACTER,
        _ if is_disallowed(code) => return Cow::Borrowed(""),
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    };
    Cow::Owned(c.to_string())
}

/// Control characters and noncharacters, which decode to nothing.
fn is_disallowed(code: u32) -> bool {
    matches!(code, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF)
        || code & 0xFFFE == 0xFFFE
}

fn decode_named(body: &str) -> Option<(&'static str, usize)> {
    let name_len = body
        .char_indices()
        .take(MAX_NAME_LEN)
        .take_while(|&(_, c)| !matches!(c, '\t' | '\n' | '\x0C' | ' ' | '<' | '&' | '#' | ';'))
        .last()
        .map(|(idx, c)| idx + c.len_utf8())?;
    let name = &body[..name_len];

    if body[name_len..].starts_with(';') {
        if let Some(text) = entities::named(name) {
            return Some((text, name_len + 1));
        }
    } else if entities::is_legacy(name) {
        return entities::named(name).map(|text| (text, name_len));
    }

    // Longest legacy name that prefixes the run; the rest stays as text.
    (2..name_len)
        .rev()
        .filter(|&end| name.is_char_boundary(end))
        .find_map(|end| {
            let prefix = &name[..end];
            if entities::is_legacy(prefix) {
                entities::named(prefix).map(|text| (text, end))
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_removed_without_separator() {
        assert_eq!(strip_html("<p>a</p><p>b</p>"), "ab");
    }

    #[test]
    fn test_attributes_with_gt_inside_quotes() {
        assert_eq!(
            strip_html(r#"<a href="x>y" title='p>q'>link</a> text"#),
            "link text"
        );
    }

    #[test]
    fn test_script_and_style_bodies_dropped() {
        let html = "<style>p { color: red }</style>Hello<SCRIPT type=\"x\">var a = 1 < 2;</script> world";
        assert_eq!(strip_html(html), "Hello world");
    }

    #[test]
    fn test_comments_and_doctype_dropped() {
        assert_eq!(
            strip_html("<!DOCTYPE html><!-- hidden -->visible<?xml version=\"1.0\"?>"),
            "visible"
        );
    }

    #[test]
    fn test_unterminated_comment_swallows_rest() {
        assert_eq!(strip_html("keep<!-- never closed"), "keep");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(strip_html("a < b and 3<4"), "a < b and 3<4");
    }

    #[test]
    fn test_unclosed_tag_is_text() {
        assert_eq!(strip_html("x <p"), "x <p");
    }

    #[test]
    fn test_named_and_numeric_entities() {
        assert_eq!(strip_html("Tom &amp; Jerry&nbsp;&#65;&#x42;"), "Tom & Jerry\u{a0}AB");
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        assert_eq!(strip_html("&bogus; &Amp; &#x; &#q"), "&bogus; &Amp; &#x; &#q");
    }

    #[test]
    fn test_long_tail_named_entities() {
        assert_eq!(
            strip_html("Bogot&oacute; I &hearts; &rarr; &frac12;"),
            "Bogot\u{f3} I \u{2665} \u{2192} \u{bd}"
        );
        assert_eq!(strip_html("&NotEqualTilde;"), "\u{2242}\u{338}");
    }

    #[test]
    fn test_legacy_entities_without_semicolon() {
        assert_eq!(strip_html("R&amp D"), "R& D");
        assert_eq!(strip_html("&lt3 &AMP"), "<3 &");
        assert_eq!(strip_html("caf&eacute au lait"), "caf\u{e9} au lait");
    }

    #[test]
    fn test_legacy_entity_matches_as_prefix() {
        assert_eq!(strip_html("&copyx;"), "\u{a9}x;");
        assert_eq!(strip_html("&notin"), "\u{ac}in");
        assert_eq!(strip_html("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_numeric_reference_edge_cases() {
        assert_eq!(strip_html("a&#99999999999999999999;b"), "a\u{fffd}b");
        assert_eq!(strip_html("&#128;&#x80"), "\u{20ac}\u{20ac}");
        assert_eq!(strip_html("x&#11;y"), "xy");
        assert_eq!(strip_html("&#65abc"), "Aabc");
        assert_eq!(strip_html("&#0;"), "\u{fffd}");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_html("Just text, nothing else."), "Just text, nothing else.");
    }

    #[test]
    fn test_multibyte_text_preserved() {
        assert_eq!(strip_html("<b>café</b> — naïve"), "café — naïve");
    }
}
