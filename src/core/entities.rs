//! XML Entity Decoding and Escaping
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present. The escaping side
//! is used whenever the engine synthesizes markup (numbers, headings,
//! comments, identifiers).

use memchr::{memchr, memchr3};

use super::scanner::{is_name_char, is_name_start_char};
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        if let Some(amp_pos) = memchr(b'&', &input[pos..]) {
            result.extend_from_slice(&input[pos..pos + amp_pos]);
            pos += amp_pos;

            if let Some(semi_offset) = memchr(b';', &input[pos..]) {
                let entity = &input[pos + 1..pos + semi_offset];

                if let Some(decoded) = decode_entity(entity) {
                    let mut buf = [0u8; 4];
                    result.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                    pos += semi_offset + 1;
                } else {
                    // Unknown entity, keep as-is
                    result.push(b'&');
                    pos += 1;
                }
            } else {
                result.push(b'&');
                pos += 1;
            }
        } else {
            result.extend_from_slice(&input[pos..]);
            break;
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Option<char> {
    match entity {
        [] => None,
        [b'#', rest @ ..] => decode_numeric_entity(rest),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let codepoint = match entity {
        [] => return None,
        [b'x' | b'X', hex @ ..] => u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?,
        dec => std::str::from_utf8(dec).ok()?.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}

/// Offset of the first malformed entity or character reference in `input`
///
/// Without a DOCTYPE only the five predefined entities exist; with one
/// (`declared`), any reference that is a well-formed name is accepted.
pub fn find_bad_reference(input: &[u8], declared: bool) -> Option<usize> {
    let mut pos = 0;
    while let Some(amp) = memchr(b'&', &input[pos..]) {
        let at = pos + amp;
        let Some(semi) = memchr(b';', &input[at + 1..]) else {
            return Some(at);
        };
        let entity = &input[at + 1..at + 1 + semi];
        let valid = match entity {
            [b'#', ..] => decode_entity(entity).is_some(),
            _ if declared => is_name(entity),
            _ => decode_entity(entity).is_some(),
        };
        if !valid {
            return Some(at);
        }
        pos = at + semi + 2;
    }
    None
}

fn is_name(bytes: &[u8]) -> bool {
    match bytes {
        [first, rest @ ..] => is_name_start_char(*first) && rest.iter().all(|&b| is_name_char(b)),
        [] => false,
    }
}

/// Encode text for XML element content
pub fn encode_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'<', b'>', b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Encode text for use in double-quoted XML attributes
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    if !input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\''))
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Reduce a markup fragment to its display text
///
/// Tags, comments and processing instructions are dropped, entities are
/// decoded and runs of whitespace collapse to a single space. Leading and
/// trailing whitespace is trimmed.
pub fn flatten_markup(markup: &[u8]) -> String {
    let mut text = Vec::with_capacity(markup.len());
    let mut pos = 0;

    while pos < markup.len() {
        match memchr(b'<', &markup[pos..]) {
            Some(lt) => {
                text.extend_from_slice(&markup[pos..pos + lt]);
                pos += lt;
                if markup[pos..].starts_with(b"<![CDATA[") {
                    let body = pos + 9;
                    let end = memchr::memmem::find(&markup[body..], b"]]>")
                        .map_or(markup.len(), |i| body + i);
                    // CDATA is literal; escape the ampersands so decoding leaves them alone
                    for &b in &markup[body..end] {
                        if b == b'&' {
                            text.extend_from_slice(b"&amp;");
                        } else {
                            text.push(b);
                        }
                    }
                    pos = (end + 3).min(markup.len());
                } else {
                    pos = construct_end(markup, pos);
                }
            }
            None => {
                text.extend_from_slice(&markup[pos..]);
                break;
            }
        }
    }

    let decoded = decode_text(&text);
    String::from_utf8_lossy(&decoded)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position just past the comment, processing instruction or tag at `start`
///
/// Tags end at the first `>` outside a quoted attribute value.
fn construct_end(markup: &[u8], start: usize) -> usize {
    let rest = &markup[start..];
    let delimited: Option<(usize, &[u8])> = if rest.starts_with(b"<!--") {
        Some((4, b"-->".as_slice()))
    } else if rest.starts_with(b"<?") {
        Some((2, b"?>".as_slice()))
    } else {
        None
    };
    if let Some((open, close)) = delimited {
        return memchr::memmem::find(&rest[open..], close)
            .map_or(markup.len(), |i| start + open + i + close.len());
    }

    let mut pos = start + 1;
    while let Some(i) = memchr3(b'>', b'"', b'\'', &markup[pos..]) {
        let at = pos + i;
        match markup[at] {
            b'>' => return at + 1,
            quote => match memchr(quote, &markup[at + 1..]) {
                Some(close) => pos = at + 1 + close + 1,
                None => return markup.len(),
            },
        }
    }
    markup.len()
}
