// Mon Jan 19 2026 - Alex

//! "Find marker, parse value" primitives shared by the record parsers.

use super::error::{DumpError, DumpResult};
use crate::structure::types::TypeId;

/// Parses a hexadecimal number with an optional `0x` prefix.
pub fn parse_hex(token: &str) -> Option<u64> {
    let token = token.trim();
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

pub fn parse_type_id(token: &str) -> Option<TypeId> {
    parse_hex(token)
        .and_then(|value| u32::try_from(value).ok())
        .map(TypeId::new)
}

/// Leading type id of a record header, e.g. `0x1003 : Length = 38, ...`.
pub fn leading_type_id(line: &str, line_number: usize) -> DumpResult<TypeId> {
    let token = line
        .split(|c: char| c.is_whitespace() || c == ':')
        .find(|token| !token.is_empty())
        .unwrap_or("");

    parse_type_id(token).ok_or_else(|| DumpError::grammar("leading type id", line_number, line))
}

/// Text directly following `introducer`, if the introducer is on the line.
pub fn after<'a>(line: &'a str, introducer: &str) -> Option<&'a str> {
    line.find(introducer).map(|index| &line[index + introducer.len()..])
}

/// Token following `introducer`, cut at the next comma or whitespace.
pub fn token_after<'a>(line: &'a str, introducer: &str) -> Option<&'a str> {
    let rest = after(line, introducer)?.trim_start();
    let end = rest
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Hexadecimal type id following `introducer`.
pub fn type_id_after(line: &str, introducer: &str, line_number: usize) -> DumpResult<TypeId> {
    let token = token_after(line, introducer)
        .ok_or_else(|| DumpError::grammar(introducer, line_number, line))?;
    parse_type_id(token).ok_or_else(|| DumpError::grammar(introducer, line_number, line))
}

/// Field value following `introducer` up to the first comma, trimmed.
pub fn text_after<'a>(line: &'a str, introducer: &str) -> Option<&'a str> {
    let rest = after(line, introducer)?;
    let end = rest.find(',').unwrap_or(rest.len());
    Some(strip_trailing_comma(rest[..end].trim()))
}

/// Like [`text_after`], but the value runs up to `terminator` when that
/// introducer follows on the same line.
pub fn text_until<'a>(line: &'a str, introducer: &str, terminator: &str) -> Option<&'a str> {
    let rest = after(line, introducer)?;
    match rest.find(terminator) {
        Some(end) => Some(rest[..end].trim()),
        None => text_after(line, introducer),
    }
}

pub fn strip_trailing_comma(value: &str) -> &str {
    value.trim_end().strip_suffix(',').unwrap_or(value).trim_end()
}

/// Strips exactly one leading and one trailing quote character.
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    let is_quote = |c: char| c == '\'' || c == '"';

    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if is_quote(first) && is_quote(last) => &value[1..value.len() - 1],
        _ => value,
    }
}

/// Quoted member name following `name = `. Unlike other fields, the name is
/// read to the closing quote so commas inside operator names survive.
pub fn quoted_after<'a>(line: &'a str, introducer: &str) -> Option<&'a str> {
    let rest = after(line, introducer)?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"');
    match quote {
        Some(quote) => {
            let close = rest[1..].find(quote)? + 1;
            Some(unquote(&rest[..=close]))
        }
        None => text_after(line, introducer),
    }
}

/// True when the rendering wrapped: the last non-whitespace char is a comma.
pub fn ends_with_dangling_comma(line: &str) -> bool {
    line.trim_end().ends_with(',')
}
