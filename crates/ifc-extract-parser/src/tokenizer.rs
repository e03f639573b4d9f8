// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP record tokenizer using nom combinators
//!
//! Parses one entity record (`#123=IFCWALL(attr1,attr2,...);`) into a
//! [`DecodedEntity`]. Failures carry the byte offset inside the record so
//! the caller can report a line and column.

use ifc_extract_model::{AttributeValue, DecodedEntity, EntityId, IfcType};
use memchr::memmem;
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair},
    IResult, Parser,
};
use std::borrow::Cow;
use thiserror::Error;

/// Raw token from STEP file (before conversion to AttributeValue)
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// Entity reference (#123)
    EntityRef(u32),
    /// String value ('text'), escapes decoded
    String(Cow<'a, str>),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enumeration (.VALUE.)
    Enum(&'a str),
    /// List of tokens
    List(Vec<Token<'a>>),
    /// Typed value like IFCLABEL('text')
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value ($)
    Null,
    /// Derived value (*)
    Derived,
}

impl<'a> Token<'a> {
    /// Convert token to owned AttributeValue
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Token::EntityRef(id) => AttributeValue::EntityRef(EntityId(*id)),
            Token::String(s) => AttributeValue::String(s.to_string()),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum("T") => AttributeValue::Bool(true),
            Token::Enum("F") => AttributeValue::Bool(false),
            Token::Enum(s) => AttributeValue::Enum((*s).to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(|t| t.to_attribute_value()).collect())
            }
            Token::TypedValue(name, args) => AttributeValue::TypedValue(
                (*name).to_string(),
                args.iter().map(|t| t.to_attribute_value()).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }
}

/// Category of a record failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// Unterminated string, unexpected character
    Lexical,
    /// Malformed entity line, unbalanced attribute list
    Structural,
    /// Valid STEP the extractor does not interpret (complex instances)
    Unsupported,
}

/// Why a record could not be parsed
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct RecordError {
    /// Byte offset inside the record where the problem was found
    pub offset: usize,
    /// Category
    pub kind: RecordErrorKind,
    /// Description
    pub message: String,
}

impl RecordError {
    fn new(offset: usize, kind: RecordErrorKind, message: impl Into<String>) -> Self {
        Self {
            offset,
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// String handling
// ============================================================================

/// Find the closing quote of a string whose body starts at `bytes[0]`
///
/// `''` is an escaped quote and a backslash escapes the next character,
/// except for the STEP encoding directives (`\X\hh`, `\X2\...\X0\`,
/// `\X4\...\X0\`, `\S\c`, `\P?\`) which are skipped as a unit.
pub(crate) fn find_string_end(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                return Some(i);
            }
            b'\\' => i += escape_len(&bytes[i..]),
            _ => i += 1,
        }
    }
    None
}

/// Find the end of a comment whose body starts at `bytes[0]` (just past
/// the opening `/*`), returning the offset one past the closing `*/`
pub(crate) fn find_comment_end(bytes: &[u8]) -> Option<usize> {
    memmem::find(bytes, b"*/").map(|end| end + 2)
}

/// Length of the escape sequence starting at a backslash
fn escape_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    match (bytes.get(1), bytes.get(2), bytes.get(3)) {
        (Some(b'X'), Some(b'\\'), _) => 5.min(len),
        (Some(b'X'), Some(b'2' | b'4'), Some(b'\\')) => memmem::find(&bytes[4..], b"\\X0\\")
            .map(|end| 4 + end + 4)
            .unwrap_or(2),
        (Some(b'S'), Some(b'\\'), _) => 4.min(len),
        (Some(b'P'), Some(_), Some(b'\\')) => 4,
        (Some(_), _, _) => 2,
        (None, _, _) => 1,
    }
}

/// Decode a raw string body: doubled quotes and STEP escape directives
pub fn decode_step_string(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\'') && !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(['\'', '\\']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(tail) = rest.strip_prefix("''") {
            out.push('\'');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\X\\") {
            match tail.get(..2).and_then(|h| u8::from_str_radix(h, 16).ok()) {
                Some(byte) => {
                    out.push(char::from(byte));
                    rest = &tail[2..];
                }
                None => {
                    out.push('X');
                    rest = &rest[2..];
                }
            }
        } else if let Some((decoded, tail)) = decode_wide(rest) {
            out.push_str(&decoded);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\S\\") {
            match tail.chars().next() {
                Some(c) if (c as u32) < 0x80 => {
                    out.push(char::from(c as u8 + 0x80));
                    rest = &tail[1..];
                }
                _ => rest = tail,
            }
        } else if rest.starts_with("\\P") && rest.as_bytes().get(3) == Some(&b'\\') {
            rest = &rest[4..];
        } else {
            // Lone quote or a backslash escaping the next character
            let mut chars = rest.chars();
            let first = chars.next();
            match (first, chars.next()) {
                (Some('\\'), Some(c)) => {
                    out.push(c);
                    rest = &rest[1 + c.len_utf8()..];
                }
                (Some(c), _) => {
                    out.push(c);
                    rest = &rest[c.len_utf8()..];
                }
                (None, _) => break,
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode `\X2\hhhh...\X0\` (UTF-16) or `\X4\hhhhhhhh...\X0\` (UTF-32)
fn decode_wide(s: &str) -> Option<(String, &str)> {
    let (width, body) = if let Some(body) = s.strip_prefix("\\X2\\") {
        (4, body)
    } else if let Some(body) = s.strip_prefix("\\X4\\") {
        (8, body)
    } else {
        return None;
    };

    let end = body.find("\\X0\\")?;
    let hex = &body[..end];
    if hex.len() % width != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let units: Option<Vec<u32>> = (0..hex.len())
        .step_by(width)
        .map(|i| u32::from_str_radix(&hex[i..i + width], 16).ok())
        .collect();
    let units = units?;

    let decoded = if width == 4 {
        let utf16: Vec<u16> = units.iter().map(|&u| u as u16).collect();
        String::from_utf16_lossy(&utf16)
    } else {
        units
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    };

    Some((decoded, &body[end + 4..]))
}

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Skip whitespace and `/* ... */` comments
fn ws(input: &str) -> IResult<&str, ()> {
    let mut input = input.trim_start();
    while let Some(rest) = input.strip_prefix("/*") {
        match rest.find("*/") {
            Some(end) => input = rest[end + 2..].trim_start(),
            None => break,
        }
    }
    Ok((input, ()))
}

/// Parse an entity reference (#123)
fn entity_ref(input: &str) -> IResult<&str, Token<'_>> {
    let (rest, _) = char('#')(input)?;
    let (rest, digits) = take_while1(|c: char| c.is_ascii_digit())(rest)?;
    let id = digits.parse::<u32>().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, Token::EntityRef(id)))
}

/// Parse a STEP string ('text' with '' for escaped quotes)
fn step_string(input: &str) -> IResult<&str, Token<'_>> {
    let (body, _) = char('\'')(input)?;

    // A missing closing quote is a hard failure: no alternative can match
    let end = find_string_end(body.as_bytes()).ok_or_else(|| {
        nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Char))
    })?;

    let content = &body[..end];
    let remaining = &body[end + 1..]; // Skip closing quote

    Ok((remaining, Token::String(decode_step_string(content))))
}

/// Parse a number (integer or float)
fn number(input: &str) -> IResult<&str, Token<'_>> {
    let (rest, num_str) = recognize((
        opt(alt((char('-'), char('+')))),
        take_while1(|c: char| c.is_ascii_digit()),
        opt(pair(char('.'), take_while(|c: char| c.is_ascii_digit()))),
        opt((
            alt((char('e'), char('E'))),
            opt(alt((char('+'), char('-')))),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
    ))
    .parse(input)?;

    let not_a_number =
        || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Float));

    // Use lexical-core for fast parsing
    let bytes = num_str.trim_start_matches('+').as_bytes();
    if num_str.contains(['.', 'e', 'E']) {
        let f: f64 = lexical_core::parse(bytes).map_err(|_| not_a_number())?;
        Ok((rest, Token::Float(f)))
    } else {
        match lexical_core::parse::<i64>(bytes) {
            Ok(i) => Ok((rest, Token::Integer(i))),
            // Too large for i64: keep the value as a float
            Err(_) => {
                let f: f64 = lexical_core::parse(bytes).map_err(|_| not_a_number())?;
                Ok((rest, Token::Float(f)))
            }
        }
    }
}

/// Parse an enumeration (.VALUE.)
fn enumeration(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('.')(input)?;
    let (input, name) = take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)?;
    let (input, _) = char('.')(input)?;
    Ok((input, Token::Enum(name)))
}

/// Parse null ($)
fn null_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('$')(input)?;
    Ok((input, Token::Null))
}

/// Parse derived (*)
fn derived_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('*')(input)?;
    Ok((input, Token::Derived))
}

/// Parse a parenthesized, comma-separated token list
fn token_list(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    delimited(
        pair(char('('), ws),
        separated_list0((ws, char(','), ws), token),
        pair(ws, char(')')),
    )
    .parse(input)
}

/// Parse a list of tokens
fn list(input: &str) -> IResult<&str, Token<'_>> {
    let (input, items) = token_list(input)?;
    Ok((input, Token::List(items)))
}

/// Parse a typed value like IFCLABEL('text')
fn typed_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, type_name) = take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)?;
    let (input, _) = ws(input)?;
    let (input, args) = token_list(input)?;
    Ok((input, Token::TypedValue(type_name, args)))
}

/// Parse any token
fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        entity_ref,
        step_string,
        null_value,
        derived_value,
        enumeration,
        number,
        list,
        typed_value,
    ))
    .parse(input)
}

// ============================================================================
// Record Parsing
// ============================================================================

/// Check quoting and parenthesis balance of a whole record
///
/// Scans characters tracking the quoted-string state and the nesting depth,
/// so unbalanced records get a precise message before tokenizing. Strings
/// and `/* */` comments are skipped whole.
pub fn check_structure(record: &str) -> Result<(), RecordError> {
    let bytes = record.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => match find_string_end(&bytes[i + 1..]) {
                Some(end) => {
                    i += end + 2;
                    continue;
                }
                None => {
                    return Err(RecordError::new(
                        i,
                        RecordErrorKind::Lexical,
                        "unterminated string",
                    ))
                }
            },
            b'/' if bytes.get(i + 1) == Some(&b'*') => match find_comment_end(&bytes[i + 2..]) {
                Some(end) => {
                    i += 2 + end;
                    continue;
                }
                None => {
                    return Err(RecordError::new(
                        i,
                        RecordErrorKind::Lexical,
                        "unterminated comment",
                    ))
                }
            },
            b'(' => depth += 1,
            b')' => {
                if depth == 0 {
                    return Err(RecordError::new(
                        i,
                        RecordErrorKind::Structural,
                        "unbalanced parentheses: unexpected ')'",
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }

    if depth > 0 {
        return Err(RecordError::new(
            record.trim_end().len(),
            RecordErrorKind::Structural,
            format!("unbalanced parentheses: {} unclosed '('", depth),
        ));
    }

    Ok(())
}

/// Turn a nom failure into a record error with a useful message
fn describe_failure(record: &str, remaining: &str) -> RecordError {
    // separated_list0 backtracks to the separator in front of a bad token
    let remaining = match remaining.strip_prefix(',') {
        Some(rest) => rest.trim_start(),
        None => remaining,
    };
    let offset = record.len() - remaining.len();
    match remaining.chars().next() {
        None | Some(';') => RecordError::new(
            offset,
            RecordErrorKind::Structural,
            "unexpected end of attribute list",
        ),
        Some(')') | Some(',') => {
            RecordError::new(offset, RecordErrorKind::Structural, "missing attribute value")
        }
        Some('\'') => RecordError::new(offset, RecordErrorKind::Lexical, "unterminated string"),
        Some(c) => RecordError::new(
            offset,
            RecordErrorKind::Lexical,
            format!("unexpected character '{}'", c),
        ),
    }
}

/// Parse a complete entity definition
///
/// Format: `#123=IFCWALL(attr1,attr2,...);`
pub fn parse_entity(record: &str) -> Result<DecodedEntity, RecordError> {
    check_structure(record)?;

    let offset_of = |rest: &str| record.len() - rest.len();
    let structural = |rest: &str, msg: &str| {
        RecordError::new(offset_of(rest), RecordErrorKind::Structural, msg)
    };

    let (input, _) = ws(record).unwrap_or((record, ()));

    // Entity ID
    let input = input
        .strip_prefix('#')
        .ok_or_else(|| structural(input, "expected '#' at start of entity"))?;
    let id_len = input.bytes().take_while(u8::is_ascii_digit).count();
    let id: u32 = input[..id_len]
        .parse()
        .map_err(|_| structural(input, "expected entity id"))?;
    let input = &input[id_len..];

    // =
    let (input, _) = ws(input).unwrap_or((input, ()));
    let input = input
        .strip_prefix('=')
        .ok_or_else(|| structural(input, "expected '=' after entity id"))?;
    let (input, _) = ws(input).unwrap_or((input, ()));

    if input.starts_with('(') {
        return Err(RecordError::new(
            offset_of(input),
            RecordErrorKind::Unsupported,
            format!("complex entity instance #{} skipped", id),
        ));
    }

    // Type name
    let name_len = input
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return Err(structural(input, "expected type name"));
    }
    let type_name = &input[..name_len];
    let rest = &input[name_len..];
    let (input, _) = ws(rest).unwrap_or((rest, ()));

    // Attributes
    let (input, tokens) = token_list(input).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => describe_failure(record, e.input),
        nom::Err::Incomplete(_) => structural("", "incomplete record"),
    })?;

    // Only the terminator may follow
    let (input, _) = ws(input).unwrap_or((input, ()));
    let input = input.strip_prefix(';').unwrap_or(input);
    let (input, _) = ws(input).unwrap_or((input, ()));
    if !input.is_empty() {
        return Err(describe_failure(record, input));
    }

    let attributes: Vec<AttributeValue> = tokens.iter().map(|t| t.to_attribute_value()).collect();

    Ok(DecodedEntity {
        id: EntityId(id),
        ifc_type: IfcType::parse(type_name),
        attributes,
    })
}

/// Parse a header statement like `FILE_NAME('a','b',...)`
///
/// Returns the keyword and its arguments, or `None` when the statement is
/// not a well-formed keyword application.
pub fn parse_header_entry(statement: &str) -> Option<(String, Vec<AttributeValue>)> {
    let (rest, _) = ws(statement).ok()?;
    match typed_value(rest) {
        Ok((_, Token::TypedValue(keyword, args))) => Some((
            keyword.to_ascii_uppercase(),
            args.iter().map(|t| t.to_attribute_value()).collect(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_ref() {
        let (remaining, token) = entity_ref("#123").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::EntityRef(123));
    }

    #[test]
    fn test_parse_string() {
        let (remaining, token) = step_string("'hello world'").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::String(Cow::Borrowed("hello world")));
    }

    #[test]
    fn test_parse_string_with_escaped_quote() {
        let (remaining, token) = step_string("'it''s a test'").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::String(Cow::Borrowed("it's a test")));
    }

    #[test]
    fn test_parse_string_with_backslash_escape() {
        let (remaining, token) = step_string(r"'a\'b'").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::String(Cow::Borrowed("a'b")));
    }

    #[test]
    fn test_unterminated_string_is_failure() {
        assert!(matches!(step_string("'abc"), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn test_decode_x2_directive() {
        assert_eq!(decode_step_string(r"Geb\X2\00E4\X0\ude"), "Gebäude");
        // The directive ends right before the closing quote
        let (rest, token) = step_string(r"'Tür\X2\00FC\X0\'").unwrap();
        assert_eq!(rest, "");
        assert_eq!(token, Token::String(Cow::Borrowed("Türü")));
    }

    #[test]
    fn test_decode_x_and_s_directives() {
        assert_eq!(decode_step_string(r"caf\X\E9"), "café");
        assert_eq!(decode_step_string(r"\S\D"), "Ä");
    }

    #[test]
    fn test_decode_x4_and_page_directives() {
        assert_eq!(decode_step_string(r"\X4\0001F600\X0\!"), "\u{1F600}!");
        assert_eq!(decode_step_string(r"\PA\na\S\ove"), "naïve");
        let (rest, token) = step_string(r"'\X4\000000E9\X0\'").unwrap();
        assert_eq!(rest, "");
        assert_eq!(token, Token::String(Cow::Borrowed("é")));
    }

    #[test]
    fn test_parse_number_integer() {
        let (remaining, token) = number("42").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::Integer(42));
    }

    #[test]
    fn test_parse_number_float() {
        let (remaining, token) = number("3.14159").unwrap();
        assert_eq!(remaining, "");
        if let Token::Float(f) = token {
            assert!((f - 3.14159).abs() < 1e-10);
        } else {
            panic!("Expected float");
        }
    }

    #[test]
    fn test_parse_number_scientific() {
        let (remaining, token) = number("1.5E-3").unwrap();
        assert_eq!(remaining, "");
        if let Token::Float(f) = token {
            assert!((f - 0.0015).abs() < 1e-10);
        } else {
            panic!("Expected float");
        }
    }

    #[test]
    fn test_parse_number_trailing_dot() {
        let (_, token) = number("200.").unwrap();
        assert_eq!(token, Token::Float(200.0));
    }

    #[test]
    fn test_parse_enum() {
        let (remaining, token) = enumeration(".TRUE.").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::Enum("TRUE"));
    }

    #[test]
    fn test_boolean_enums_become_bools() {
        let entity =
            parse_entity("#3=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.F.),.T.,.U.);")
                .unwrap();
        assert_eq!(
            entity.get(2),
            Some(&AttributeValue::TypedValue(
                "IFCBOOLEAN".into(),
                vec![AttributeValue::Bool(false)]
            ))
        );
        assert_eq!(entity.get(3), Some(&AttributeValue::Bool(true)));
        assert_eq!(entity.get_enum(4), Some("U"));
    }

    #[test]
    fn test_parse_nested_list() {
        let (remaining, token) = list("((1, 2), (#3, 'x'), ())").unwrap();
        assert_eq!(remaining, "");
        if let Token::List(items) = token {
            assert_eq!(items.len(), 3);
            assert_eq!(
                items[1],
                Token::List(vec![Token::EntityRef(3), Token::String(Cow::Borrowed("x"))])
            );
            assert_eq!(items[2], Token::List(vec![]));
        } else {
            panic!("Expected list");
        }
    }

    #[test]
    fn test_parse_entity() {
        let entity = parse_entity("#1=IFCWALL('abc',$,#2);").unwrap();
        assert_eq!(entity.id, EntityId(1));
        assert_eq!(entity.ifc_type, IfcType::IfcWall);
        assert_eq!(entity.attributes.len(), 3);
        assert_eq!(entity.get_ref(2), Some(EntityId(2)));
        assert!(entity.get(1).unwrap().is_null());
    }

    #[test]
    fn test_parse_entity_typed_value_and_comment() {
        let entity =
            parse_entity("#7 = IFCPROPERTYSINGLEVALUE('Width', /* c */ $, IFCLENGTHMEASURE(200.), $);")
                .unwrap();
        assert_eq!(entity.get_float(2), Some(200.0));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_entity("#5=IFCWALL('a',$,(#1,#2);").unwrap_err();
        assert_eq!(err.kind, RecordErrorKind::Structural);
        assert!(err.message.contains("unbalanced"));
    }

    #[test]
    fn test_unterminated_string_record() {
        let err = parse_entity("#5=IFCWALL('abc,$);").unwrap_err();
        assert_eq!(err.kind, RecordErrorKind::Lexical);
        assert_eq!(err.offset, 11);
    }

    #[test]
    fn test_unexpected_character() {
        let err = parse_entity("#5=IFCWALL('a',?);").unwrap_err();
        assert_eq!(err.kind, RecordErrorKind::Lexical);
        assert!(err.message.contains('?'));
        assert_eq!(err.offset, 15);
    }

    #[test]
    fn test_comments_hide_quotes_and_parentheses() {
        let entity = parse_entity("#1=IFCWALL('w1',$,'Wall', /* it's a comment */ $,$,$,$,$);")
            .unwrap();
        assert_eq!(entity.attributes.len(), 8);
        assert_eq!(entity.get_string(2), Some("Wall"));

        let entity = parse_entity("#1=IFCWALL('w1',$,'Wall',/* note ( */$,$,$,$,$);").unwrap();
        assert_eq!(entity.attributes.len(), 8);

        let err = parse_entity("#1=IFCWALL('w1',$ /* open").unwrap_err();
        assert_eq!(err.kind, RecordErrorKind::Lexical);
        assert_eq!(err.offset, 19);
    }

    #[test]
    fn test_complex_instance_unsupported() {
        let err = parse_entity("#9=(IFCA()IFCB());").unwrap_err();
        assert_eq!(err.kind, RecordErrorKind::Unsupported);
    }

    #[test]
    fn test_header_entry() {
        let (keyword, args) =
            parse_header_entry("FILE_SCHEMA(('IFC4'))").expect("header entry");
        assert_eq!(keyword, "FILE_SCHEMA");
        assert_eq!(
            args,
            vec![AttributeValue::List(vec![AttributeValue::String(
                "IFC4".to_string()
            )])]
        );
        assert!(parse_header_entry("garbage").is_none());
    }
}
