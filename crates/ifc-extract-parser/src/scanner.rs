// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast record scanner using SIMD-accelerated byte searching
//!
//! Finds entity record boundaries in the DATA section without tokenizing.
//! A newline followed by a new record start always ends the current record,
//! so an unterminated string or a missing `;` costs one record, not the rest
//! of the file.

use crate::tokenizer::{find_comment_end, find_string_end, parse_header_entry};
use ifc_extract_model::{AttributeValue, ModelMetadata};
use memchr::{memchr, memchr_iter, memmem};

/// Boundaries of one entity record in the source text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Entity id
    pub id: u32,
    /// Type keyword as written
    pub type_name: &'a str,
    /// Byte offset of the `#`
    pub start: usize,
    /// Byte offset one past the record (past `;` when terminated)
    pub end: usize,
    /// Whether the record ended with `;`
    pub terminated: bool,
}

/// Entity record scanner
///
/// Uses memchr for SIMD-accelerated scanning to quickly find record
/// boundaries without full parsing.
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
    has_data_section: bool,
}

impl<'a> EntityScanner<'a> {
    /// Create a new scanner positioned after the `DATA;` marker
    ///
    /// Without a marker the whole input is scanned.
    pub fn new(content: &'a str) -> Self {
        let data = memmem::find(content.as_bytes(), b"DATA;");
        Self {
            content,
            pos: data.map(|p| p + 5).unwrap_or(0),
            has_data_section: data.is_some(),
        }
    }

    /// Whether a `DATA;` marker was found
    pub fn has_data_section(&self) -> bool {
        self.has_data_section
    }

    /// Scan to find the next record
    pub fn next_record(&mut self) -> Option<RawRecord<'a>> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            // Use memchr for fast # search
            let hash_pos = memchr(b'#', &bytes[self.pos..])?;
            self.pos += hash_pos;

            if !self.at_line_start(self.pos) {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let Some((id, type_start)) = record_header(bytes, start) else {
                self.pos += 1;
                continue;
            };

            // Type name (may be empty for complex instances; the tokenizer reports those)
            let type_len = bytes[type_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            let type_name = &self.content[type_start..type_start + type_len];

            self.pos = type_start + type_len;
            let (end, terminated) = self.find_record_end();
            self.pos = end;

            return Some(RawRecord {
                id,
                type_name,
                start,
                end,
                terminated,
            });
        }

        None
    }

    /// A record starts at `#` preceded only by spaces/tabs since a newline or `;`
    fn at_line_start(&self, pos: usize) -> bool {
        let bytes = self.content.as_bytes();
        let mut i = pos;
        while i > 0 {
            match bytes[i - 1] {
                b' ' | b'\t' => i -= 1,
                b'\n' | b'\r' | b';' => return true,
                _ => return false,
            }
        }
        true
    }

    /// Find the end of the current record
    ///
    /// Returns (end offset, terminated by `;`).
    fn find_record_end(&self) -> (usize, bool) {
        let bytes = self.content.as_bytes();
        let mut i = self.pos;

        while i < bytes.len() {
            match bytes[i] {
                b'\'' => {
                    let close = find_string_end(&bytes[i + 1..]).map(|e| i + 1 + e);
                    let limit = close.unwrap_or(bytes.len());

                    // A string may not run across the start of another record
                    if let Some(cut) = record_start_within(bytes, i + 1, limit) {
                        return (cut, false);
                    }

                    match close {
                        Some(c) => {
                            i = c + 1;
                            continue;
                        }
                        None => return (bytes.len(), false),
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let close = find_comment_end(&bytes[i + 2..]).map(|e| i + 2 + e);
                    let limit = close.unwrap_or(bytes.len());

                    if let Some(cut) = record_start_within(bytes, i + 2, limit) {
                        return (cut, false);
                    }

                    match close {
                        Some(c) => {
                            i = c;
                            continue;
                        }
                        None => return (bytes.len(), false),
                    }
                }
                b';' => return (i + 1, true),
                b'\n' if looks_like_record_start(bytes, i + 1) => return (i, false),
                _ => {}
            }
            i += 1;
        }

        (bytes.len(), false)
    }
}

/// Parse `#<digits> =` at `start`, returning the id and the offset after `=`
fn record_header(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    let mut i = start + 1;
    let id_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == id_start {
        return None;
    }
    let id: u32 = std::str::from_utf8(&bytes[id_start..i]).ok()?.parse().ok()?;

    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'=') {
        return None;
    }
    i += 1;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    Some((id, i))
}

/// Whether a record (`#<digits>=`) begins at `pos`, after optional indentation
fn looks_like_record_start(bytes: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r') {
        i += 1;
    }
    bytes.get(i) == Some(&b'#') && record_header(bytes, i).is_some()
}

/// First newline in `[from, to)` that is followed by a record start
fn record_start_within(bytes: &[u8], from: usize, to: usize) -> Option<usize> {
    memchr_iter(b'\n', &bytes[from..to])
        .map(|nl| from + nl)
        .find(|&nl| looks_like_record_start(bytes, nl + 1))
}

/// Maps byte offsets to 1-based line and column numbers
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    /// Index all newlines of the content
    pub fn new(content: &str) -> Self {
        Self {
            newlines: memchr_iter(b'\n', content.as_bytes()).collect(),
        }
    }

    /// 1-based (line, column) of a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = if line == 0 {
            0
        } else {
            self.newlines[line - 1] + 1
        };
        (line + 1, offset - line_start + 1)
    }
}

/// Parse the header section to extract metadata
///
/// Each `;`-terminated statement between `HEADER;` and the next `ENDSEC;`
/// is parsed as `KEYWORD(args)`.
pub fn parse_header(content: &str) -> ModelMetadata {
    let mut info = ModelMetadata::default();

    let bytes = content.as_bytes();
    let Some(header_start) = memmem::find(bytes, b"HEADER;").map(|p| p + 7) else {
        return info;
    };
    let header_end = memmem::find(&bytes[header_start..], b"ENDSEC;")
        .map(|p| header_start + p)
        .unwrap_or(content.len());

    for statement in header_statements(&content[header_start..header_end]) {
        let Some((keyword, args)) = parse_header_entry(statement) else {
            continue;
        };

        match keyword.as_str() {
            "FILE_DESCRIPTION" => {
                let description = header_strings(args.first()).join("; ");
                if !description.is_empty() {
                    info.file_description = Some(description);
                }
            }
            "FILE_NAME" => {
                info.file_name = header_string(args.first());
                info.timestamp = header_string(args.get(1));
                info.author = header_strings(args.get(2)).into_iter().next();
                info.organization = header_strings(args.get(3)).into_iter().next();
                info.preprocessor_version = header_string(args.get(4));
                info.originating_system = header_string(args.get(5));
            }
            "FILE_SCHEMA" => {
                if let Some(schema) = header_strings(args.first()).into_iter().next() {
                    info.schema_version = schema;
                }
            }
            _ => {}
        }
    }

    info
}

/// Split header text into `;`-terminated statements, honoring strings and comments
fn header_statements(header: &str) -> Vec<&str> {
    let bytes = header.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => match find_string_end(&bytes[i + 1..]) {
                Some(end) => i += end + 1,
                None => break,
            },
            b'/' if bytes.get(i + 1) == Some(&b'*') => match find_comment_end(&bytes[i + 2..]) {
                Some(end) => {
                    i += 2 + end;
                    continue;
                }
                None => break,
            },
            b';' => {
                statements.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    statements
}

/// Non-empty string value of a header argument
fn header_string(value: Option<&AttributeValue>) -> Option<String> {
    value
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-empty strings of a header list argument
fn header_strings(value: Option<&AttributeValue>) -> Vec<String> {
    match value {
        Some(AttributeValue::List(items)) => items
            .iter()
            .filter_map(|v| header_string(Some(v)))
            .collect(),
        other => header_string(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('test.ifc','2024-01-01T00:00:00',('Author'),('Org'),'Preprocessor','App','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid',$,'Wall; #9=not a record',$,$,#5,#6,$);
ENDSEC;
END-ISO-10303-21;
"#;

    fn collect(content: &str) -> Vec<RawRecord<'_>> {
        let mut scanner = EntityScanner::new(content);
        std::iter::from_fn(|| scanner.next_record()).collect()
    }

    #[test]
    fn test_scanner_finds_records() {
        let records = collect(TEST_IFC);
        assert_eq!(records.len(), 4);
        assert_eq!((records[0].id, records[0].type_name), (1, "IFCPROJECT"));
        assert_eq!((records[3].id, records[3].type_name), (4, "IFCWALL"));
        assert!(records.iter().all(|r| r.terminated));
        assert!(TEST_IFC[records[3].start..records[3].end].ends_with("$);"));
    }

    #[test]
    fn test_unterminated_string_cut_at_next_record() {
        let content = "DATA;\n#1=IFCWALL('abc,$);\n#2=IFCSLAB('x');\n";
        let records = collect(content);
        assert_eq!(records.len(), 2);
        assert!(!records[0].terminated);
        assert_eq!(&content[records[0].start..records[0].end], "#1=IFCWALL('abc,$);");
        assert_eq!(records[1].id, 2);
        assert!(records[1].terminated);
    }

    #[test]
    fn test_missing_semicolon_cut_at_next_record() {
        let content = "DATA;\n#1=IFCWALL('a',$)\n#2=IFCSLAB('x');\n";
        let records = collect(content);
        assert_eq!(records.len(), 2);
        assert!(!records[0].terminated);
        assert_eq!(records[1].type_name, "IFCSLAB");
    }

    #[test]
    fn test_multiline_record() {
        let content = "DATA;\n#1=IFCWALL('a',\n  $,\n  'b');\n#2=IFCSLAB('x');\n";
        let records = collect(content);
        assert_eq!(records.len(), 2);
        assert!(records[0].terminated);
    }

    #[test]
    fn test_comment_does_not_end_record() {
        let content = "DATA;\n#1=IFCWALL('w1',$, /* it's; a (note */ $);\n#2=IFCSLAB('x');\n";
        let records = collect(content);
        assert_eq!(records.len(), 2);
        assert!(records[0].terminated);
        assert!(content[records[0].start..records[0].end].ends_with("$);"));
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn test_unterminated_comment_cut_at_next_record() {
        let content = "DATA;\n#1=IFCWALL('a' /* open\n#2=IFCSLAB('x');\n";
        let records = collect(content);
        assert_eq!(records.len(), 2);
        assert!(!records[0].terminated);
        assert_eq!(records[1].type_name, "IFCSLAB");
    }

    #[test]
    fn test_missing_data_section() {
        let scanner = EntityScanner::new("#1=IFCWALL('a');");
        assert!(!scanner.has_data_section());
        assert_eq!(collect("#1=IFCWALL('a');").len(), 1);
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (2, 2));
        assert_eq!(index.line_col(7), (4, 1));
    }

    #[test]
    fn test_parse_header() {
        let info = parse_header(TEST_IFC);
        assert_eq!(info.schema_version, "IFC2X3");
        assert_eq!(info.file_name, Some("test.ifc".to_string()));
        assert_eq!(info.author, Some("Author".to_string()));
        assert_eq!(info.organization, Some("Org".to_string()));
        assert_eq!(info.originating_system, Some("App".to_string()));
        assert_eq!(
            info.file_description,
            Some("ViewDefinition [CoordinationView]".to_string())
        );
    }

    #[test]
    fn test_parse_header_skips_comments() {
        let content = "ISO-10303-21;\nHEADER;\n/* exported; it's a draft */\n\
                       FILE_NAME('a.ifc','2024',('Ann'),(''),'','Tool','');\n\
                       FILE_SCHEMA(('IFC4'));\nENDSEC;\n";
        let info = parse_header(content);
        assert_eq!(info.schema_version, "IFC4");
        assert_eq!(info.file_name, Some("a.ifc".to_string()));
        assert_eq!(info.author, Some("Ann".to_string()));
    }
}
