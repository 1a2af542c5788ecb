// Copyright (c) 2025 csvtable Contributors
// Licensed under the MIT License. See LICENSE file for details.

//! CSV decoding and encoding.
//!
//! The format is deliberately loose: any character between two numbers on
//! the same line acts as a field separator, lines starting with `#` are
//! comments, and rows keep however many numbers they actually contain.
//!
//! ```text
//! # time, speed
//! 0, 5
//! 1, 6, 10
//! # calibration gap
//! 2; 7
//! ```
//!
//! decodes to the ragged table `[[0, 5], [1, 6, 10], [2, 7]]`.
//!
//! Decoding never rejects content. A stream that does not start with a
//! number (after the skipped lines and comments) simply yields an empty
//! table, and the first line that does not start with a number ends it.

use std::io::{Read, Write};

use crate::error::Result;
use crate::types::{Dictionary, Element, Table};

/// Cursor over raw input bytes.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes everything up to and including the next `\n`.
    fn skip_line(&mut self) {
        while let Some(byte) = self.bump() {
            if byte == b'\n' {
                break;
            }
        }
    }

    /// Spaces and tabs only; a line ending is never skipped here.
    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Whitespace, blank lines and comment lines between two rows.
    fn skip_gap(&mut self) {
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'#') {
                self.skip_line();
            } else {
                break;
            }
        }
    }

    fn digits_from(&self, start: usize) -> usize {
        self.input[start.min(self.input.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    }

    /// Scans one number at the cursor. On failure nothing is consumed.
    fn number(&mut self) -> Option<Element> {
        let start = self.pos;
        let mut end = start;
        if matches!(self.input.get(end), Some(b'+' | b'-')) {
            end += 1;
        }

        let int_digits = self.digits_from(end);
        end += int_digits;

        let mut frac_digits = 0;
        if self.input.get(end) == Some(&b'.') {
            frac_digits = self.digits_from(end + 1);
            if int_digits > 0 || frac_digits > 0 {
                end += 1 + frac_digits;
            }
        }
        if int_digits + frac_digits == 0 {
            return self.special(start);
        }

        // The exponent only belongs to the number when digits follow it.
        if matches!(self.input.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(self.input.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_digits = self.digits_from(exp);
            if exp_digits > 0 {
                end = exp + exp_digits;
            }
        }

        let text = std::str::from_utf8(&self.input[start..end]).ok()?;
        let value = text.parse::<Element>().ok()?;
        self.pos = end;
        Some(value)
    }

    /// `inf`, `infinity` and `nan` in any case, optionally signed.
    fn special(&mut self, start: usize) -> Option<Element> {
        let mut pos = start;
        let negative = match self.input.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        const WORDS: [(&str, Element); 3] = [
            ("infinity", f64::INFINITY),
            ("inf", f64::INFINITY),
            ("nan", f64::NAN),
        ];
        for (word, value) in WORDS {
            let end = pos + word.len();
            if self
                .input
                .get(pos..end)
                .is_some_and(|s| s.eq_ignore_ascii_case(word.as_bytes()))
            {
                self.pos = end;
                return Some(if negative { -value } else { value });
            }
        }
        None
    }

    /// Reads the rest of the current line into `row`.
    ///
    /// Every character that is not a line ending separates fields, and a
    /// separator with no number behind it is dropped.
    fn rest_of_row(&mut self, row: &mut Vec<Element>) {
        while let Some(sep) = self.bump() {
            if sep == b'\n' || sep == b'\r' {
                break;
            }
            self.skip_blanks();
            if let Some(value) = self.number() {
                row.push(value);
            }
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a table from raw bytes, skipping `skip_lines` leading lines first.
///
/// A separator with no number behind it is dropped and the row continues, so
/// `1,,2` is the row `[1, 2]` rather than a row ended after `1`.
///
/// # Examples
///
/// ```rust
/// use csvtable::codec::parse_table;
///
/// let table = parse_table(b"# header\n1 2\n# mid\n3 4\n", 0);
/// assert_eq!(table.rows(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
///
/// let ragged = parse_table(b"name,value\n1,2,3\n4,5\n", 1);
/// assert_eq!(ragged.rows(), &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
/// ```
pub fn parse_table(input: &[u8], skip_lines: usize) -> Table {
    let mut scanner = Scanner::new(input);
    for _ in 0..skip_lines {
        if scanner.at_end() {
            break;
        }
        scanner.skip_line();
    }

    let mut table = Table::new();
    loop {
        scanner.skip_gap();
        let Some(first) = scanner.number() else {
            break;
        };
        let mut row = vec![first];
        scanner.rest_of_row(&mut row);
        table.push_row(row);
    }
    table
}

/// Reads the whole stream and decodes it with [`parse_table`].
///
/// # Errors
///
/// Only a failing reader is an error; malformed content is not.
pub fn decode_table<R: Read>(mut reader: R, skip_lines: usize) -> Result<Table> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    Ok(parse_table(&input, skip_lines))
}

/// Groups lines by their first number.
///
/// Comments are not recognised here.
///
/// ```rust
/// use csvtable::codec::parse_dictionary;
///
/// let dict = parse_dictionary(b"1,10,11\n2,20\n1,12\n");
/// assert_eq!(dict.get(1.0), Some(&[10.0, 11.0, 12.0][..]));
/// assert_eq!(dict.get(2.0), Some(&[20.0][..]));
/// ```
pub fn parse_dictionary(input: &[u8]) -> Dictionary {
    let mut scanner = Scanner::new(input);
    let mut dictionary = Dictionary::new();
    loop {
        while scanner.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            scanner.pos += 1;
        }
        let Some(key) = scanner.number() else {
            break;
        };
        scanner.rest_of_row(dictionary.entry(key));
    }
    dictionary
}

/// Reads the whole stream and decodes it with [`parse_dictionary`].
pub fn decode_dictionary<R: Read>(mut reader: R) -> Result<Dictionary> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    Ok(parse_dictionary(&input))
}

// =============================================================================
// Encoding
// =============================================================================

/// Returns `true` if `c` can separate encoded elements.
///
/// Characters that may belong to a number (digits, sign, point, exponent and
/// the letters of `inf`/`infinity`/`nan`), `#` and line endings are rejected:
/// a table written with one of them would not decode to the same rows.
///
/// ```rust
/// use csvtable::codec::is_valid_separator;
///
/// assert!(is_valid_separator(';'));
/// assert!(is_valid_separator('\t'));
/// assert!(!is_valid_separator('.'));
/// assert!(!is_valid_separator('e'));
/// ```
pub fn is_valid_separator(c: char) -> bool {
    !(c.is_ascii_digit() || matches!(c, '\n' | '\r' | '#') || "+-.eEiInNaAfFtTyY".contains(c))
}

fn write_joined<'e, W: Write>(
    writer: &mut W,
    values: impl IntoIterator<Item = &'e Element>,
    separator: char,
) -> std::io::Result<()> {
    let mut first = true;
    for value in values {
        if !first {
            write!(writer, "{separator}")?;
        }
        write!(writer, "{value}")?;
        first = false;
    }
    Ok(())
}

/// Writes one line per row, elements joined by `separator`.
///
/// Numbers use the shortest representation that reads back to the same
/// value, so decoding the output yields an identical table.
pub fn encode_table<W: Write>(mut writer: W, table: &Table, separator: char) -> Result<()> {
    for row in table.rows() {
        write_joined(&mut writer, row, separator)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one line per key: the key followed by its values.
pub fn encode_dictionary<W: Write>(
    mut writer: W,
    dictionary: &Dictionary,
    separator: char,
) -> Result<()> {
    for (key, values) in dictionary.iter() {
        write!(writer, "{key}")?;
        for value in values {
            write!(writer, "{separator}{value}")?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Encodes a table into a `String`.
pub fn format_table(table: &Table, separator: char) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = encode_table(&mut out, table, separator);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(input: &str, skip: usize) -> Vec<Vec<Element>> {
        parse_table(input.as_bytes(), skip).into()
    }

    #[test]
    fn test_ragged_rows() {
        assert_eq!(
            rows("1 2 3\n4 5\n", 0),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]
        );
    }

    #[test]
    fn test_comments_between_rows() {
        assert_eq!(
            rows("# header\n1 2\n# mid\n3 4\n", 0),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
        assert_eq!(rows("1,2\n\n\n# a\n# b\n3\n#tail", 0), vec![vec![1.0, 2.0], vec![3.0]]);
    }

    #[test]
    fn test_skip_lines_ignores_content() {
        assert_eq!(rows("1,2\n3,4\n5,6\n", 2), vec![vec![5.0, 6.0]]);
        assert_eq!(rows("time,value\n0,1\n", 1), vec![vec![0.0, 1.0]]);
        assert!(rows("1,2\n", 5).is_empty());
        assert!(rows("", 3).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            rows("1,2\r\n3,4\r\n", 0),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }

    #[test]
    fn test_trailing_and_repeated_separators() {
        assert_eq!(rows("1,2,\n3\n", 0), vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(rows("1,,2 ;\t3\n", 0), vec![vec![1.0, 2.0, 3.0]]);
        assert_eq!(rows("1,,2\n3,4\n", 0), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(rows("1, x, 2\n", 0), vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_non_numeric_line_ends_table() {
        assert!(rows("a,b\n1,2\n", 0).is_empty());
        assert_eq!(rows("1,2\nend\n3,4\n", 0), vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            rows("-1.5,+2,.25,3.,1e3,2.5E-1\n", 0),
            vec![vec![-1.5, 2.0, 0.25, 3.0, 1000.0, 0.25]]
        );
        // A dangling exponent marker is a separator.
        assert_eq!(rows("4e,5\n", 0), vec![vec![4.0, 5.0]]);
    }

    #[test]
    fn test_special_values_round_trip() {
        let table = Table::from(vec![vec![f64::INFINITY, f64::NEG_INFINITY, f64::NAN]]);
        let text = format_table(&table, ',');
        assert_eq!(text, "inf,-inf,NaN\n");
        let decoded: Vec<Vec<Element>> = parse_table(text.as_bytes(), 0).into();
        assert_eq!(decoded[0][0], f64::INFINITY);
        assert_eq!(decoded[0][1], f64::NEG_INFINITY);
        assert!(decoded[0][2].is_nan());
    }

    #[test]
    fn test_encode_empty_row_is_blank_line() {
        let table = Table::from(vec![vec![1.0, 2.5], vec![], vec![3.0]]);
        assert_eq!(format_table(&table, ';'), "1;2.5\n\n3\n");
    }

    #[test]
    fn test_dictionary_groups_by_first_field() {
        let dict = parse_dictionary(b"1,10\n2,20,21\n1,11\n3\n");
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get(1.0), Some(&[10.0, 11.0][..]));
        assert_eq!(dict.get(2.0), Some(&[20.0, 21.0][..]));
        assert_eq!(dict.get(3.0), Some(&[][..]));
    }

    #[test]
    fn test_dictionary_encode_one_line_per_key() {
        let mut dict = Dictionary::new();
        dict.extend(1.0, [10.0, 11.0]);
        dict.extend(2.0, [20.0]);
        let mut out = Vec::new();
        encode_dictionary(&mut out, &dict, ',').unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["1,10,11", "2,20"]);
        assert_eq!(parse_dictionary(text.as_bytes()), dict);
    }
}
