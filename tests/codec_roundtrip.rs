//! Property-based tests for CSV encode/decode round-trips.
//!
//! **Property: Encode-Decode Round-Trip**
//! Encoding a table and decoding the result with no skipped lines yields the
//! same rows, including ragged ones.

use std::io::Cursor;

use csvtable::codec::{format_table, is_valid_separator, parse_table};
use csvtable::{decode_table, encode_table, Table, TableRegistry};
use proptest::prelude::*;
use tempfile::tempdir;

/// Generator for finite elements.
fn arb_element() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (-1_000_000i64..1_000_000).prop_map(|i| i as f64),
        4 => (-1.0e6..1.0e6f64),
        1 => any::<f64>().prop_filter("finite", |f| f.is_finite()),
    ]
}

/// Generator for ragged tables with non-empty rows.
fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(prop::collection::vec(arb_element(), 1..8), 0..20).prop_map(Table::from)
}

/// Separators that cannot be mistaken for part of a number.
fn arb_separator() -> impl Strategy<Value = char> {
    prop_oneof![
        3 => prop::sample::select(vec![',', ';', ' ', '\t', '|']),
        1 => any::<char>().prop_filter("usable separator", |c| is_valid_separator(*c)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: Encode-Decode Round-Trip**
    ///
    /// For any table of finite values and any separator, decoding the encoded
    /// text returns the same rows in the same order.
    #[test]
    fn prop_encode_decode_roundtrip(table in arb_table(), separator in arb_separator()) {
        let mut out = Vec::new();
        encode_table(&mut out, &table, separator).expect("encode should succeed");

        let decoded = decode_table(Cursor::new(out), 0).expect("decode should succeed");

        prop_assert_eq!(decoded.row_count(), table.row_count());
        prop_assert_eq!(decoded.rows(), table.rows());
    }

    /// **Property: Skip Lines Drops Leading Rows**
    ///
    /// Skipping `n` lines of an encoded table drops exactly its first `n` rows.
    #[test]
    fn prop_skip_lines(table in arb_table(), skip in 0usize..25) {
        let text = format_table(&table, ',');
        let decoded = parse_table(text.as_bytes(), skip);

        let expected = &table.rows()[skip.min(table.row_count())..];
        prop_assert_eq!(decoded.rows(), expected);
    }

    /// **Property: Comment Lines Are Invisible**
    ///
    /// Interleaving `#` comment lines between rows does not change the decoded table.
    #[test]
    fn prop_comments_ignored(table in arb_table(), note in "[a-z ,0-9]{0,20}") {
        let mut text = format!("# {}\n", note);
        for row in table.rows() {
            let line = format_table(&Table::from(vec![row.clone()]), ',');
            text.push_str(&line);
            text.push_str(&format!("#{}\n", note));
        }

        let decoded = parse_table(text.as_bytes(), 0);
        prop_assert_eq!(decoded.rows(), table.rows());
    }
}

#[test]
fn test_rejected_separators_are_number_characters() {
    for c in "0123456789+-.eEiInNaAfFtTyY#\n\r".chars() {
        assert!(!is_valid_separator(c), "accepted {:?}", c);
    }
    for c in [',', ';', ' ', '\t', '|', ':', '/', 'x', '\u{00a0}'] {
        assert!(is_valid_separator(c), "rejected {:?}", c);
    }
}

#[test]
fn test_ragged_rows_keep_their_length() {
    let table = parse_table(b"1 2 3\n4 5\n", 0);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows()[0].len(), 3);
    assert_eq!(table.rows()[1].len(), 2);
    assert_eq!(table.col_count(), 3);
}

#[test]
fn test_comment_lines() {
    let table = parse_table(b"# header\n1 2\n# mid\n3 4\n", 0);
    assert_eq!(table.rows(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
}

#[test]
fn test_file_roundtrip_through_registry() {
    let dir = tempdir().expect("failed to create temp dir");
    let source = dir.path().join("source.csv");
    let target = dir.path().join("target.csv");
    std::fs::write(&source, "time;speed\n0; 1.5\n1; 2.5; 9\n# gap\n2; 3.5\n")
        .expect("failed to write source");

    let mut registry = TableRegistry::new();
    let id = registry.load_file(&source, 1).expect("load should succeed");
    assert_eq!(registry.row_count(id).unwrap(), 3);

    let written = registry.save_file(id, &target).expect("save should succeed");
    assert_eq!(written, 3);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "0,1.5\n1,2.5,9\n2,3.5\n"
    );

    let again = registry.load_file(&target, 0).expect("reload should succeed");
    assert_eq!(registry.read(again, 1, 2).unwrap(), 9.0);
    assert_eq!(registry.width_range(again).unwrap(), Some((2, 3)));
}

#[test]
fn test_missing_file_registers_nothing() {
    let dir = tempdir().expect("failed to create temp dir");
    let mut registry = TableRegistry::new();

    let result = registry.load_file(dir.path().join("missing.csv"), 0);

    assert!(matches!(result, Err(csvtable::TableError::Io(_))));
    assert!(registry.is_empty());
}
