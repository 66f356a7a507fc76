//! Oracle extraction tests: marker placement, shifts, counts, attributes,
//! false-negative notes, literal skipping, and flows.

use proptest::prelude::*;
use verity_analysis::oracle::{extract, scan_comments, RawCommentStyle};
use verity_core::errors::OracleError;
use verity_core::SourceFile;

// ---- Helpers ----

fn oracle_of(text: &str) -> verity_analysis::oracle::Oracle {
    extract(&SourceFile::new("Fixture.java", text)).unwrap()
}

fn error_of(text: &str) -> OracleError {
    extract(&SourceFile::new("Fixture.java", text)).unwrap_err()
}

// ---- Markers ----

#[test]
fn inline_marker_targets_its_own_line() {
    let oracle = oracle_of(
        "class A {\n  void f() {\n    if (x = 1) { } // Noncompliant {{Add parentheses to make the operator precedence explicit.}}\n  }\n}\n",
    );
    let expected = oracle.expectations_on(3);
    assert_eq!(expected.len(), 1);
    assert_eq!(expected[0].comment_line, 3);
    assert_eq!(expected[0].count, 1);
    assert!(!expected[0].explicit_count);
    assert_eq!(
        expected[0].message.as_deref(),
        Some("Add parentheses to make the operator precedence explicit.")
    );
    assert_eq!(oracle.expected_issue_count(), 1);
}

#[test]
fn relative_and_absolute_shifts() {
    let oracle = oracle_of(
        "class A {\n  // Noncompliant@+1\n  int a;\n  int b;\n  // Noncompliant@-1\n  // Noncompliant@1\n}\n",
    );
    let lines: Vec<u32> = oracle.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 3, 4]);
    let shifted = &oracle.expectations_on(3)[0];
    assert_eq!(shifted.comment_line, 2);
    assert_eq!(shifted.line_offset, 1);
}

#[test]
fn shift_outside_the_file_is_an_error() {
    assert!(matches!(
        error_of("class A {} // Noncompliant@-1\n"),
        OracleError::ShiftOutOfRange { line: 1, target: 0 }
    ));
    assert!(matches!(
        error_of("class A {}\n// Noncompliant@+5\n"),
        OracleError::ShiftOutOfRange { line: 2, target: 7 }
    ));
}

#[test]
fn huge_shift_is_out_of_range_not_an_overflow() {
    assert!(matches!(
        error_of("class A {} // Noncompliant@+9223372036854775807\n"),
        OracleError::ShiftOutOfRange { line: 1, target: i64::MAX }
    ));
    assert!(matches!(
        error_of("class A {} // Noncompliant [[el=+9223372036854775807]]\n"),
        OracleError::InvalidValue { ref name, .. } if name == "el"
    ));
    assert!(matches!(
        error_of("class A {} // Noncompliant [[secondary=+9223372036854775807]]\n"),
        OracleError::InvalidValue { ref name, .. } if name == "secondary"
    ));
}

#[test]
fn oversized_count_is_rejected() {
    assert!(matches!(
        error_of("class A {} // Noncompliant 3000000000\n"),
        OracleError::InvalidCount { line: 1, .. }
    ));
}

#[test]
fn explicit_count_expands_to_that_many_issues() {
    let oracle = oracle_of("class A { int a, b; } // Noncompliant 2\n");
    let expected = &oracle.expectations_on(1)[0];
    assert_eq!(expected.count, 2);
    assert!(expected.explicit_count);
    assert_eq!(oracle.expected_issue_count(), 2);
}

#[test]
fn columns_and_end_line() {
    let oracle = oracle_of(
        "class A {\n  void f() { // Noncompliant [[sc=8;ec=9;el=+2]]\n  }\n}\n",
    );
    let expected = &oracle.expectations_on(2)[0];
    assert_eq!(expected.start_column, Some(8));
    assert_eq!(expected.end_column, Some(9));
    assert_eq!(expected.end_line, Some(4));
}

#[test]
fn end_column_before_start_column_is_an_error() {
    assert!(matches!(
        error_of("class A {} // Noncompliant [[sc=9;ec=3]]\n"),
        OracleError::InvalidValue { ref name, .. } if name == "ec"
    ));
}

#[test]
fn secondary_lines_resolve_against_the_comment_line() {
    let oracle = oracle_of(
        "class A {\n  int a;\n  int b; // Noncompliant [[secondary=-1,+1,1]]\n  int c;\n}\n",
    );
    assert_eq!(oracle.expectations_on(3)[0].secondary, Some(vec![2, 4, 1]));
}

#[test]
fn effort_to_fix_is_read() {
    let oracle = oracle_of("class A {} // Noncompliant [[effortToFix=2.5]]\n");
    assert_eq!(oracle.expectations_on(1)[0].effort_to_fix, Some(2.5));
}

#[test]
fn false_negative_notes_create_no_expectation() {
    let oracle = oracle_of(
        "class A {\n  int a; // False Negative: // Noncompliant\n  int b; // false negative // Noncompliant {{x}}\n}\n",
    );
    assert!(oracle.is_empty());
}

#[test]
fn markers_inside_literals_and_block_comments_are_ignored() {
    let oracle = oracle_of(
        "class A {\n  String s = \"// Noncompliant\";\n  /* // Noncompliant */\n  char c = '/';\n  String t = \"\"\"\n    // Noncompliant\n    \"\"\";\n}\n",
    );
    assert!(oracle.is_empty());
}

#[test]
fn marker_without_whitespace_is_not_a_marker() {
    assert!(oracle_of("class A {} //Noncompliant\n").is_empty());
}

#[test]
fn malformed_marker_rejects_the_whole_oracle() {
    let text = "class A {\n  int a; // Noncompliant\n  int b; // Noncompliant [[sc=1\n}\n";
    assert!(matches!(
        error_of(text),
        OracleError::Unterminated { line: 3, delimiter: "[[" }
    ));
}

// ---- Flows ----

#[test]
fn flows_run_backwards_from_the_issue_without_explicit_order() {
    let oracle = oracle_of(
        "class A {\n  void f(String s) {\n    String t = s; // flow@f1 {{assigned}}\n    t.length(); // Noncompliant [[flows=f1]] flow@f1 {{used}}\n  }\n}\n",
    );
    let steps = &oracle.flows["f1"];
    let lines: Vec<u32> = steps.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![4, 3]);
    assert_eq!(steps[0].message.as_deref(), Some("used"));
    assert_eq!(steps[1].message.as_deref(), Some("assigned"));
    assert_eq!(oracle.expectations_on(4)[0].flows, vec!["f1".to_string()]);
}

#[test]
fn explicit_flow_order_is_descending() {
    let oracle = oracle_of(
        "class A {\n  int a; // flow@f [[order=2]]\n  int b; // flow@f [[order=1]]\n  int c; // Noncompliant [[flows=f]]\n}\n",
    );
    let lines: Vec<u32> = oracle.flows["f"].iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 3]);
}

#[test]
fn flow_order_errors() {
    assert!(matches!(
        error_of("class A {\n  int a; // flow@f [[order=1]]\n  int b; // flow@f\n}\n"),
        OracleError::InvalidFlow { .. }
    ));
    assert!(matches!(
        error_of("class A {\n  int a; // flow@f [[order=1]]\n  int b; // flow@f [[order=1]]\n}\n"),
        OracleError::InvalidFlow { .. }
    ));
}

#[test]
fn undeclared_flow_reference_is_an_error() {
    assert!(matches!(
        error_of("class A {} // Noncompliant [[flows=ghost]]\n"),
        OracleError::InvalidFlow { ref id, .. } if id == "ghost"
    ));
}

// ---- Lexer ----

#[test]
fn comment_scanner_reports_styles_and_offsets() {
    let text = "int a; // one\n/* two */ String s = \"/* no */\";";
    let comments = scan_comments(text);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].style, RawCommentStyle::Line);
    assert_eq!(comments[0].text, "// one");
    assert_eq!(comments[0].start_byte, 7);
    assert_eq!(comments[1].style, RawCommentStyle::Block);
    assert_eq!(comments[1].text, "/* two */");
}

// ---- Properties ----

proptest! {
    /// A marker shifted by `k` on line `n` always lands on line `n + k`.
    #[test]
    fn relative_shift_lands_on_anchor_plus_offset(total in 3u32..40, n_seed in 0u32..1000, k_seed in 0u32..1000) {
        let n = 1 + n_seed % total;
        let target = 1 + k_seed % total;
        let k = target as i64 - n as i64;
        let mut lines: Vec<String> = (0..total).map(|i| format!("int v{i};")).collect();
        let shift = if k >= 0 { format!("@+{k}") } else { format!("@{k}") };
        lines[(n - 1) as usize] = format!("int v; // Noncompliant{shift}");
        let text = lines.join("\n");

        let oracle = extract(&SourceFile::new("P.java", text)).unwrap();
        let expected: Vec<_> = oracle.iter().collect();
        prop_assert_eq!(expected.len(), 1);
        prop_assert_eq!(expected[0].line, target);
        prop_assert_eq!(expected[0].comment_line, n);
        prop_assert_eq!(expected[0].line_offset, k);
    }

    /// Extraction is a pure function of the text.
    #[test]
    fn extraction_is_deterministic(count in 1u32..5, sc in 1u32..20, width in 0u32..10) {
        let text = format!(
            "class A {{\n  int a; // Noncompliant {count} [[sc={sc};ec={}]] {{{{msg}}}}\n}}\n",
            sc + width
        );
        let source = SourceFile::new("P.java", text);
        let first = extract(&source).unwrap();
        let second = extract(&source).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.expected_issue_count(), count as usize);
    }
}
