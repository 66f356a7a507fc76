//! Built-in checks verified end to end against annotated fixtures, plus the
//! rule catalog.

use verity_analysis::checks::{builtin_catalog, RuleCatalog};
use verity_analysis::engine::{AnalysisContext, ActualFinding, RuleEngine, UnitBudget};
use verity_analysis::matcher::{match_findings, MatchOptions, MatchResult};
use verity_analysis::oracle::extract;
use verity_analysis::semantic::SemanticModel;
use verity_analysis::syntax::parse;
use verity_core::errors::ConfigError;
use verity_core::SourceFile;

// ---- Helpers ----

fn run(catalog: &RuleCatalog, rule_id: &str, options: &str, text: &str) -> Vec<ActualFinding> {
    let table: toml::Table = toml::from_str(options).unwrap();
    let rule = catalog.get(rule_id).unwrap().instantiate(&table).unwrap();
    let source = SourceFile::new(format!("{rule_id}.java"), text);
    let tree = parse(&source).unwrap();
    let model = SemanticModel::build(&tree, &source);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let mut engine = RuleEngine::new();
    engine.register(rule);
    let mut runs = engine.run(&ctx, &UnitBudget::unlimited()).unwrap();
    runs.remove(0).result.unwrap()
}

fn verify(rule_id: &str, options: &str, text: &str) -> MatchResult {
    let findings = run(&builtin_catalog(), rule_id, options, text);
    let oracle = extract(&SourceFile::new("Fixture.java", text)).unwrap();
    match_findings(&findings, &oracle, &MatchOptions::default())
}

fn assert_passes(rule_id: &str, options: &str, text: &str) {
    let result = verify(rule_id, options, text);
    assert!(
        result.is_pass(),
        "{rule_id} disagrees with its fixture:\n{}",
        result
            .discrepancies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

// ---- Checks ----

#[test]
fn assignment_in_condition() {
    assert_passes(
        "AssignmentInCondition",
        "",
        r#"class A {
  void f(int x, int y) {
    if (x = 1) { } // Noncompliant {{Add parentheses to make the operator precedence explicit.}}
    while ((y = next()) != 0) { }
    if ((x = 2)) { }
    for (; x = y; ) { } // Noncompliant [[sc=12;ec=17]]
    do { } while (y = 3); // Noncompliant
    boolean b = x == 1;
  }
}
"#,
    );
}

#[test]
fn method_too_long_with_configured_max() {
    assert_passes(
        "MethodTooLong",
        "max = 2",
        r#"class A {
  void shortOne() {
    a();
    b();
  }
  void longOne() { // Noncompliant [[sc=8;ec=15;effortToFix=1]] {{This method has 3 lines, which is greater than the 2 lines authorized.}}
    a();

    // comment only
    b();
    c();
  }
}
"#,
    );
}

#[test]
fn method_too_long_default_max_is_six() {
    let body: String = (0..7).map(|i| format!("    s{i}();\n")).collect();
    let text = format!("class A {{\n  A() {{\n{body}  }}\n}}\n");
    let findings = run(&builtin_catalog(), "MethodTooLong", "", &text);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, Some(2));
    assert!(findings[0].message.starts_with("This method has 7 lines"));
    assert_eq!(findings[0].cost, Some(1.0));
}

#[test]
fn unused_local_variable() {
    assert_passes(
        "UnusedLocalVariable",
        "",
        r#"class A {
  int field;
  void f(int p) {
    int used = 1;
    int unused = 2; // Noncompliant {{Remove this unused "unused" local variable.}}
    int written; // Noncompliant [[sc=9;ec=16]]
    written = 3;
    int counter = 0;
    counter += 1;
    System.out.println(used);
    for (int i = 0; i < 3; i++) { }
  }
}
"#,
    );
}

#[test]
fn string_reference_equality_abstains_on_unknown_types() {
    assert_passes(
        "StringReferenceEquality",
        "",
        r#"class A {
  void f(String a, String b, Widget w, Object o) {
    if (a == b) { } // Noncompliant {{Strings should be compared using "equals()".}}
    if (a != "x") { } // Noncompliant [[sc=9;ec=17]]
    if (a == w.name()) { }
    if (a == null) { }
    if (o == a) { }
    if (a.equals(b)) { }
  }
}
"#,
    );
}

#[test]
fn wrong_check_output_is_reported_as_discrepancies() {
    let result = verify(
        "AssignmentInCondition",
        "",
        "class A {\n  void f(int x) {\n    if (x == 1) { } // Noncompliant\n    if (x = 2) { }\n  }\n}\n",
    );
    let lines: Vec<u32> = result.discrepancies.iter().map(|d| d.line()).collect();
    assert_eq!(lines, vec![3, 4]);
}

// ---- Catalog ----

#[test]
fn builtin_catalog_lists_every_check() {
    let catalog = builtin_catalog();
    let ids: Vec<&str> = catalog.ids().collect();
    assert_eq!(
        ids,
        vec![
            "AssignmentInCondition",
            "MethodTooLong",
            "UnusedLocalVariable",
            "StringReferenceEquality"
        ]
    );
    assert_eq!(catalog.get("MethodTooLong").unwrap().options.len(), 1);
    assert!(!catalog.contains("Nope"));
}

#[test]
fn options_outside_the_schema_are_rejected() {
    let catalog = builtin_catalog();
    let descriptor = catalog.get("MethodTooLong").unwrap();

    let unknown: toml::Table = toml::from_str("limit = 3").unwrap();
    assert!(matches!(
        descriptor.instantiate(&unknown),
        Err(ConfigError::UnknownOption { ref key, .. }) if key == "limit"
    ));

    let mistyped: toml::Table = toml::from_str("max = \"ten\"").unwrap();
    assert!(matches!(
        descriptor.instantiate(&mistyped),
        Err(ConfigError::OptionType { ref key, .. }) if key == "max"
    ));
}
