//! Config loading, defaults, validation, variant overlays, and error codes.

use std::time::Duration;

use proptest::prelude::*;
use tempfile::TempDir;
use verity_core::config::{MessageMatch, SyntaxErrorPolicy};
use verity_core::errors::{error_code, ConfigError, InfraError, OracleError, SyntaxError};
use verity_core::{SourceFile, VerityConfig, VerityErrorCode};

// ---- Defaults ----

#[test]
fn empty_config_uses_defaults() {
    let config = VerityConfig::from_toml("").unwrap();
    assert_eq!(config.runner.effective_threads(), 0);
    assert_eq!(config.runner.effective_unit_timeout(), Duration::from_secs(10));
    assert_eq!(config.runner.effective_extension(), "java");
    assert_eq!(config.runner.effective_syntax_errors(), SyntaxErrorPolicy::Recover);
    assert_eq!(config.matcher.effective_message_match(), MessageMatch::Substring);
    assert!(!config.matcher.effective_ordered_secondaries());
    assert!(config.rule("Anything").effective_enabled());
    assert!(config.fixtures.is_empty());
}

#[test]
fn full_config_round_trips_every_section() {
    let config = VerityConfig::from_toml(
        r#"
[runner]
threads = 4
unit_timeout_ms = 250
fixture_roots = ["fixtures/java"]
syntax_errors = "fail"

[matcher]
message_match = "exact"
ordered_secondaries = true

[rules.MethodTooLong]
ordered_secondaries = false
options = { max = 10 }

[rules.MethodTooLong.variants.strict]
max = 3

[rules.UnusedLocalVariable]
enabled = false

[[fixtures]]
path = "extra/Clean.java"
rule = "UnusedLocalVariable"
expect_no_issues = true
"#,
    )
    .unwrap();

    assert_eq!(config.runner.effective_threads(), 4);
    assert_eq!(config.runner.effective_unit_timeout(), Duration::from_millis(250));
    assert_eq!(config.runner.effective_syntax_errors(), SyntaxErrorPolicy::Fail);
    assert_eq!(config.matcher.effective_message_match(), MessageMatch::Exact);
    assert_eq!(config.rule("MethodTooLong").ordered_secondaries, Some(false));
    assert!(!config.rule("UnusedLocalVariable").effective_enabled());
    assert_eq!(config.fixtures.len(), 1);
    assert!(config.fixtures[0].expect_no_issues);
    assert_eq!(config.fixtures[0].variant, None);
}

// ---- Variants ----

#[test]
fn variant_tables_overlay_base_options() {
    let config = VerityConfig::from_toml(
        "[rules.MethodTooLong]\noptions = { max = 10, countComments = true }\n[rules.MethodTooLong.variants.strict]\nmax = 3\n",
    )
    .unwrap();
    let rule = config.rule("MethodTooLong");

    let base = rule.options_for_variant("MethodTooLong", None).unwrap();
    assert_eq!(base.get("max").and_then(|v| v.as_integer()), Some(10));

    let default = rule.options_for_variant("MethodTooLong", Some("default")).unwrap();
    assert_eq!(default, base);

    let strict = rule.options_for_variant("MethodTooLong", Some("strict")).unwrap();
    assert_eq!(strict.get("max").and_then(|v| v.as_integer()), Some(3));
    assert_eq!(strict.get("countComments").and_then(|v| v.as_bool()), Some(true));

    assert!(matches!(
        rule.options_for_variant("MethodTooLong", Some("lenient")),
        Err(ConfigError::UnknownVariant { .. })
    ));
}

// ---- Validation ----

#[test]
fn invalid_values_are_rejected() {
    for (text, field) in [
        ("[runner]\nunit_timeout_ms = 0\n", "runner.unit_timeout_ms"),
        ("[runner]\nextension = \".java\"\n", "runner.extension"),
        ("[[fixtures]]\npath = \"A.java\"\nrule = \" \"\n", "fixtures.rule"),
        (
            "[[fixtures]]\npath = \"A.java\"\nrule = \"R\"\nexpect_no_issues = true\nexpect_file_issue = \"m\"\n",
            "fixtures.expect_file_issue",
        ),
    ] {
        match VerityConfig::from_toml(text) {
            Err(ConfigError::InvalidValue { field: got, .. }) => assert_eq!(got, field),
            other => panic!("expected InvalidValue for {field}, got {other:?}"),
        }
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let err = VerityConfig::from_toml("[runner\nthreads = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert_eq!(err.error_code(), error_code::CONFIG_INVALID);
}

#[test]
fn load_reads_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("verity.toml");
    std::fs::write(&path, "[runner]\nthreads = 2\n").unwrap();
    assert_eq!(VerityConfig::load(&path).unwrap().runner.effective_threads(), 2);

    let missing = VerityConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));
    assert_eq!(missing.error_code(), error_code::IO_ERROR);
}

// ---- Errors ----

#[test]
fn layer_errors_fold_into_infra_errors_with_stable_codes() {
    let oracle: InfraError = OracleError::InvalidCount {
        line: 3,
        value: "0".to_string(),
    }
    .into();
    assert_eq!(oracle.error_code(), error_code::ORACLE_MALFORMED);
    assert!(oracle.to_string().contains("line 3"));

    let syntax: InfraError = SyntaxError::Rejected {
        file: "A.java".to_string(),
        line: 2,
        column: 5,
    }
    .into();
    assert_eq!(syntax.error_code(), error_code::SYNTAX_UNRECOVERABLE);
    assert!(syntax.to_string().contains("A.java:2:5"));

    let config: InfraError = ConfigError::UnknownRule {
        rule: "Nope".to_string(),
    }
    .into();
    assert_eq!(config.error_code(), error_code::CONFIG_INVALID);

    assert_eq!(InfraError::Timeout { timeout_ms: 5 }.error_code(), error_code::UNIT_TIMEOUT);
    assert_eq!(
        InfraError::Crashed {
            message: "stack".to_string()
        }
        .error_code(),
        error_code::UNIT_CRASHED
    );
    assert_eq!(
        OracleError::InvalidFlow {
            id: "f".to_string(),
            reason: "x".to_string()
        }
        .error_code(),
        error_code::ORACLE_FLOW
    );
}

// ---- Source positions ----

proptest! {
    /// Every character's position maps back to its byte offset.
    #[test]
    fn positions_invert_to_offsets(lines in proptest::collection::vec("[a-zé ]{0,12}", 1..8)) {
        let text = lines.join("\n");
        let source = SourceFile::new("P.java", text.clone());
        prop_assert_eq!(source.line_count() as usize, lines.len());
        for (offset, _) in text.char_indices() {
            let pos = source.position_of(offset);
            prop_assert_eq!(source.offset_of(pos), Some(offset));
        }
    }
}
