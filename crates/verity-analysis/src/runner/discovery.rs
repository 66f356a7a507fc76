//! Fixture discovery: filename conventions under the fixture roots, plus
//! explicit `[[fixtures]]` bindings.

use std::path::{Path, PathBuf};

use crossbeam_channel as channel;
use serde::{Deserialize, Serialize};
use verity_core::config::VerityConfig;
use verity_core::errors::{ConfigError, RunnerError};

use crate::checks::RuleCatalog;
use crate::engine::RunCancellation;

/// One (fixture, rule) pair to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureUnit {
    pub fixture: PathBuf,
    pub rule_id: String,
    pub variant: Option<String>,
    /// Bound with `expect_no_issues`: no markers allowed, no findings expected.
    pub expect_no_issues: bool,
    /// Bound with `expect_file_issue`: no markers allowed, one file-level
    /// finding with this message expected.
    pub expect_file_issue: Option<String>,
}

impl FixtureUnit {
    pub fn new(fixture: impl Into<PathBuf>, rule_id: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            rule_id: rule_id.into(),
            variant: None,
            expect_no_issues: false,
            expect_file_issue: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn fixture_name(&self) -> String {
        self.fixture.display().to_string()
    }
}

/// Rule and variant named by a fixture's file stem.
///
/// `<RuleId>`, `<RuleId>Sample` and `<RuleId>_<variant>` bind; anything else
/// does not. The longest matching rule id wins.
pub fn bind_by_name(stem: &str, catalog: &RuleCatalog) -> Option<(&'static str, Option<String>)> {
    let mut ids: Vec<&'static str> = catalog.ids().filter(|id| stem.starts_with(id)).collect();
    ids.sort_by_key(|id| std::cmp::Reverse(id.len()));
    ids.into_iter().find_map(|id| {
        let rest = &stem[id.len()..];
        match rest {
            "" | "Sample" => Some((id, None)),
            _ => rest
                .strip_prefix('_')
                .filter(|variant| !variant.is_empty())
                .map(|variant| (id, Some(variant.to_string()))),
        }
    })
}

/// Every unit of the run, in a stable order: filename-bound fixtures sorted by
/// path, then explicit bindings in config order. An explicit binding for a
/// fixture already bound by name replaces that unit in place.
///
/// The walkers watch `cancellation`; a cancelled discovery returns
/// `RunnerError::Cancelled` instead of a partial list.
pub fn discover_units(
    config: &VerityConfig,
    catalog: &RuleCatalog,
    cancellation: &RunCancellation,
) -> Result<Vec<FixtureUnit>, RunnerError> {
    let extension = config.runner.effective_extension();
    let mut units = Vec::new();

    for root in &config.runner.fixture_roots {
        for path in walk_fixtures(root, extension, cancellation)? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match bind_by_name(stem, catalog) {
                Some((rule_id, variant)) => {
                    if !config.rule(rule_id).effective_enabled() {
                        tracing::debug!(fixture = %path.display(), rule_id, "rule disabled, skipping");
                        continue;
                    }
                    units.push(FixtureUnit {
                        fixture: path,
                        rule_id: rule_id.to_string(),
                        variant,
                        expect_no_issues: false,
                        expect_file_issue: None,
                    });
                }
                None => {
                    tracing::debug!(fixture = %path.display(), "no rule bound by file name");
                }
            }
        }
    }

    for binding in &config.fixtures {
        if !catalog.contains(&binding.rule) {
            return Err(ConfigError::UnknownRule {
                rule: binding.rule.clone(),
            }
            .into());
        }
        let unit = FixtureUnit {
            fixture: binding.path.clone(),
            rule_id: binding.rule.clone(),
            variant: binding.variant.clone(),
            expect_no_issues: binding.expect_no_issues,
            expect_file_issue: binding.expect_file_issue.clone(),
        };
        let existing = units.iter_mut().find(|u| {
            u.rule_id == unit.rule_id
                && u.variant == unit.variant
                && same_file(&u.fixture, &unit.fixture)
        });
        match existing {
            Some(slot) => *slot = unit,
            None => units.push(unit),
        }
    }

    tracing::debug!(units = units.len(), "fixture discovery complete");
    Ok(units)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Files under `root` with the fixture extension, sorted by path.
fn walk_fixtures(
    root: &Path,
    extension: &str,
    cancellation: &RunCancellation,
) -> Result<Vec<PathBuf>, RunnerError> {
    if cancellation.is_cancelled() {
        return Err(RunnerError::Cancelled);
    }
    if !root.is_dir() {
        return Err(RunnerError::Discovery {
            root: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let (tx, rx) = channel::unbounded();
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .follow_links(false);
    let walker = builder.build_parallel();

    let extension = extension.to_string();

    walker.run(|| {
        let tx = tx.clone();
        let cancellation = cancellation.clone();
        let extension = extension.clone();
        Box::new(move |entry| {
            if cancellation.is_cancelled() {
                return ignore::WalkState::Quit;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    return ignore::WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension.as_str()) {
                let _ = tx.send(path.to_path_buf());
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    if cancellation.is_cancelled() {
        return Err(RunnerError::Cancelled);
    }
    let mut files: Vec<PathBuf> = rx.into_iter().collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::builtin_catalog;

    #[test]
    fn binds_plain_sample_and_variant_names() {
        let catalog = builtin_catalog();
        assert_eq!(
            bind_by_name("MethodTooLong", &catalog),
            Some(("MethodTooLong", None))
        );
        assert_eq!(
            bind_by_name("MethodTooLongSample", &catalog),
            Some(("MethodTooLong", None))
        );
        assert_eq!(
            bind_by_name("MethodTooLong_strict", &catalog),
            Some(("MethodTooLong", Some("strict".to_string())))
        );
    }

    #[test]
    fn unrelated_names_do_not_bind() {
        let catalog = builtin_catalog();
        assert_eq!(bind_by_name("MethodTooLongish", &catalog), None);
        assert_eq!(bind_by_name("MethodTooLong_", &catalog), None);
        assert_eq!(bind_by_name("Helper", &catalog), None);
    }
}
