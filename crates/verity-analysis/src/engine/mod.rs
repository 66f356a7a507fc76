//! Rule engine: rule trait, option schemas, kind-indexed dispatch, and the
//! rule-scoped finding collector.

pub mod cancellation;
pub mod collector;
pub mod options;
pub mod rule;
pub mod types;
pub mod visitor;

pub use cancellation::{RunCancellation, UnitBudget};
pub use collector::{FindingCollector, IssueBuilder, Target};
pub use options::{OptionSpec, OptionValue, RuleOptions};
pub use rule::{AnalysisContext, Rule};
pub use types::{ActualFinding, Location, RuleRun};
pub use visitor::RuleEngine;
