//! Fixture runner: binds fixtures to rules and verifies each unit in parallel.

pub mod discovery;
pub mod report;
pub mod runner;
pub mod unit;

pub use discovery::{bind_by_name, discover_units, FixtureUnit};
pub use report::{RunReport, RunTotals};
pub use runner::TestRunner;
pub use unit::run_unit;
