//! Reference checks used to exercise the engine, and the catalog that names them.

pub mod assignment_in_condition;
pub mod method_too_long;
pub mod registry;
pub mod string_reference_equality;
pub mod unused_local_variable;

pub use assignment_in_condition::AssignmentInCondition;
pub use method_too_long::MethodTooLong;
pub use registry::{RuleCatalog, RuleDescriptor, RuleFactory};
pub use string_reference_equality::StringReferenceEquality;
pub use unused_local_variable::UnusedLocalVariable;

/// Catalog holding every built-in check.
pub fn builtin_catalog() -> RuleCatalog {
    let mut catalog = RuleCatalog::new();
    catalog.register(RuleDescriptor::new(
        assignment_in_condition::ID,
        AssignmentInCondition::create,
    ));
    catalog.register(
        RuleDescriptor::new(method_too_long::ID, MethodTooLong::create)
            .with_options(method_too_long::OPTIONS),
    );
    catalog.register(RuleDescriptor::new(
        unused_local_variable::ID,
        UnusedLocalVariable::create,
    ));
    catalog.register(RuleDescriptor::new(
        string_reference_equality::ID,
        StringReferenceEquality::create,
    ));
    catalog
}
