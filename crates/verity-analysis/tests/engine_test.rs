//! Rule engine tests: kind-indexed dispatch order, panic isolation, budgets,
//! and the finding collector contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use verity_analysis::engine::{
    AnalysisContext, FindingCollector, Rule, RuleEngine, RunCancellation, Target, UnitBudget,
};
use verity_analysis::semantic::SemanticModel;
use verity_analysis::syntax::{parse, SyntaxKind, SyntaxTree};
use verity_core::{InfraError, NodeId, SourceFile, TextRange};

// ---- Helpers ----

type Log = Arc<Mutex<Vec<String>>>;

fn fixture(text: &str) -> (SourceFile, SyntaxTree, SemanticModel) {
    verity_core::tracing::init_tracing_with_default("warn");
    let source = SourceFile::new("Fixture.java", text);
    let tree = parse(&source).unwrap();
    let model = SemanticModel::build(&tree, &source);
    (source, tree, model)
}

/// Records every hook call as `<name>:<event>:<kind>@<line>`.
struct Recorder {
    name: &'static str,
    kinds: &'static [SyntaxKind],
    log: Log,
}

impl Recorder {
    fn boxed(name: &'static str, kinds: &'static [SyntaxKind], log: &Log) -> Box<dyn Rule> {
        Box::new(Self {
            name,
            kinds,
            log: Arc::clone(log),
        })
    }

    fn push(&self, event: &str, node: Option<NodeId>, ctx: &AnalysisContext<'_>) {
        let entry = match node {
            Some(id) => format!(
                "{}:{event}:{:?}@{}",
                self.name,
                ctx.kind(id),
                ctx.tree.range(id).start.line
            ),
            None => format!("{}:{event}", self.name),
        };
        self.log.lock().unwrap().push(entry);
    }
}

impl Rule for Recorder {
    fn id(&self) -> &str {
        self.name
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        self.kinds
    }

    fn scan_file(&mut self, ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {
        self.push("scan", None, ctx);
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {
        self.push("enter", Some(node), ctx);
    }

    fn leave_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {
        self.push("leave", Some(node), ctx);
    }

    fn leave_file(&mut self, ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {
        self.push("done", None, ctx);
    }
}

/// Reports every method name.
struct MethodNames;

impl Rule for MethodNames {
    fn id(&self) -> &str {
        "MethodNames"
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        &[SyntaxKind::MethodDeclaration]
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        if let Some(name) = ctx.tree.child_by_field(node, "name") {
            out.report(name, format!("method {}", ctx.text(name)));
        }
    }
}

/// Panics on the second method it sees.
struct Exploding {
    seen: usize,
}

impl Rule for Exploding {
    fn id(&self) -> &str {
        "Exploding"
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        &[SyntaxKind::MethodDeclaration]
    }

    fn visit_node(&mut self, node: NodeId, _ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        self.seen += 1;
        out.report(node, "seen");
        if self.seen == 2 {
            panic!("boom on method {}", self.seen);
        }
    }
}

/// Sleeps on every node.
struct Slow;

impl Rule for Slow {
    fn id(&self) -> &str {
        "Slow"
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        &[]
    }

    fn visit_node(&mut self, _node: NodeId, _ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {
        std::thread::sleep(Duration::from_millis(5));
    }
}

const TWO_METHODS: &str = "class A {\n  void f() {\n    if (a) { }\n  }\n  void g() { }\n}\n";

// ---- Dispatch ----

#[test]
fn dispatch_is_pre_order_with_matching_leave_calls() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let log: Log = Arc::default();

    let mut engine = RuleEngine::new();
    engine.register(Recorder::boxed(
        "r",
        &[SyntaxKind::MethodDeclaration, SyntaxKind::IfStatement],
        &log,
    ));
    engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            "r:scan",
            "r:enter:MethodDeclaration@2",
            "r:enter:IfStatement@3",
            "r:leave:IfStatement@3",
            "r:leave:MethodDeclaration@2",
            "r:enter:MethodDeclaration@5",
            "r:leave:MethodDeclaration@5",
            "r:done",
        ]
    );
}

#[test]
fn rules_on_the_same_node_run_in_registration_order() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let log: Log = Arc::default();

    let mut engine = RuleEngine::new();
    engine.register(Recorder::boxed("a", &[SyntaxKind::IfStatement], &log));
    engine.register(Recorder::boxed("b", &[SyntaxKind::IfStatement], &log));
    assert_eq!(engine.rule_ids(), vec!["a", "b"]);
    engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    let enters: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.contains(":enter:"))
        .cloned()
        .collect();
    assert_eq!(enters, vec!["a:enter:IfStatement@3", "b:enter:IfStatement@3"]);
}

#[test]
fn wildcard_rule_sees_every_node() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let log: Log = Arc::default();

    let mut engine = RuleEngine::new();
    engine.register(Recorder::boxed("w", &[], &log));
    engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    let enters = log.lock().unwrap().iter().filter(|e| e.contains(":enter:")).count();
    assert_eq!(enters, tree.len());
}

#[test]
fn wildcard_and_subscribed_rules_share_registration_order() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let log: Log = Arc::default();

    let mut engine = RuleEngine::new();
    engine.register(Recorder::boxed("k1", &[SyntaxKind::IfStatement], &log));
    engine.register(Recorder::boxed("w", &[], &log));
    engine.register(Recorder::boxed("k2", &[SyntaxKind::IfStatement], &log));
    engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    let on_if: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.contains("IfStatement"))
        .cloned()
        .collect();
    assert_eq!(
        on_if,
        vec![
            "k1:enter:IfStatement@3",
            "w:enter:IfStatement@3",
            "k2:enter:IfStatement@3",
            "k1:leave:IfStatement@3",
            "w:leave:IfStatement@3",
            "k2:leave:IfStatement@3",
        ]
    );
}

// ---- Findings ----

#[test]
fn findings_keep_emission_order_and_node_ranges() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);

    let mut engine = RuleEngine::new();
    engine.register(Box::new(MethodNames));
    let runs = engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    assert_eq!(runs.len(), 1);
    let findings = runs[0].findings();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].rule_id, "MethodNames");
    assert_eq!(findings[0].message, "method f");
    assert_eq!(findings[0].line, Some(2));
    assert_eq!(findings[0].range, Some(TextRange::on_line(2, 8, 9)));
    assert_eq!(findings[1].message, "method g");
    assert_eq!(findings[1].line, Some(5));
}

#[test]
fn issue_builder_records_secondaries_flows_and_cost() {
    let (_source, tree, _model) = fixture(TWO_METHODS);
    let mut out = FindingCollector::new("Builder", &tree);
    out.issue(TextRange::on_line(3, 5, 7), "primary")
        .secondary(TextRange::on_line(2, 3, 7), Some("why".to_string()))
        .flow([(TextRange::on_line(2, 3, 4), None), (TextRange::on_line(3, 5, 6), Some("then".to_string()))])
        .cost(2.0)
        .emit();
    out.report_with_secondaries(TextRange::on_line(5, 3, 7), "second", [(TextRange::on_line(2, 3, 7), None)]);

    let findings = out.into_findings();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].rule_id, "Builder");
    assert_eq!(findings[0].secondaries[0].line, 2);
    assert_eq!(findings[0].secondaries[0].message.as_deref(), Some("why"));
    assert_eq!(findings[0].flows.len(), 1);
    assert_eq!(findings[0].flows[0][1].message.as_deref(), Some("then"));
    assert_eq!(findings[0].cost, Some(2.0));
    assert_eq!(findings[1].secondaries.len(), 1);
}

#[test]
fn file_target_has_no_line_and_is_dropped_as_a_secondary() {
    let (_source, tree, _model) = fixture(TWO_METHODS);
    let mut out = FindingCollector::new("Header", &tree);
    out.report_on_file("Add a license header");
    out.issue(TextRange::on_line(2, 3, 7), "with a file secondary")
        .secondary(Target::File, Some("ignored".to_string()))
        .emit();

    let findings = out.into_findings();
    assert_eq!(findings[0].line, None);
    assert_eq!(findings[0].range, None);
    assert!(findings[0].is_file_level());
    assert_eq!(findings[1].line, Some(2));
    assert!(findings[1].secondaries.is_empty());
}

// ---- Failure isolation ----

#[test]
fn panicking_rule_fails_alone() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);

    let mut engine = RuleEngine::new();
    engine.register(Box::new(Exploding { seen: 0 }));
    engine.register(Box::new(MethodNames));
    let runs = engine.run(&ctx, &UnitBudget::unlimited()).unwrap();

    match &runs[0].result {
        Err(InfraError::RuleFailure { rule_id, message }) => {
            assert_eq!(rule_id, "Exploding");
            assert!(message.contains("boom on method 2"), "{message}");
        }
        other => panic!("expected a rule failure, got {other:?}"),
    }
    assert!(runs[0].findings().is_empty());
    assert_eq!(runs[1].findings().len(), 2);
}

#[test]
fn deadline_stops_the_traversal() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);

    let mut engine = RuleEngine::new();
    engine.register(Box::new(Slow));
    let budget = UnitBudget::new(Duration::from_millis(1), RunCancellation::new());
    let err = engine.run(&ctx, &budget).unwrap_err();
    assert_eq!(err, InfraError::Timeout { timeout_ms: 1 });
}

#[test]
fn cancelled_run_stops_before_dispatch() {
    let (source, tree, model) = fixture(TWO_METHODS);
    let ctx = AnalysisContext::new(&source, &tree, &model);
    let log: Log = Arc::default();

    let mut engine = RuleEngine::new();
    engine.register(Recorder::boxed("r", &[SyntaxKind::MethodDeclaration], &log));
    let cancellation = RunCancellation::new();
    cancellation.cancel();
    let budget = UnitBudget::new(Duration::from_secs(60), cancellation);

    assert_eq!(engine.run(&ctx, &budget).unwrap_err(), InfraError::Cancelled);
    assert!(!log.lock().unwrap().iter().any(|e| e.contains(":enter:")));
}
