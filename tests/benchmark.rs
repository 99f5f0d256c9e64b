//! Pattern benchmarks over catalog tasks and mock outputs.

use promptlab::core::benchmark::{BenchmarkRunner, BenchmarkTask};
use promptlab::core::categories::CategoryRegistry;
use promptlab::core::evaluator::Evaluator;
use promptlab::core::patterns::{PatternLibrary, PromptPattern};
use promptlab::core::template::Vars;

fn qa_task(patterns: &[&PromptPattern]) -> BenchmarkTask
{
    let reg = CategoryRegistry::with_builtins();
    let example = &reg.examples("qa").unwrap()[0];
    BenchmarkTask::from_example(example, patterns)
}

#[test]
fn test_from_example_binds_context_and_input()
{
    let lib = PatternLibrary::with_builtins();
    let rag = lib.get("rag").unwrap();
    let cot = lib.get("chain_of_thought").unwrap();

    let task = qa_task(&[rag, cot]);

    assert_eq!(task.name, "policy_qa");
    assert!(task.variables["rag"]["context"].starts_with("Our return policy"));
    assert_eq!(task.variables["rag"]["question"], "What is the return policy for electronics?");
    assert_eq!(task.variables["chain_of_thought"]["problem"], task.query);
    assert_eq!(task.expected_topics, vec!["return", "days", "receipt"]);
}

#[test]
fn test_context_variable_falls_back_to_input()
{
    let lib = PatternLibrary::with_builtins();
    let role = lib.get("role_play").unwrap();

    let reg = CategoryRegistry::with_builtins();
    let example = &reg.examples("generation").unwrap()[0];
    let task = BenchmarkTask::from_example(example, &[role]);

    assert_eq!(task.variables["role_play"]["context"], example.input_text);
}

#[test]
fn test_run_single_scores_mock_output()
{
    let lib = PatternLibrary::with_builtins();
    let rag = lib.get("rag").unwrap();
    let vars: Vars = [
        ("context".to_string(), "Electronics 30 days with receipt.".to_string()),
        ("question".to_string(), "What is the return window?".to_string()),
    ]
    .into_iter()
    .collect();
    let topics = vec!["return".to_string(), "receipt".to_string()];

    let r = BenchmarkRunner::default()
        .run_single(
            rag,
            "policy",
            &vars,
            "Electronics can be returned within 30 days with a receipt.",
            "Electronics 30 days with receipt.",
            "",
            &topics,
        )
        .unwrap();

    assert_eq!(r.pattern_name, "rag");
    assert!(r.rendered_prompt.contains("What is the return window?"));
    assert_eq!(r.evaluation.completeness, 1.0);
    assert!(r.evaluation.faithfulness > 0.0);
    assert!(r.latency_ms >= 0.0);
}

#[test]
fn test_run_single_missing_variable_fails()
{
    let lib = PatternLibrary::with_builtins();
    let rag = lib.get("rag").unwrap();

    let res = BenchmarkRunner::default().run_single(rag, "t", &Vars::new(), "out", "", "", &[]);
    assert!(res.is_err());
}

#[test]
fn test_comparison_prefers_better_mock_output()
{
    let lib = PatternLibrary::with_builtins();
    let rag = lib.get("rag").unwrap();
    let cot = lib.get("chain_of_thought").unwrap();

    let mut task = qa_task(&[rag, cot]);
    task.mock_outputs
        .insert("chain_of_thought".to_string(), "Bananas are yellow.".to_string());

    let report = BenchmarkRunner::new(Evaluator::new()).run_comparison(&[rag, cot], &[task]);

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.summary.keys().collect::<Vec<_>>(), ["rag", "chain_of_thought"]);
    assert_eq!(report.summary["rag"].num_tasks, 1);
    assert_eq!(report.best_pattern.as_deref(), Some("rag"));
    assert_eq!(report.best_overall, report.summary["rag"].avg_overall);
    assert!(report.summary["rag"].avg_overall > report.summary["chain_of_thought"].avg_overall);
}

#[test]
fn test_comparison_skips_unbound_and_failing_pairs()
{
    let lib = PatternLibrary::with_builtins();
    let rag = lib.get("rag").unwrap();
    let cot = lib.get("chain_of_thought").unwrap();
    let tool = lib.get("tool_use").unwrap();

    let mut task = qa_task(&[rag]);
    // tool_use needs `tools` and `task`; only one is bound
    task.variables.insert(
        "tool_use".to_string(),
        [("task".to_string(), "x".to_string())]
            .into_iter()
            .collect(),
    );

    let report = BenchmarkRunner::default().run_comparison(&[rag, cot, tool], &[task]);

    let patterns: Vec<&str> = report
        .results
        .iter()
        .map(|r| r.pattern_name.as_str())
        .collect();
    assert_eq!(patterns, ["rag"]);
}

#[test]
fn test_comparison_over_all_categories()
{
    let lib = PatternLibrary::with_builtins();
    let patterns = lib.list();
    let reg = CategoryRegistry::with_builtins();

    let tasks: Vec<BenchmarkTask> = reg
        .list()
        .iter()
        .flat_map(|c| c.examples.iter())
        .map(|e| BenchmarkTask::from_example(e, &patterns))
        .collect();

    let report = BenchmarkRunner::default().run_comparison(&patterns, &tasks);

    assert_eq!(report.results.len(), patterns.len() * tasks.len());
    assert_eq!(report.summary.len(), patterns.len());
    assert!(report.best_pattern.is_some());
    for s in report.summary.values()
    {
        assert_eq!(s.num_tasks, tasks.len());
        assert!((0.0..=1.0).contains(&s.avg_overall));
    }
}

#[test]
fn test_empty_comparison_has_no_winner()
{
    let report = BenchmarkRunner::default().run_comparison(&[], &[]);
    assert!(report.results.is_empty());
    assert_eq!(report.best_pattern, None);
    assert_eq!(report.best_overall, 0.0);
}
