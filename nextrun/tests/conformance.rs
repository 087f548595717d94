//! Conformance runner: drives the cases in conformance/cases.json.
//!
//! build.rs emits one `#[test]` per case that calls the runner for its
//! section with the case index.

use jiff::Timestamp;
use nextrun::{CronScheduler, ScheduleKind, ScheduleResolver, SyntaxValidator};
use serde_json::Value;

static CASES: &str = include_str!("../conformance/cases.json");

fn cases() -> Value {
    serde_json::from_str(CASES).expect("conformance/cases.json is invalid JSON")
}

fn load(section: &str, index: usize) -> (Value, Value) {
    let root = cases();
    let case = root[section]["tests"][index].clone();
    assert!(!case.is_null(), "{section}[{index}] missing");
    (root, case)
}

fn parse_ts(s: &str) -> Timestamp {
    s.parse()
        .unwrap_or_else(|e| panic!("bad timestamp '{s}': {e}"))
}

/// The case's `from`, falling back to the top-level reference instant.
fn reference(root: &Value, case: &Value) -> Timestamp {
    let raw = case["from"]
        .as_str()
        .or_else(|| root["reference"].as_str())
        .expect("top-level 'reference' missing");
    parse_ts(raw)
}

fn expected_list(case: &Value) -> Vec<Option<Timestamp>> {
    case["expected"]
        .as_array()
        .expect("case missing 'expected' array")
        .iter()
        .map(|v| v.as_str().map(parse_ts))
        .collect()
}

fn scheduler(root: &Value, case: &Value) -> CronScheduler {
    let expr = case["expression"].as_str().unwrap();
    let cron = CronScheduler::new(expr, reference(root, case));
    assert!(cron.is_valid(), "'{expr}' should be valid");
    cron
}

fn run_validate(index: usize) {
    let (_, case) = load("validate", index);
    let input = case["input"].as_str().unwrap();
    let validator = SyntaxValidator::new(input);
    let valid = case["valid"].as_bool().unwrap();
    assert_eq!(validator.is_valid(), valid, "validity of '{input}'");
    if valid {
        assert!(validator.error().is_none(), "'{input}': {:?}", validator.error());
    } else {
        assert!(validator.error().is_some(), "'{input}' should report an error");
    }
    if let Some(canonical) = case["canonical"].as_str() {
        assert_eq!(validator.to_string(), canonical, "display of '{input}'");
        let reparsed = SyntaxValidator::new(canonical);
        assert_eq!(reparsed.to_string(), canonical, "re-display of '{canonical}'");
    }
}

fn run_next(index: usize) {
    let (root, case) = load("next", index);
    let mut cron = scheduler(&root, &case);
    for (i, expected) in expected_list(&case).into_iter().enumerate() {
        let got = cron.next().unwrap();
        assert_eq!(Some(got), expected, "next #{i}");
    }
}

fn run_prev(index: usize) {
    let (root, case) = load("prev", index);
    let mut cron = scheduler(&root, &case);
    if let Some(current) = case["current"].as_str() {
        assert_eq!(cron.current().unwrap(), parse_ts(current), "current");
    }
    for (i, expected) in expected_list(&case).into_iter().enumerate() {
        let got = cron.prev().unwrap();
        assert_eq!(Some(got), expected, "prev #{i}");
    }
}

fn run_infeasible(index: usize) {
    let (root, case) = load("infeasible", index);
    let expr = case["expression"].as_str().unwrap();
    let mut cron = CronScheduler::new(expr, reference(&root, &case));
    assert!(cron.validator().is_valid(), "'{expr}' should parse");
    assert!(!cron.is_valid(), "'{expr}' should be infeasible");
    assert!(cron.next().unwrap_err().is_misuse());
}

fn run_matches(index: usize) {
    let (root, case) = load("matches", index);
    let expr = case["expression"].as_str().unwrap();
    let cron = CronScheduler::new(expr, reference(&root, &case));
    let instant = parse_ts(case["datetime"].as_str().unwrap());
    let expected = case["expected"].as_bool().unwrap();
    assert_eq!(cron.matches(instant), expected, "'{expr}' at {instant}");
}

fn run_resolver(index: usize) {
    let (root, case) = load("resolver", index);
    let schedule = case["schedule"].as_str().unwrap();
    let mut resolver = ScheduleResolver::new(schedule, reference(&root, &case));
    assert_eq!(
        resolver.is_repeatable(),
        case["repeatable"].as_bool().unwrap(),
        "repeatable"
    );
    let kind = match resolver.kind() {
        ScheduleKind::Now => "now",
        ScheduleKind::Exact => "exact",
        ScheduleKind::Cron => "cron",
    };
    assert_eq!(Some(kind), case["kind"].as_str(), "kind");
    for (i, expected) in expected_list(&case).into_iter().enumerate() {
        assert_eq!(resolver.next(), expected, "next #{i}");
    }
}

include!(concat!(env!("OUT_DIR"), "/conformance_tests.rs"));
