/// Build script: generates one `#[test]` per case in conformance/cases.json
/// so each case shows up separately in `cargo test` output.
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

const SECTIONS: [(&str, &str); 6] = [
    ("validate", "run_validate"),
    ("next", "run_next"),
    ("prev", "run_prev"),
    ("infeasible", "run_infeasible"),
    ("matches", "run_matches"),
    ("resolver", "run_resolver"),
];

fn main() {
    let cases_path = Path::new("conformance/cases.json");
    println!("cargo:rerun-if-changed={}", cases_path.display());

    let raw = fs::read_to_string(cases_path).expect("failed to read conformance/cases.json");
    let cases: serde_json::Value =
        serde_json::from_str(&raw).expect("invalid JSON in conformance/cases.json");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("conformance_tests.rs");
    let mut f = fs::File::create(&dest).unwrap();

    for (section, runner) in SECTIONS {
        for (i, case) in iter_tests(&cases[section]).enumerate() {
            let name = test_name(case, i);
            writeln!(f, "#[test]").unwrap();
            writeln!(f, "fn {section}_{name}() {{ {runner}({i}); }}").unwrap();
        }
    }
}

fn iter_tests(section: &serde_json::Value) -> impl Iterator<Item = &serde_json::Value> {
    section["tests"]
        .as_array()
        .expect("section missing 'tests' array")
        .iter()
}

fn test_name(case: &serde_json::Value, index: usize) -> String {
    let raw = case["name"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| format!("case_{index}"));
    sanitize(&raw)
}

fn sanitize(name: &str) -> String {
    let mut result = String::new();
    let mut prev_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            prev_underscore = false;
        } else if !prev_underscore {
            result.push('_');
            prev_underscore = true;
        }
    }
    result.trim_matches('_').to_string()
}
