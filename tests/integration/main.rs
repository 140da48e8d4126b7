//! Integration tests for the absort CLI
//!
//! Each test writes a manifest to a temp dir and runs the built binary on it.

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"[
  {"name": "main", "dependencies": ["render", "parse"]},
  {"name": "parse", "dependencies": ["tokenize"]},
  {"name": "tokenize"},
  {"name": "render", "dependencies": ["Layout"]},
  {"name": "Layout", "kind": "class", "dependencies": ["print"]}
]"#;

fn absort(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_absort"))
        .args(args)
        .output()
        .expect("Failed to execute absort")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_cli_help() {
    let output = absort(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Order top-level declarations"));
}

#[test]
fn test_version() {
    let output = absort(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![format!("ABSort v{}", env!("CARGO_PKG_VERSION"))]
    );
}

#[test]
fn test_sort_depth_first() {
    let dir = TempDir::new().unwrap();
    let manifest = write(dir.path(), "decls.json", MANIFEST);

    let output = absort(&["sort", &manifest, "--order", "depth-first", "--no-similarity"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        vec!["parse", "tokenize", "render", "Layout", "main"]
    );
}

#[test]
fn test_sort_respects_dependencies() {
    let dir = TempDir::new().unwrap();
    let manifest = write(dir.path(), "decls.json", MANIFEST);

    let output = absort(&["sort", &manifest]);
    assert!(output.status.success());
    let names = stdout_lines(&output);
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();

    assert_eq!(names.len(), 5);
    assert_eq!(names[4], "main");
    assert!(position("parse") < position("tokenize"));
    assert!(position("render") < position("Layout"));
}

#[test]
fn test_sort_with_config_and_json() {
    let dir = TempDir::new().unwrap();
    let manifest = write(dir.path(), "decls.json", MANIFEST);
    let config = write(
        dir.path(),
        "absort.toml",
        "order = \"breadth-first\"\npin_main = false\n\n[similarity]\nenabled = false\n",
    );

    let output = absort(&["sort", &manifest, "--config", &config, "--json"]);
    assert!(output.status.success());

    let sorted: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = sorted
        .as_array()
        .unwrap()
        .iter()
        .map(|decl| decl["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["main", "parse", "render", "tokenize", "Layout"]);
    assert_eq!(sorted[4]["kind"], "class");
}

#[test]
fn test_sort_deep_chain() {
    let dir = TempDir::new().unwrap();
    let n = 20_000;
    let chain: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let deps: Vec<String> = if i + 1 < n { vec![format!("d{}", i + 1)] } else { Vec::new() };
            serde_json::json!({"name": format!("d{}", i), "dependencies": deps})
        })
        .collect();
    let manifest = write(dir.path(), "chain.json", &serde_json::to_string(&chain).unwrap());

    let output = absort(&["sort", &manifest, "--no-similarity"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let names = stdout_lines(&output);
    assert_eq!(names.len(), n);
    assert_eq!(names[0], "d0");
    assert_eq!(names[n - 1], format!("d{}", n - 1));
}

#[test]
fn test_duplicate_names_fail() {
    let dir = TempDir::new().unwrap();
    let manifest = write(dir.path(), "dup.json", r#"[{"name": "a"}, {"name": "a"}]"#);

    let output = absort(&["sort", &manifest]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Name redefinition"));
}

#[test]
fn test_unknown_order_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = write(dir.path(), "decls.json", MANIFEST);

    let output = absort(&["sort", &manifest, "--order", "sideways"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown sort order"));
}

#[test]
fn test_cycles() {
    let dir = TempDir::new().unwrap();
    let manifest = write(
        dir.path(),
        "cycles.json",
        r#"[
          {"name": "even", "dependencies": ["odd"]},
          {"name": "odd", "dependencies": ["even"]},
          {"name": "solo", "dependencies": ["solo"]}
        ]"#,
    );

    let output = absort(&["cycles", &manifest]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["even odd"]);
}
