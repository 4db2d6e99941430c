mod common;

use common::WordmonProcess;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn version_human() {
    let output = WordmonProcess::spawn_command(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("wordmon "));
}

#[test]
fn version_json() {
    let output = WordmonProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be valid JSON");
    assert_eq!(parsed["name"], "wordmon");
    assert!(parsed["core"].is_string());
}

#[test]
fn validate_valid_config() {
    let config = WordmonProcess::fixture_path("small_game.yaml");
    let output = WordmonProcess::spawn_command(&["validate", config.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "validate should succeed for valid config: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains(": ok"));
}

#[test]
fn validate_reports_every_issue() {
    let config = WordmonProcess::fixture_path("bad_weights.yaml");
    let output = WordmonProcess::spawn_command(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let out = stdout(&output);
    assert!(out.contains("rarity weights must sum to 100"), "{out}");
    assert!(out.contains("channel capacity must be at least 1"), "{out}");
}

#[test]
fn validate_json_output() {
    let good = WordmonProcess::fixture_path("small_game.yaml");
    let bad = WordmonProcess::fixture_path("bad_weights.yaml");
    let output = WordmonProcess::spawn_command(&[
        "validate",
        "--format",
        "json",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be valid JSON");
    let reports = parsed.as_array().expect("array of reports");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert!(!reports[1]["issues"].as_array().unwrap().is_empty());
}

#[test]
fn validate_strict_fails_on_warnings() {
    // Zero rare and legendary weights only warn.
    let config = WordmonProcess::fixture_path("small_game.yaml");
    let output = WordmonProcess::spawn_command(&["validate", "--strict", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_unknown_field() {
    let config = WordmonProcess::fixture_path("unknown_field.yaml");
    let output = WordmonProcess::spawn_command(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_missing_file() {
    let output =
        WordmonProcess::spawn_command(&["validate", "/tmp/nonexistent_wordmon_test_file.yaml"]);
    assert!(
        !output.status.success(),
        "validate should fail for nonexistent file"
    );
}

#[test]
fn words_builtin_catalog_json() {
    let output = WordmonProcess::spawn_command(&["words", "--format", "json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let words = parsed.as_array().unwrap();
    assert!(!words.is_empty());
    for rarity in ["common", "rare", "legendary"] {
        assert!(
            words.iter().any(|w| w["rarity"] == rarity),
            "no {rarity} word in the built-in catalog"
        );
    }
}

#[test]
fn words_from_config_filtered() {
    let config = WordmonProcess::fixture_path("small_game.yaml");
    let output = WordmonProcess::spawn_command(&[
        "words",
        "--config",
        config.to_str().unwrap(),
        "--rarity",
        "common",
        "--format",
        "json",
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let texts: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["chat", "pomme"]);
    assert_eq!(parsed[0]["points"], 5);
}

#[test]
fn words_human_lists_count() {
    let config = WordmonProcess::fixture_path("small_game.yaml");
    let output = WordmonProcess::spawn_command(&["words", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 words"));
}

#[test]
fn completions_bash() {
    let output = WordmonProcess::spawn_command(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("wordmon"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = WordmonProcess::spawn_command(&["fly"]);
    assert!(!output.status.success());
}
