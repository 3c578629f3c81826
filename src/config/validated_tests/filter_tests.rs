//! Tests for trigger filter construction.

use super::*;

fn with_trigger(trigger: &str) -> TomlConfig {
    toml(&format!("[trigger]\n{trigger}\n[command]\ntemplate = \"x\""))
}

#[test]
fn no_patterns_accepts_every_line() {
    let config = ValidatedConfig::from_raw(&cli(&["--command", "x"]), None).unwrap();

    assert!(config.filter.is_empty());
    assert!(config.filter.accepts("anything"));
}

#[test]
fn toml_patterns_are_used() {
    let toml = with_trigger("include = ['\\.rs$']\nexclude = ['^target/']");

    let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

    assert_eq!(config.filter.len(), 2);
    assert!(config.filter.accepts("src/lib.rs"));
    assert!(!config.filter.accepts("target/out.rs"));
    assert!(!config.filter.accepts("README.md"));
}

#[test]
fn cli_includes_replace_toml_includes_only() {
    let toml = with_trigger("include = ['\\.rs$']\nexclude = ['^target/']");

    let config =
        ValidatedConfig::from_raw(&cli(&["--include", "\\.md$"]), Some(&toml)).unwrap();

    assert!(config.filter.accepts("README.md"));
    assert!(!config.filter.accepts("src/lib.rs"));
    // TOML excludes still apply
    assert!(!config.filter.accepts("target/NOTES.md"));
}

#[test]
fn cli_excludes_replace_toml_excludes_only() {
    let toml = with_trigger("include = ['\\.rs$']\nexclude = ['^target/']");

    let config =
        ValidatedConfig::from_raw(&cli(&["--exclude", "^vendor/"]), Some(&toml)).unwrap();

    assert!(config.filter.accepts("target/out.rs"));
    assert!(!config.filter.accepts("vendor/dep.rs"));
    assert!(!config.filter.accepts("README.md"));
}

#[test]
fn invalid_cli_pattern_is_rejected() {
    let result = ValidatedConfig::from_raw(&cli(&["--command", "x", "--include", "("]), None);

    assert!(matches!(
        result,
        Err(ConfigError::InvalidRegex { ref pattern, .. }) if pattern == "("
    ));
}

#[test]
fn invalid_toml_pattern_is_rejected() {
    let toml = with_trigger("exclude = ['[']");

    let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

    assert!(matches!(result, Err(ConfigError::InvalidRegex { .. })));
}
