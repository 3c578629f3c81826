//! Tests for CLI > TOML > default precedence.

use super::*;

fn full_toml() -> TomlConfig {
    toml(
        r#"
        [debounce]
        mode = "coalesce"
        window_ms = 800

        [command]
        template = "from-toml"
        shell = "zsh"
    "#,
    )
}

#[test]
fn cli_template_overrides_toml() {
    let config =
        ValidatedConfig::from_raw(&cli(&["--command", "from-cli"]), Some(&full_toml())).unwrap();

    assert_eq!(config.template, "from-cli");
}

#[test]
fn cli_mode_overrides_toml() {
    let config = ValidatedConfig::from_raw(
        &cli(&["--command", "x", "--mode", "debounce"]),
        Some(&full_toml()),
    )
    .unwrap();

    assert_eq!(config.mode, Mode::Debounce);
}

#[test]
fn toml_values_used_when_cli_silent() {
    let config = ValidatedConfig::from_raw(&cli(&[]), Some(&full_toml())).unwrap();

    assert_eq!(config.mode, Mode::Coalesce);
    assert!((config.window_ms - 800.0).abs() < f64::EPSILON);
    assert_eq!(config.runner.shell(), "zsh");
}

#[test]
fn cli_shell_overrides_toml() {
    let config =
        ValidatedConfig::from_raw(&cli(&["--shell", "bash"]), Some(&full_toml())).unwrap();

    assert_eq!(config.runner.shell(), "bash");
}

#[test]
fn cli_window_overrides_toml() {
    let config =
        ValidatedConfig::from_raw(&cli(&["--window", "50"]), Some(&full_toml())).unwrap();

    assert!((config.window_ms - 50.0).abs() < f64::EPSILON);
}

#[test]
fn defaults_apply_without_toml() {
    let config = ValidatedConfig::from_raw(&cli(&["--command", "x"]), None).unwrap();

    assert_eq!(config.mode, Mode::Debounce);
    assert!((config.window_ms - 500.0).abs() < f64::EPSILON);
    assert!(!config.leading);
    assert!(!config.after);
    assert!(!config.dry_run);
    assert!(!config.verbose);
}

mod boolean_flags {
    use super::*;

    #[test]
    fn toml_true_cannot_be_disabled_by_cli() {
        let toml = toml(
            r#"
            [debounce]
            leading = true
            after = true
            [command]
            template = "x"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert!(config.leading);
        assert!(config.after);
    }

    #[test]
    fn cli_flag_enables_when_toml_false() {
        let toml = toml("[command]\ntemplate = \"x\"");

        let config = ValidatedConfig::from_raw(&cli(&["--leading"]), Some(&toml)).unwrap();

        assert!(config.leading);
        assert!(!config.after);
    }
}

mod mode_parsing {
    use super::*;

    #[test]
    fn toml_mode_is_case_insensitive() {
        let toml = toml("[debounce]\nmode = \"Coalesce\"\n[command]\ntemplate = \"x\"");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.mode, Mode::Coalesce);
    }

    #[test]
    fn unknown_toml_mode_is_rejected() {
        let toml = toml("[debounce]\nmode = \"throttle\"\n[command]\ntemplate = \"x\"");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidMode { ref value }) if value == "throttle"
        ));
    }
}
