//! Tests for window validation and the derived wrapper options.

use super::*;

fn with_window(value: &str) -> Result<ValidatedConfig, ConfigError> {
    let toml = toml(&format!(
        "[debounce]\nwindow_ms = {value}\n[command]\ntemplate = \"x\""
    ));
    ValidatedConfig::from_raw(&cli(&[]), Some(&toml))
}

mod window {
    use super::*;

    #[test]
    fn zero_window_is_accepted() {
        let config = with_window("0").unwrap();

        assert!(config.window_ms.abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_window_is_accepted() {
        let config = with_window("12.5").unwrap();

        assert!((config.window_ms - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_window_is_rejected() {
        let result = with_window("-1");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidWindow {
                reason: "must not be negative",
                ..
            })
        ));
    }

    #[test]
    fn infinite_window_is_rejected() {
        let result = with_window("inf");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidWindow {
                reason: "must be a finite number",
                ..
            })
        ));
    }

    #[test]
    fn nan_window_is_rejected() {
        assert!(matches!(
            with_window("nan"),
            Err(ConfigError::InvalidWindow { .. })
        ));
    }
}

mod wrapper_options {
    use super::*;
    use std::time::Duration;

    #[test]
    fn debounce_options_carry_window_and_leading_edge() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--command", "x", "--window", "250", "--leading"]),
            None,
        )
        .unwrap();

        let options = config.debounce_options();

        assert_eq!(options.window().unwrap(), Duration::from_millis(250));
        assert!(options.leading_edge());
        assert!(options.abort_signal().is_none());
    }

    #[test]
    fn coalesce_options_carry_after_flag() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--command", "x", "--after"]), None).unwrap();

        assert!(config.coalesce_options().after);
    }

    #[test]
    fn display_summarizes_config() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--command", "x", "--mode", "coalesce", "--include", "a"]),
            None,
        )
        .unwrap();

        let summary = config.to_string();

        assert!(summary.contains("mode: coalesce"));
        assert!(summary.contains("window: 500ms"));
        assert!(summary.contains("filters: 1"));
    }
}
