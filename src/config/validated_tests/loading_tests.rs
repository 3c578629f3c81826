//! Tests for configuration loading and required fields.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, tempdir};

use crate::config::{expand_tilde, write_default_config};

use super::*;

mod required_fields {
    use super::*;

    #[test]
    fn missing_template_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&[]), None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: "template",
                ..
            })
        ));
    }

    #[test]
    fn template_from_cli() {
        let config = ValidatedConfig::from_raw(&cli(&["--command", "make"]), None).unwrap();

        assert_eq!(config.template, "make");
        assert_eq!(config.mode, Mode::Debounce);
    }

    #[test]
    fn template_from_toml() {
        let toml = toml(
            r#"
            [command]
            template = "cargo build"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.template, "cargo build");
    }

    #[test]
    fn template_syntax_error_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--command", "{{#if}}"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidTemplate { .. })));
    }

    #[test]
    fn runner_is_compiled_with_shell_and_dry_run() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--command", "echo {{line}}", "--shell", "bash", "--dry-run"]),
            None,
        )
        .unwrap();

        assert_eq!(config.runner.shell(), "bash");
        assert!(config.runner.is_dry_run());
        assert!(config.dry_run);
    }

    #[test]
    fn shell_defaults_to_sh() {
        let config = ValidatedConfig::from_raw(&cli(&["--command", "true"]), None).unwrap();

        assert_eq!(config.runner.shell(), "sh");
    }
}

mod config_load {
    use super::*;

    #[test]
    fn load_from_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [debounce]
            mode = "coalesce"

            [command]
            template = "make"
        "#
        )
        .unwrap();

        let cli = cli(&["--config", file.path().to_str().unwrap()]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.mode, Mode::Coalesce);
        assert_eq!(config.template, "make");
    }

    #[test]
    fn load_without_config_file() {
        let config = ValidatedConfig::load(&cli(&["--command", "make"])).unwrap();

        assert_eq!(config.template, "make");
    }

    #[test]
    fn load_nonexistent_config_file_returns_error() {
        let cli = cli(&["--config", "nonexistent_file_12345.toml"]);
        let result = ValidatedConfig::load(&cli);

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[command]\ntemplate = \"make\"\ncwd = \"/tmp\"").unwrap();

        let cli = cli(&["--config", file.path().to_str().unwrap()]);

        assert!(matches!(
            ValidatedConfig::load(&cli),
            Err(ConfigError::TomlParse(_))
        ));
    }
}

mod tilde {
    use super::*;

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(
            expand_tilde(Path::new("/etc/settle.toml")),
            PathBuf::from("/etc/settle.toml")
        );
        assert_eq!(
            expand_tilde(Path::new("settle.toml")),
            PathBuf::from("settle.toml")
        );
    }

    #[test]
    fn tilde_prefix_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        assert_eq!(
            expand_tilde(Path::new("~/.config/settle.toml")),
            home.join(".config/settle.toml")
        );
    }

    #[test]
    fn tilde_inside_name_is_not_expanded() {
        assert_eq!(
            expand_tilde(Path::new("~backup/settle.toml")),
            PathBuf::from("~backup/settle.toml")
        );
    }
}

mod write_config {
    use super::*;

    #[test]
    fn write_default_config_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settle.toml");

        write_default_config(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[trigger]"));
        assert!(content.contains("[debounce]"));
        assert!(content.contains("[command]"));
    }

    #[test]
    fn written_template_needs_only_a_command() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settle.toml");
        write_default_config(&path).unwrap();

        let cli = cli(&["--config", path.to_str().unwrap(), "--command", "make"]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.mode, Mode::Debounce);
        assert!((config.window_ms - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn write_default_config_to_invalid_path_returns_error() {
        let path = Path::new("/nonexistent_dir_12345/settle.toml");
        let result = write_default_config(path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
