use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use vigil::{SessionOptions, Settings};

// Kept as the only test in this binary: it mutates process environment.
#[test]
fn test_env_overrides_file_and_cli_overrides_env() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    std::fs::write(
        &config_path,
        "[session]\nlatency = 0.25\nwatchdir = [\"app\"]\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("VIGIL_SESSION__LATENCY", "0.75");
        env::set_var("VIGIL_SESSION__FORCE_POLLING", "true");
        env::set_var("VIGIL_LOGGING__DEFAULT", "debug");
    }

    let from_env = Settings::load_from(&config_path).unwrap();
    assert_eq!(from_env.session.latency, Some(0.75));
    assert_eq!(from_env.session.force_polling, Some(true));
    assert_eq!(from_env.logging.default, "debug");
    // Config file value remains when no env var is set
    assert_eq!(from_env.session.watchdir, vec![PathBuf::from("app")]);

    let overrides = SessionOptions {
        latency: Some(2.0),
        ..Default::default()
    };
    let from_cli = Settings::load_with(Some(&config_path), &overrides).unwrap();
    assert_eq!(from_cli.session.latency, Some(2.0));
    assert_eq!(from_cli.session.force_polling, Some(true));

    unsafe {
        env::remove_var("VIGIL_SESSION__LATENCY");
        env::remove_var("VIGIL_SESSION__FORCE_POLLING");
        env::remove_var("VIGIL_LOGGING__DEFAULT");
    }
}
