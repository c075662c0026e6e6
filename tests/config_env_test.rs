//! Environment overrides live in their own test binary: env vars are
//! process-global and would leak into the other config tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::{env, fs};

use tempfile::TempDir;

use pytree::config::{RenderStyle, Settings};
use pytree::errors::AppError;

// Serializes the tests in this binary around the shared environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn config_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("pytree.toml");
    fs::write(&path, "include_gradient_leaves = false\nstyle = \"repr\"\n").unwrap();
    path
}

fn load_with_env(vars: &[(&str, &str)], path: &Path) -> Result<Settings, AppError> {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    for (key, value) in vars {
        env::set_var(key, value);
    }
    let settings = Settings::load_from(None, Some(path));
    for (key, _) in vars {
        env::remove_var(key);
    }
    settings
}

#[test]
fn given_env_vars_when_load_then_env_wins_over_config_file() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let settings = load_with_env(
        &[
            ("PYTREE_INCLUDE_GRADIENT_LEAVES", "true"),
            ("PYTREE_STYLE", "json"),
        ],
        &path,
    )
    .expect("load settings");

    assert!(settings.include_gradient_leaves);
    assert_eq!(settings.style, RenderStyle::Json);
}

#[test]
fn given_unparsable_gradient_flag_in_env_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let err = load_with_env(&[("PYTREE_INCLUDE_GRADIENT_LEAVES", "maybe")], &path).unwrap_err();

    assert!(matches!(err, AppError::Config { .. }));
}

#[test]
fn given_unknown_style_in_env_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let err = load_with_env(&[("PYTREE_STYLE", "yaml")], &path).unwrap_err();

    assert!(matches!(err, AppError::Config { .. }));
    assert!(err.to_string().contains("unknown style 'yaml'"));
}
