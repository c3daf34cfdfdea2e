//! Environment layer of the settings precedence.
//!
//! Lives in its own test binary: it mutates process environment, which the
//! file-based tests in config_test.rs must not observe.

use std::env;
use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use treemodel::config::Settings;
use treemodel::util::testing;

#[fixture]
fn temp_dir() -> TempDir {
    testing::init_test_setup();
    TempDir::new().expect("create temp dir")
}

#[rstest]
fn given_env_var_and_local_file_when_loading_then_env_wins(temp_dir: TempDir) {
    let local = temp_dir.path().join("local.toml");
    fs::write(&local, "id_field = \"file_key\"\nlabel_field = \"name\"\n").unwrap();

    env::set_var("TREEMODEL_ID_FIELD", "env_key");
    let result = Settings::load_from(None, Some(&local));
    env::remove_var("TREEMODEL_ID_FIELD");

    let settings = result.unwrap();
    assert_eq!(settings.id_field, "env_key");
    assert_eq!(settings.label_field, "name");
    assert_eq!(settings.children_key, "nodes");

    let settings = Settings::load_from(None, Some(&local)).unwrap();
    assert_eq!(settings.id_field, "file_key");
}
