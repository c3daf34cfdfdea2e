//! Layered settings loading

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use treemodel::application::ApplicationError;
use treemodel::config::Settings;
use treemodel::util::testing;

#[fixture]
fn temp_dir() -> TempDir {
    testing::init_test_setup();
    TempDir::new().expect("create temp dir")
}

#[rstest]
fn given_global_and_local_files_when_loading_then_local_wins(temp_dir: TempDir) {
    let global = temp_dir.path().join("global.toml");
    let local = temp_dir.path().join("local.toml");
    fs::write(&global, "id_field = \"key\"\nlabel_field = \"name\"\n").unwrap();
    fs::write(&local, "label_field = \"title\"\n").unwrap();

    let settings = Settings::load_from(Some(&global), Some(&local)).unwrap();

    assert_eq!(settings.id_field, "key");
    assert_eq!(settings.label_field, "title");
    assert_eq!(settings.children_key, "nodes");
}

#[rstest]
fn given_absent_global_file_when_loading_then_skipped(temp_dir: TempDir) {
    let global = temp_dir.path().join("missing.toml");

    let settings = Settings::load_from(Some(&global), None).unwrap();

    assert_eq!(settings, Settings::default());
}

#[rstest]
fn given_absent_local_file_when_loading_then_error(temp_dir: TempDir) {
    let local = temp_dir.path().join("missing.toml");

    let err = Settings::load_from(None, Some(&local)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[rstest]
#[case::bad_toml("id_field = ")]
#[case::clashing_keys("id_field = \"nodes\"")]
#[case::empty_value("label_field = \"\"")]
fn given_invalid_local_file_when_loading_then_config_error(
    temp_dir: TempDir,
    #[case] content: &str,
) {
    let local = temp_dir.path().join("local.toml");
    fs::write(&local, content).unwrap();

    let err = Settings::load_from(None, Some(&local)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[rstest]
fn given_effective_settings_when_written_back_then_loadable(temp_dir: TempDir) {
    let settings = Settings {
        children_key: "kids".into(),
        ..Settings::default()
    };
    let local = temp_dir.path().join("roundtrip.toml");
    fs::write(&local, settings.to_toml().unwrap()).unwrap();

    assert_eq!(Settings::load_from(None, Some(&local)).unwrap(), settings);
}
