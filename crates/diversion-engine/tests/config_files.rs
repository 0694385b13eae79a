use diversion_engine::{ConfigError, DiversionEngine, EngineConfig};
use diversion_model::DispositionClass;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml() {
    let file = write_config(
        ".toml",
        r#"
        mass_balance_tolerance = 0.02
        include_material_breakdown = true

        [labels]
        source = "Campus Waste"

        [telemetry]
        filter = "warn"
        json = true
        "#,
    );

    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.mass_balance_tolerance, 0.02);
    assert!(config.include_material_breakdown);
    assert_eq!(config.labels.source_label(), "Campus Waste");
    assert!(config.telemetry.json);
}

#[test]
fn loads_yaml() {
    let file = write_config(
        ".yaml",
        "certification_threshold_percent: 80.0\nlabels:\n  process:\n    compost: Food Scraps\n",
    );

    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.certification_threshold_percent, 80.0);
    assert_eq!(
        config.labels.process_label(DispositionClass::Compost),
        "Food Scraps"
    );
}

#[test]
fn loads_json() {
    let file = write_config(
        ".json",
        r#"{"display_decimals": 1, "materials": {"carpet": {"divertible": false}}}"#,
    );

    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.display_decimals, 1);
    assert!(config.materials.is_known("carpet"));
    assert!(!config.materials.classify("carpet").divertible);
    assert!(DiversionEngine::new(config).is_ok());
}

#[test]
fn rejects_unknown_extension() {
    let file = write_config(".ini", "display_decimals = 2");
    assert!(matches!(
        EngineConfig::from_path(file.path()),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"
    ));
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = EngineConfig::from_path(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn file_values_are_validated() {
    let file = write_config(".yml", "mass_balance_tolerance: 3.0\n");
    let err = EngineConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "mass_balance_tolerance",
            ..
        }
    ));
}
