use orca_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct ProjectDoc {
    name: String,
    environments: Vec<String>,
}

fn write(temp: &TempDir, name: &str, content: &str) -> NormalizedPath {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    NormalizedPath::new(&path)
}

#[test]
fn test_load_yaml_document() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "orca.yml", "name: demo\nenvironments: [local, prod]\n");

    let doc: ProjectDoc = ConfigStore::new().load(&path).unwrap();
    assert_eq!(
        doc,
        ProjectDoc {
            name: "demo".into(),
            environments: vec!["local".into(), "prod".into()],
        }
    );
}

#[test]
fn test_load_toml_and_json_yield_same_value() {
    let temp = TempDir::new().unwrap();
    let toml_path = write(&temp, "vars.toml", "a = \"x\"\n[nested]\nb = 2\n");
    let json_path = write(&temp, "vars.json", r#"{"a": "x", "nested": {"b": 2}}"#);

    let store = ConfigStore::new();
    assert_eq!(
        store.load_value(&toml_path).unwrap(),
        store.load_value(&json_path).unwrap()
    );
}

#[test]
fn test_load_dotenv_document() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "orca.local.env", "LOG_LEVEL=debug\nREPLICAS=3\n");

    let value = ConfigStore::new().load_value(&path).unwrap();
    assert_eq!(value, json!({"LOG_LEVEL": "debug", "REPLICAS": "3"}));
}

#[test]
fn test_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("absent.env"));

    let err = ConfigStore::new().load_value(&path).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn test_parse_error_names_format_and_path() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "broken.json", "{ not json");

    let err = ConfigStore::new().load_value(&path).unwrap_err();
    match &err {
        Error::ConfigParse { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(err.to_string().contains("broken.json"));
}
