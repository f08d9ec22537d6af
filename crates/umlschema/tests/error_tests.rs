//! Tests for core error types

use umlschema::core::UmlError;
use umlschema::plugins::schema::SchemaHeuristics;

#[test]
fn test_class_not_found() {
    let error = UmlError::class_not_found("Fattura");
    let error_msg = format!("{}", error);
    assert_eq!(error_msg, "Class not found: Fattura");
}

#[test]
fn test_cyclic_inheritance() {
    let error = UmlError::cyclic_inheritance(
        "B",
        vec!["A".to_string(), "B".to_string(), "C".to_string(), "B".to_string()],
    );
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Cyclic inheritance at B"));
    assert!(error_msg.contains("A -> B -> C -> B"));
}

#[test]
fn test_invalid_heuristics() {
    let error = SchemaHeuristics::from_json("not json").unwrap_err();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Invalid schema heuristics"));
}

#[test]
fn test_heuristics_file_missing() {
    let error = SchemaHeuristics::from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(error, UmlError::Io { .. }));
    assert!(format!("{}", error).contains("IO error"));
}

#[test]
fn test_io_error() {
    use std::io;
    let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: UmlError = io_err.into();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("IO error"));
    assert!(error_msg.contains("File not found"));
}

#[test]
fn test_serialization_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: UmlError = json_err.into();
    assert!(format!("{}", error).contains("Serialization error"));
}

#[test]
fn test_errors_convert_to_anyhow() {
    fn fails() -> anyhow::Result<()> {
        let name: Option<&str> = None;
        name.ok_or_else(|| UmlError::class_not_found("X"))?;
        Ok(())
    }
    let error = fails().unwrap_err();
    assert!(error.downcast_ref::<UmlError>().is_some());
}
