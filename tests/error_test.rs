//! Tests for error types

use mlops_deploy::Error;

#[test]
fn test_not_found_error() {
    let error = Error::not_found("experiment", "exp-42");
    let error_str = format!("{error}");
    assert_eq!(error_str, "experiment not found: exp-42");
    assert!(error.is_not_found());
}

#[test]
fn test_repository_error() {
    let error = Error::Repository("connection reset".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Repository error"));
    assert!(error_str.contains("connection reset"));
    assert!(!error.is_not_found());
}

#[test]
fn test_artifact_transfer_error() {
    let error = Error::ArtifactTransfer("bucket missing".to_string());
    assert!(format!("{error}").contains("Artifact transfer failed"));
}

#[test]
fn test_image_errors() {
    let build = Error::ImageBuild("exit 1".to_string());
    let push = Error::ImagePush("denied".to_string());
    assert!(format!("{build}").contains("Image build failed"));
    assert!(format!("{push}").contains("Image push failed"));
}

#[test]
fn test_invalid_config_error() {
    let error = Error::InvalidConfig("registry must not be empty".to_string());
    assert!(format!("{error}").contains("Invalid configuration"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> mlops_deploy::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
