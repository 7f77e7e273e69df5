//! JSON envelope written by `--json` runs.
//!
//! Every run prints exactly one envelope: the batch report on stdout, or a
//! single error on stderr when the run stops before converting anything.

use crate::error::ConvertError;
use crate::io::exit_code::ExitCode;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Envelope around a batch report or an error.
///
/// `status` is `"success"` only when every sketch converted; `code` is
/// `"OK"` or the status code of the first failure.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T: Serialize = ()> {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    pub exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub suggestions: Vec<String>,
    /// `{"path": ...}` when the failure belongs to a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ErrorDetails {
    pub fn from_error(error: &ConvertError) -> Self {
        Self {
            suggestions: error
                .recovery_suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            context: error
                .path()
                .map(|path| serde_json::json!({ "path": path.display().to_string() })),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub version: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ResponseMeta {
    /// Crate version and the current UTC time
    pub fn now(execution_time_ms: Option<u64>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            execution_time_ms,
        }
    }
}

impl<T: Serialize> JsonResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "All sketches converted".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
            meta: None,
        }
    }

    /// Report that still carries data, for a batch where some files failed.
    /// `error` is the first failure and decides code and exit code.
    pub fn partial(data: T, error: &ConvertError, message: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: message.to_string(),
            data: Some(data),
            error: Some(ErrorDetails::from_error(error)),
            exit_code: ExitCode::from_error(error) as u8,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl JsonResponse {
    /// Failure that is not tied to a conversion, such as unreadable settings
    pub fn error(code: ExitCode, message: &str, suggestions: &[&str]) -> Self {
        Self {
            status: "error".to_string(),
            code: code.status_code().to_string(),
            message: message.to_string(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
                context: None,
            }),
            exit_code: code as u8,
            meta: None,
        }
    }

    pub fn from_error(error: &ConvertError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails::from_error(error)),
            exit_code: ExitCode::from_error(error) as u8,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_success_envelope_serializes_data() {
        let response = JsonResponse::success(vec!["void setup();"]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["code"], "OK");
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["data"][0], "void setup();");
        assert!(value.get("error").is_none());
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_error_envelope_from_convert_error() {
        let err = ConvertError::FileRead {
            path: PathBuf::from("blink.ino"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let response = JsonResponse::from_error(&err);
        assert_eq!(response.status, "error");
        assert_eq!(response.code, "FILE_READ_ERROR");
        assert_eq!(response.exit_code, 5);

        let details = response.error.unwrap();
        assert!(!details.suggestions.is_empty());
        assert_eq!(details.context.unwrap()["path"], "blink.ino");
    }

    #[test]
    fn test_settings_error_envelope() {
        let response = JsonResponse::error(
            ExitCode::ConfigError,
            "settings file nope.toml not found",
            &["Check the --config path"],
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["code"], "CONFIG_ERROR");
        assert_eq!(value["exit_code"], 6);
        assert_eq!(value["error"]["suggestions"][0], "Check the --config path");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_meta_carries_version() {
        let response = JsonResponse::success(1).with_meta(ResponseMeta::now(Some(3)));
        let meta = response.meta.unwrap();
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(meta.timestamp.ends_with("UTC"));
        assert_eq!(meta.execution_time_ms, Some(3));
    }
}
