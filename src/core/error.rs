use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigMissingKey,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    TemplateUnknownVariable,

    ProvisionTransferFailed,
    ProvisionExpandFailed,

    PipelineStepFailed,

    ReleaseGateFailed,

    InternalIoError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::TemplateUnknownVariable => "template.unknown_variable",

            ErrorCode::ProvisionTransferFailed => "provision.transfer_failed",
            ErrorCode::ProvisionExpandFailed => "provision.expand_failed",

            ErrorCode::PipelineStepFailed => "pipeline.step_failed",

            ErrorCode::ReleaseGateFailed => "release.gate_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownVariableDetails {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFailureDetails {
    pub file: String,
    pub status: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailureDetails {
    pub pipeline: String,
    pub step: String,
    pub status: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    /// Process exit status this failure maps to. Pipeline step failures carry
    /// the failing tool's status; everything else is 1.
    pub status: i32,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            status: 1,
        }
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    fn with_status(mut self, status: i32) -> Self {
        // A zero status would make a failure look like success at the process
        // boundary; clamp to the conventional failure status.
        self.status = if status == 0 { 1 } else { status };
        self
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let path = path.into();
        let details = serde_json::to_value(ConfigInvalidJsonDetails {
            path: path.clone(),
            error: err.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidJson,
            format!("Invalid declaration document {}: {}", path, err),
            details,
        )
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let key = key.into();
        let details = serde_json::to_value(ConfigMissingKeyDetails {
            key: key.clone(),
            path,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigMissingKey,
            format!("Missing required configuration key '{}'", key),
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let problem = problem.into();
        let details = serde_json::to_value(ConfigInvalidValueDetails {
            key: key.clone(),
            value,
            problem: problem.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for '{}': {}", key, problem),
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let problem = problem.into();
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.clone(),
            problem: problem.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    pub fn template_unknown_variable(name: impl Into<String>) -> Self {
        let name = name.into();
        let details = serde_json::to_value(UnknownVariableDetails { name: name.clone() })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::TemplateUnknownVariable,
            format!("Unknown template variable '@{}@'", name),
            details,
        )
    }

    pub fn provision_transfer_failed(file: impl Into<String>, status: i32) -> Self {
        let file = file.into();
        let details = serde_json::to_value(ArtifactFailureDetails {
            file: file.clone(),
            status,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ProvisionTransferFailed,
            format!("Transfer of '{}' failed with status {}", file, status),
            details,
        )
        .with_status(status)
    }

    pub fn provision_expand_failed(file: impl Into<String>, status: i32) -> Self {
        let file = file.into();
        let details = serde_json::to_value(ArtifactFailureDetails {
            file: file.clone(),
            status,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ProvisionExpandFailed,
            format!("Expansion of '{}' failed with status {}", file, status),
            details,
        )
        .with_status(status)
    }

    pub fn pipeline_step_failed(
        pipeline: impl Into<String>,
        step: impl Into<String>,
        status: i32,
    ) -> Self {
        let pipeline = pipeline.into();
        let step = step.into();
        let details = serde_json::to_value(StepFailureDetails {
            pipeline: pipeline.clone(),
            step: step.clone(),
            status,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::PipelineStepFailed,
            format!("{} step '{}' failed with status {}", pipeline, step, status),
            details,
        )
        .with_status(status)
    }

    pub fn release_gate_failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::ReleaseGateFailed,
            format!("Release gate check failed: {}", reason),
            Value::Object(serde_json::Map::new()),
        )
    }

    pub fn internal_io(message: impl Into<String>, context: Option<String>) -> Self {
        let message = message.into();
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: message.clone(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, message, details)
    }

    pub fn internal_unexpected(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            message,
            Value::Object(serde_json::Map::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failure_carries_tool_status() {
        let err = Error::pipeline_step_failed("build", "compile", 3);
        assert_eq!(err.code.as_str(), "pipeline.step_failed");
        assert_eq!(err.status, 3);
    }

    #[test]
    fn zero_tool_status_maps_to_failure_status() {
        let err = Error::provision_transfer_failed("ideaIC-2017.1.zip", 0);
        assert_eq!(err.status, 1);
    }

    #[test]
    fn hints_accumulate() {
        let err = Error::config_missing_key("registry.io.flutter", None)
            .with_hint("Add the plugin to the registry map");
        assert_eq!(err.hints.len(), 1);
    }
}
