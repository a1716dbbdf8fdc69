//! Error types for scraperkit-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running the media tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A semantic parameter name that the configuration does not know.
    #[error("unknown encoding parameter: {0}")]
    UnknownParameter(String),

    /// A parameter value failed validation.
    #[error("invalid value for {param}: {message}")]
    InvalidValue { param: String, message: String },

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool could not be run or reported a failure.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool exited with a non-zero status.
    ///
    /// `output` holds everything the tool printed (stdout, then stderr).
    #[error("{tool} exited with status {}", status.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    ProcessFailed {
        tool: String,
        status: Option<i32>,
        output: String,
    },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Workspace error.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    /// Create an invalid value error.
    pub fn invalid_value(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Whether this error comes from parameter validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnknownParameter(_) | Self::InvalidValue { .. })
    }

    /// Diagnostic output captured from a failed process, if any.
    pub fn process_output(&self) -> Option<&str> {
        match self {
            Self::ProcessFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
