use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("response body is JSON {kind}, expected an object")]
    NotAnObject { kind: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` is not a valid number ({value}): {reason}")]
    InvalidNumber {
        field: String,
        value: String,
        reason: String,
    },

    #[error("field `{field}` must be a string, got {value}")]
    InvalidString { field: String, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("value #{index} does not match type {param}: {value}")]
    TypeMismatch {
        index: usize,
        param: String,
        value: String,
    },

    #[error("value #{index} is negative and cannot be encoded as {param}: {value}")]
    Negative {
        index: usize,
        param: String,
        value: String,
    },

    #[error("value #{index} overflows {param}: {value}")]
    Overflow {
        index: usize,
        param: String,
        value: String,
    },

    #[error("value #{index} is not an integer: {value}")]
    NotAnInteger { index: usize, value: String },

    #[error("value #{index} is not valid hex: {value}")]
    InvalidBytes { index: usize, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid type signature `{signature}`: {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("data too short: need at least {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("offset {offset} for value #{index} is out of bounds")]
    OffsetOutOfBounds { index: usize, offset: String },

    #[error("value #{index} does not fit in {param}")]
    ValueOutOfRange { index: usize, param: String },

    #[error("value #{index} is not a valid bool")]
    InvalidBool { index: usize },

    #[error("value #{index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("payload is not valid hex: {0}")]
    InvalidHex(String),

    #[error("expected tuple {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encoded response is {size} bytes, limit is {limit}")]
    ResponseTooLarge { size: usize, limit: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Encoding,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Fetch(FetchError::InvalidJson(_))
            | PipelineError::Fetch(FetchError::NotAnObject { .. })
            | PipelineError::Normalize(_) => ErrorCategory::Data,
            PipelineError::Fetch(_) => ErrorCategory::Network,
            PipelineError::Encode(_)
            | PipelineError::Decode(_)
            | PipelineError::ResponseTooLarge { .. } => ErrorCategory::Encoding,
            PipelineError::ConfigError { .. }
            | PipelineError::MissingConfigError { .. }
            | PipelineError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PipelineError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路問題通常可以重試
            PipelineError::Fetch(FetchError::Timeout { .. })
            | PipelineError::Fetch(FetchError::Transport(_)) => ErrorSeverity::Medium,
            PipelineError::Fetch(FetchError::Status { status, .. }) if *status >= 500 => {
                ErrorSeverity::Medium
            }
            PipelineError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PipelineError::Fetch(FetchError::Timeout { .. }) => {
                "Increase source.timeout_ms or check the API's latency"
            }
            PipelineError::Fetch(FetchError::Transport(_)) => {
                "Check network connectivity and the endpoint host"
            }
            PipelineError::Fetch(FetchError::Status { status, .. }) if *status == 401 || *status == 403 => {
                "Check that the access token in the URL is valid"
            }
            PipelineError::Fetch(FetchError::Status { .. }) => {
                "Check the endpoint path and the API's status page"
            }
            PipelineError::Fetch(_) => "Make sure the endpoint returns a single JSON object",
            PipelineError::Normalize(_) => {
                "Inspect the API record; required fields are UnparsedAddress, YearBuilt, LotSizeSquareFeet"
            }
            PipelineError::Encode(_) | PipelineError::Decode(_) => {
                "Check that values match the (string,uint256,uint256) signature"
            }
            PipelineError::ResponseTooLarge { .. } => {
                "Shorten the string field or raise response.max_bytes"
            }
            PipelineError::ConfigError { .. }
            | PipelineError::MissingConfigError { .. }
            | PipelineError::InvalidConfigValueError { .. } => {
                "Review the request configuration file and environment variables"
            }
            PipelineError::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the data API: {}", self),
            ErrorCategory::Data => format!("The API returned unusable data: {}", self),
            ErrorCategory::Encoding => format!("Could not build the on-chain payload: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
