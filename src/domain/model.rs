use crate::abi::{self, ParamType, Token};
use crate::utils::error::{DecodeError, PipelineError};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Untyped JSON object as returned by the data API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawApiRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl RawApiRecord {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawApiRecord {
    fn from(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }
}

/// Normalized property data, encoded on-chain as `(string,uint256,uint256)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub address: String,
    pub year_built: U256,
    pub lot_size_square_feet: U256,
}

impl PropertyRecord {
    pub const SIGNATURE: &'static str = "(string,uint256,uint256)";

    pub fn param_types() -> [ParamType; 3] {
        [ParamType::String, ParamType::Uint(256), ParamType::Uint(256)]
    }

    pub fn to_tokens(&self) -> Vec<Token> {
        vec![
            Token::String(self.address.clone()),
            Token::Uint(self.year_built),
            Token::Uint(self.lot_size_square_feet),
        ]
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, DecodeError> {
        let shape = || DecodeError::ShapeMismatch {
            expected: abi::signature_string(&Self::param_types()),
            actual: format!("{} values", tokens.len()),
        };

        match tokens.as_slice() {
            [Token::String(address), Token::Uint(year_built), Token::Uint(lot_size)] => Ok(Self {
                address: address.clone(),
                year_built: *year_built,
                lot_size_square_feet: *lot_size,
            }),
            _ => Err(shape()),
        }
    }
}

/// ABI-encoded response bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
}

impl EncodedPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        abi::to_hex(&self.bytes)
    }

    pub fn decode(&self) -> Result<PropertyRecord, DecodeError> {
        let tokens = abi::decode(&PropertyRecord::param_types(), &self.bytes)?;
        PropertyRecord::from_tokens(tokens)
    }
}

/// Console lines captured during one run, kept apart from the payload.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    lines: Vec<String>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("🖥️ {}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 每行以換行結尾，與終端機擷取輸出的格式一致
    pub fn to_output(&self) -> String {
        self.lines.iter().map(|l| format!("{}\n", l)).collect()
    }
}

/// What the harness reports for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub response_bytes_hexstring: Option<String>,
    pub error_string: Option<String>,
    pub captured_terminal_output: String,
}

impl RunOutcome {
    pub fn from_result(result: &Result<EncodedPayload, PipelineError>, console: &ConsoleLog) -> Self {
        let captured_terminal_output = console.to_output();

        match result {
            Ok(payload) => Self {
                response_bytes_hexstring: Some(payload.to_hex()),
                error_string: None,
                captured_terminal_output,
            },
            Err(e) => Self {
                response_bytes_hexstring: None,
                error_string: Some(e.to_string()),
                captured_terminal_output,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.response_bytes_hexstring.is_some()
    }
}
