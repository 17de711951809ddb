use crate::utils::error::DecodeError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    /// Unsigned integer with the given bit width (8..=256, multiple of 8).
    Uint(usize),
    String,
    Bytes,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for ParamType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| DecodeError::InvalidSignature {
            signature: s.to_string(),
            reason,
        };

        match s.trim() {
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "bytes" => Ok(ParamType::Bytes),
            "uint" => Ok(ParamType::Uint(256)),
            other => {
                let bits = other
                    .strip_prefix("uint")
                    .ok_or_else(|| invalid(format!("unsupported type `{}`", other)))?;
                let bits: usize = bits
                    .parse()
                    .map_err(|_| invalid(format!("bad integer width `{}`", bits)))?;
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(invalid(format!("integer width {} out of range", bits)));
                }
                Ok(ParamType::Uint(bits))
            }
        }
    }
}

/// 解析 `(string,uint256,uint256)` 形式的型別簽章，外層括號可省略
pub fn parse_signature(signature: &str) -> Result<Vec<ParamType>, DecodeError> {
    let trimmed = signature.trim();
    let inner = match trimmed.strip_prefix('(') {
        Some(rest) => rest
            .strip_suffix(')')
            .ok_or_else(|| DecodeError::InvalidSignature {
                signature: signature.to_string(),
                reason: "unbalanced parentheses".to_string(),
            })?,
        None => trimmed,
    };

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner.split(',').map(ParamType::from_str).collect()
}

/// 以標準形式輸出簽章，例如 `uint` 會寫成 `uint256`
pub fn signature_string(params: &[ParamType]) -> String {
    let names: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("({})", names.join(","))
}
