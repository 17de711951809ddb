use crate::abi::param::ParamType;
use crate::utils::error::EncodeError;
use alloy_primitives::U256;
use serde_json::Value;
use std::fmt;

/// A typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Bool(bool),
    Uint(U256),
    String(String),
    Bytes(Vec<u8>),
}

impl Token {
    pub fn matches(&self, param: &ParamType) -> bool {
        matches!(
            (self, param),
            (Token::Bool(_), ParamType::Bool)
                | (Token::Uint(_), ParamType::Uint(_))
                | (Token::String(_), ParamType::String)
                | (Token::Bytes(_), ParamType::Bytes)
        )
    }

    /// Coerces a loosely typed JSON value into a token of the given type.
    ///
    /// Unsigned integers accept JSON numbers, decimal strings and `0x` hex strings.
    /// Negative, fractional or too-wide values are rejected rather than wrapped.
    pub fn from_json(index: usize, param: &ParamType, value: &Value) -> Result<Token, EncodeError> {
        let mismatch = || EncodeError::TypeMismatch {
            index,
            param: param.to_string(),
            value: value.to_string(),
        };

        match param {
            ParamType::Bool => value.as_bool().map(Token::Bool).ok_or_else(mismatch),
            ParamType::String => value
                .as_str()
                .map(|s| Token::String(s.to_string()))
                .ok_or_else(mismatch),
            ParamType::Bytes => {
                let s = value.as_str().ok_or_else(mismatch)?;
                let digits = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(digits)
                    .map(Token::Bytes)
                    .map_err(|_| EncodeError::InvalidBytes {
                        index,
                        value: s.to_string(),
                    })
            }
            ParamType::Uint(bits) => {
                let uint = match value {
                    Value::Number(n) => uint_from_number(index, param, n)?,
                    Value::String(s) => uint_from_str(index, param, s)?,
                    _ => return Err(mismatch()),
                };
                check_width(index, *bits, uint)?;
                Ok(Token::Uint(uint))
            }
        }
    }
}

pub(crate) fn check_width(index: usize, bits: usize, value: U256) -> Result<(), EncodeError> {
    if value.bit_len() > bits {
        return Err(EncodeError::Overflow {
            index,
            param: format!("uint{}", bits),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn uint_from_number(
    index: usize,
    param: &ParamType,
    n: &serde_json::Number,
) -> Result<U256, EncodeError> {
    if let Some(u) = n.as_u64() {
        return Ok(U256::from(u));
    }
    if n.as_i64().is_some() {
        return Err(EncodeError::Negative {
            index,
            param: param.to_string(),
            value: n.to_string(),
        });
    }

    let f = n.as_f64().unwrap_or(f64::NAN);
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(EncodeError::NotAnInteger {
            index,
            value: n.to_string(),
        });
    }
    if f < 0.0 {
        return Err(EncodeError::Negative {
            index,
            param: param.to_string(),
            value: n.to_string(),
        });
    }
    // {:.0} 會輸出 f64 整數值的完整十進位表示
    uint_from_str(index, param, &format!("{:.0}", f))
}

fn uint_from_str(index: usize, param: &ParamType, raw: &str) -> Result<U256, EncodeError> {
    let s = raw.trim();
    let not_an_integer = || EncodeError::NotAnInteger {
        index,
        value: raw.to_string(),
    };

    if let Some(rest) = s.strip_prefix('-') {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            if rest.bytes().all(|b| b == b'0') {
                return Ok(U256::ZERO);
            }
            return Err(EncodeError::Negative {
                index,
                param: param.to_string(),
                value: raw.to_string(),
            });
        }
        return Err(not_an_integer());
    }

    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => (hex_digits, 16),
        None => (s, 10),
    };

    let valid = !digits.is_empty()
        && digits.chars().all(|c| {
            if radix == 16 {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        });
    if !valid {
        return Err(not_an_integer());
    }

    // 字元已驗證過，解析失敗只可能是超出 256 位元
    U256::from_str_radix(digits, radix).map_err(|_| EncodeError::Overflow {
        index,
        param: param.to_string(),
        value: raw.to_string(),
    })
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bool(b) => write!(f, "{}", b),
            Token::Uint(u) => write!(f, "{}", u),
            Token::String(s) => write!(f, "{}", s),
            Token::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UINT: ParamType = ParamType::Uint(256);

    #[test]
    fn test_uint_from_number_and_strings() {
        assert_eq!(
            Token::from_json(0, &UINT, &json!(1998)).unwrap(),
            Token::Uint(U256::from(1998u64))
        );
        assert_eq!(
            Token::from_json(0, &UINT, &json!("5000")).unwrap(),
            Token::Uint(U256::from(5000u64))
        );
        assert_eq!(
            Token::from_json(0, &UINT, &json!("0xff")).unwrap(),
            Token::Uint(U256::from(255u64))
        );
        assert_eq!(
            Token::from_json(0, &UINT, &json!(1e20)).unwrap(),
            Token::Uint(U256::from(100_000_000_000_000_000_000u128))
        );
    }

    #[test]
    fn test_uint_rejects_negative() {
        assert!(matches!(
            Token::from_json(2, &UINT, &json!(-1)),
            Err(EncodeError::Negative { index: 2, .. })
        ));
        assert!(matches!(
            Token::from_json(0, &UINT, &json!("-1")),
            Err(EncodeError::Negative { .. })
        ));
    }

    #[test]
    fn test_uint_rejects_fractions_and_garbage() {
        assert!(matches!(
            Token::from_json(0, &UINT, &json!(5000.9)),
            Err(EncodeError::NotAnInteger { .. })
        ));
        assert!(matches!(
            Token::from_json(0, &UINT, &json!("12abc")),
            Err(EncodeError::NotAnInteger { .. })
        ));
        assert!(matches!(
            Token::from_json(0, &UINT, &json!(null)),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_uint_respects_declared_width() {
        let uint8 = ParamType::Uint(8);
        assert!(Token::from_json(0, &uint8, &json!(255)).is_ok());
        assert!(matches!(
            Token::from_json(0, &uint8, &json!(256)),
            Err(EncodeError::Overflow { .. })
        ));
    }

    #[test]
    fn test_bytes_from_hex() {
        assert_eq!(
            Token::from_json(0, &ParamType::Bytes, &json!("0xdeadbeef")).unwrap(),
            Token::Bytes(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert!(matches!(
            Token::from_json(0, &ParamType::Bytes, &json!("0xzz")),
            Err(EncodeError::InvalidBytes { .. })
        ));
    }

    #[test]
    fn test_string_requires_json_string() {
        assert!(matches!(
            Token::from_json(0, &ParamType::String, &json!(42)),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }
}
