use crate::abi::encode::padded_len;
use crate::abi::param::ParamType;
use crate::abi::token::Token;
use crate::abi::WORD_SIZE;
use crate::utils::error::DecodeError;
use alloy_primitives::U256;

/// Decodes an ABI tuple. Trailing bytes after the last tail are ignored, like
/// Solidity's `abi.decode`.
pub fn decode(params: &[ParamType], data: &[u8]) -> Result<Vec<Token>, DecodeError> {
    let head_len = params.len() * WORD_SIZE;
    if data.len() < head_len {
        return Err(DecodeError::Truncated {
            needed: head_len,
            actual: data.len(),
        });
    }

    params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let head = word_at(data, index * WORD_SIZE);
            match param {
                ParamType::Bool => match U256::from_be_slice(head) {
                    v if v == U256::ZERO => Ok(Token::Bool(false)),
                    v if v == U256::from(1u64) => Ok(Token::Bool(true)),
                    _ => Err(DecodeError::InvalidBool { index }),
                },
                ParamType::Uint(bits) => {
                    let value = U256::from_be_slice(head);
                    if value.bit_len() > *bits {
                        return Err(DecodeError::ValueOutOfRange {
                            index,
                            param: param.to_string(),
                        });
                    }
                    Ok(Token::Uint(value))
                }
                ParamType::String => {
                    let bytes = read_dynamic(data, index, head)?;
                    String::from_utf8(bytes.to_vec())
                        .map(Token::String)
                        .map_err(|_| DecodeError::InvalidUtf8 { index })
                }
                ParamType::Bytes => {
                    read_dynamic(data, index, head).map(|bytes| Token::Bytes(bytes.to_vec()))
                }
            }
        })
        .collect()
}

/// Accepts the payload with or without a `0x` prefix.
pub fn decode_hex(params: &[ParamType], hex_str: &str) -> Result<Vec<Token>, DecodeError> {
    let trimmed = hex_str.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let data = hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
    decode(params, &data)
}

fn word_at(data: &[u8], at: usize) -> &[u8] {
    &data[at..at + WORD_SIZE]
}

fn read_dynamic<'a>(data: &'a [u8], index: usize, head: &[u8]) -> Result<&'a [u8], DecodeError> {
    let out_of_bounds = |offset: &[u8]| DecodeError::OffsetOutOfBounds {
        index,
        offset: U256::from_be_slice(offset).to_string(),
    };

    let offset = word_to_usize(head).ok_or_else(|| out_of_bounds(head))?;
    let len_end = offset
        .checked_add(WORD_SIZE)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| out_of_bounds(head))?;

    let len_word = &data[offset..len_end];
    let len = word_to_usize(len_word).ok_or_else(|| out_of_bounds(len_word))?;
    let data_end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| DecodeError::Truncated {
            needed: len_end.saturating_add(padded_len(len)),
            actual: data.len(),
        })?;

    Ok(&data[len_end..data_end])
}

/// 只接受高 24 bytes 為零的 word，其餘視為越界
fn word_to_usize(word: &[u8]) -> Option<usize> {
    let (high, low) = word.split_at(WORD_SIZE - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::encode;

    #[test]
    fn test_decode_rejects_short_head() {
        let params = [ParamType::Uint(256), ParamType::Uint(256)];
        assert!(matches!(
            decode(&params, &[0u8; 40]),
            Err(DecodeError::Truncated { needed: 64, actual: 40 })
        ));
    }

    #[test]
    fn test_decode_rejects_offset_past_end() {
        let mut data = vec![0u8; 32];
        data[31] = 0x40;
        assert!(matches!(
            decode(&[ParamType::String], &data),
            Err(DecodeError::OffsetOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_huge_offset() {
        let data = vec![0xffu8; 64];
        assert!(matches!(
            decode(&[ParamType::Bytes], &data),
            Err(DecodeError::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_string_body() {
        let params = [ParamType::String];
        let mut data = encode(&params, &[Token::String("hello world".to_string())]).unwrap();
        data.truncate(64 + 5);
        assert!(matches!(
            decode(&params, &data),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let params = [ParamType::Bytes];
        let data = encode(&params, &[Token::Bytes(vec![0xff, 0xfe])]).unwrap();
        assert!(matches!(
            decode(&[ParamType::String], &data),
            Err(DecodeError::InvalidUtf8 { index: 0 })
        ));
    }

    #[test]
    fn test_decode_checks_uint_width_and_bool() {
        let mut data = vec![0u8; 32];
        data[30] = 1;
        assert!(matches!(
            decode(&[ParamType::Uint(8)], &data),
            Err(DecodeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            decode(&[ParamType::Bool], &data),
            Err(DecodeError::InvalidBool { index: 0 })
        ));
    }

    #[test]
    fn test_decode_hex_with_and_without_prefix() {
        let hex_payload = format!("{:0>64}", "2a");
        let expected = vec![Token::Uint(U256::from(42u64))];
        let params = [ParamType::Uint(256)];

        assert_eq!(decode_hex(&params, &hex_payload).unwrap(), expected);
        assert_eq!(decode_hex(&params, &format!("0x{}", hex_payload)).unwrap(), expected);
        assert!(matches!(
            decode_hex(&params, "0xnothex"),
            Err(DecodeError::InvalidHex(_))
        ));
    }
}
