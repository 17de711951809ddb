use crate::abi::param::ParamType;
use crate::abi::token::{check_width, Token};
use crate::abi::WORD_SIZE;
use crate::utils::error::EncodeError;
use alloy_primitives::U256;
use serde_json::Value;

/// Encodes `tokens` as the ABI tuple described by `params`.
pub fn encode(params: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    if params.len() != tokens.len() {
        return Err(EncodeError::LengthMismatch {
            expected: params.len(),
            actual: tokens.len(),
        });
    }

    for (index, (param, token)) in params.iter().zip(tokens).enumerate() {
        if !token.matches(param) {
            return Err(EncodeError::TypeMismatch {
                index,
                param: param.to_string(),
                value: token.to_string(),
            });
        }
        if let (ParamType::Uint(bits), Token::Uint(value)) = (param, token) {
            check_width(index, *bits, *value)?;
        }
    }

    Ok(encode_tokens(tokens))
}

/// Coerces JSON values to tokens, then encodes them.
pub fn encode_json(params: &[ParamType], values: &[Value]) -> Result<Vec<u8>, EncodeError> {
    if params.len() != values.len() {
        return Err(EncodeError::LengthMismatch {
            expected: params.len(),
            actual: values.len(),
        });
    }

    let tokens = params
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (param, value))| Token::from_json(index, param, value))
        .collect::<Result<Vec<_>, _>>()?;

    encode(params, &tokens)
}

fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD_SIZE;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Bool(b) => head.extend_from_slice(&usize_word(usize::from(*b))),
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::String(s) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                append_dynamic(&mut tail, s.as_bytes());
            }
            Token::Bytes(bytes) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                append_dynamic(&mut tail, bytes);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn append_dynamic(tail: &mut Vec<u8>, data: &[u8]) {
    tail.extend_from_slice(&usize_word(data.len()));
    tail.extend_from_slice(data);
    let padding = padded_len(data.len()) - data.len();
    tail.resize(tail.len() + padding, 0);
}

pub(crate) fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

fn uint_word(value: U256) -> [u8; WORD_SIZE] {
    value.to_be_bytes::<WORD_SIZE>()
}

fn usize_word(n: usize) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}
