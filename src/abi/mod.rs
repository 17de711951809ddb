//! Solidity ABI tuple encoding.
//!
//! Values are laid out as 32-byte words in two regions:
//!
//! | Type        | Head word                                  | Tail                                       |
//! |-------------|--------------------------------------------|--------------------------------------------|
//! | `uint<N>`   | big-endian value, left-padded with zeros   | none                                       |
//! | `bool`      | `0` or `1`                                 | none                                       |
//! | `string`    | byte offset of the tail, from tuple start  | length word + UTF-8 bytes, right-padded    |
//! | `bytes`     | byte offset of the tail, from tuple start  | length word + raw bytes, right-padded      |
//!
//! Heads appear in declaration order, tails in the order their offsets appear in the head.
//! The output is what `abi.decode(data, (string, uint256, uint256))` expects on-chain.
//!
//! ```rust
//! use oracle_etl::abi::{decode, encode, parse_signature, Token};
//! use alloy_primitives::U256;
//!
//! let params = parse_signature("(string,uint256)").unwrap();
//! let tokens = vec![Token::String("hi".into()), Token::Uint(U256::from(7u64))];
//!
//! let bytes = encode(&params, &tokens).unwrap();
//! assert_eq!(bytes.len(), 32 * 4); // two heads, one length word, one data word
//! assert_eq!(decode(&params, &bytes).unwrap(), tokens);
//! ```

pub mod decode;
pub mod encode;
pub mod param;
pub mod token;

pub use decode::{decode, decode_hex};
pub use encode::{encode, encode_json};
pub use param::{parse_signature, signature_string, ParamType};
pub use token::Token;

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// `0x`-prefixed lowercase hex, the form the on-chain tooling prints.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
