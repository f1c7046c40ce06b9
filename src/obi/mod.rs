//! OBI calldata encoding.
//!
//! # Wire Format
//! ```text
//! u8..u64, i8..i64  → big-endian, natural width
//! String            → u32 byte length (BE) ‖ UTF-8 bytes
//! Vec<T>            → u32 element count (BE) ‖ each element in order
//! struct            → fields in declaration order, no tags
//! ```
//!
//! # Design Decisions
//! - Encoding is pure and deterministic: same value, same bytes
//! - Decoding is strict: the whole input must be consumed
//! - Only lengths above `u32::MAX` can make encoding fail

pub mod codec;
pub mod input;

pub use codec::{decode, encode, ObiDecode, ObiEncode};
pub use input::{PriceInput, PRICE_MULTIPLIER};

use thiserror::Error;

/// Errors produced by the OBI codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObiError {
    /// A string or sequence is too long for its `u32` length prefix.
    #[error("length {0} does not fit in a u32 prefix")]
    LengthOverflow(usize),

    /// The input ended before a value was complete.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A string field held bytes that are not UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Bytes were left over after decoding the top-level value.
    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),
}

/// Result type for OBI operations.
pub type ObiResult<T> = Result<T, ObiError>;
