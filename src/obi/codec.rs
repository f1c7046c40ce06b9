//! Encode/decode traits and the primitive implementations.

use crate::obi::{ObiError, ObiResult};

/// A value with a canonical OBI encoding.
pub trait ObiEncode {
    /// Append the encoding of `self` to `buf`.
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()>;
}

/// A value that can be read back from its OBI encoding.
pub trait ObiDecode: Sized {
    /// Decode one value from the front of `input`, advancing it.
    fn decode_from(input: &mut &[u8]) -> ObiResult<Self>;
}

/// Encode a value into a fresh buffer.
pub fn encode<T: ObiEncode + ?Sized>(value: &T) -> ObiResult<Vec<u8>> {
    let mut buf = Vec::new();
    value.encode_into(&mut buf)?;
    Ok(buf)
}

/// Decode a value, rejecting any bytes left over.
pub fn decode<T: ObiDecode>(bytes: &[u8]) -> ObiResult<T> {
    let mut input = bytes;
    let value = T::decode_from(&mut input)?;
    if !input.is_empty() {
        return Err(ObiError::TrailingBytes(input.len()));
    }
    Ok(value)
}

fn take<'a>(input: &mut &'a [u8], needed: usize) -> ObiResult<&'a [u8]> {
    if input.len() < needed {
        return Err(ObiError::UnexpectedEof {
            needed,
            remaining: input.len(),
        });
    }
    let (head, tail) = input.split_at(needed);
    *input = tail;
    Ok(head)
}

fn encode_len(len: usize, buf: &mut Vec<u8>) -> ObiResult<()> {
    let len = u32::try_from(len).map_err(|_| ObiError::LengthOverflow(len))?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn decode_len(input: &mut &[u8]) -> ObiResult<usize> {
    Ok(u32::decode_from(input)? as usize)
}

macro_rules! impl_obi_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ObiEncode for $ty {
                fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
                    buf.extend_from_slice(&self.to_be_bytes());
                    Ok(())
                }
            }

            impl ObiDecode for $ty {
                fn decode_from(input: &mut &[u8]) -> ObiResult<Self> {
                    let bytes = take(input, std::mem::size_of::<$ty>())?;
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    Ok(<$ty>::from_be_bytes(raw))
                }
            }
        )*
    };
}

impl_obi_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl ObiEncode for str {
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
        encode_len(self.len(), buf)?;
        buf.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl ObiEncode for String {
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
        self.as_str().encode_into(buf)
    }
}

impl ObiDecode for String {
    fn decode_from(input: &mut &[u8]) -> ObiResult<Self> {
        let len = decode_len(input)?;
        let bytes = take(input, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ObiError::InvalidUtf8)
    }
}

impl<T: ObiEncode> ObiEncode for [T] {
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
        encode_len(self.len(), buf)?;
        for item in self {
            item.encode_into(buf)?;
        }
        Ok(())
    }
}

impl<T: ObiEncode> ObiEncode for Vec<T> {
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
        self.as_slice().encode_into(buf)
    }
}

impl<T: ObiDecode> ObiDecode for Vec<T> {
    fn decode_from(input: &mut &[u8]) -> ObiResult<Self> {
        let count = decode_len(input)?;
        // Every element takes at least one byte, so the remaining input bounds the count.
        let mut items = Vec::with_capacity(count.min(input.len()));
        for _ in 0..count {
            items.push(T::decode_from(input)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(encode(&0x0102u16).unwrap(), vec![0x01, 0x02]);
        assert_eq!(encode(&-1i32).unwrap(), vec![0xff; 4]);
        assert_eq!(
            encode(&1_000_000_000u64).unwrap(),
            vec![0, 0, 0, 0, 0x3b, 0x9a, 0xca, 0x00]
        );
    }

    #[test]
    fn test_string_is_length_prefixed() {
        assert_eq!(encode("BTC").unwrap(), vec![0, 0, 0, 3, b'B', b'T', b'C']);
        assert_eq!(encode("").unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_vec_is_count_prefixed() {
        let bytes = encode(&vec![1u8, 2, 3]).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 3, 1, 2, 3]);
        assert_eq!(decode::<Vec<u8>>(&bytes).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let err = decode::<u64>(&[0, 1, 2]).unwrap_err();
        assert_eq!(err, ObiError::UnexpectedEof { needed: 8, remaining: 3 });

        // Declares five bytes, carries two.
        let err = decode::<String>(&[0, 0, 0, 5, b'a', b'b']).unwrap_err();
        assert!(matches!(err, ObiError::UnexpectedEof { needed: 5, .. }));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let err = decode::<u8>(&[7, 8]).unwrap_err();
        assert_eq!(err, ObiError::TrailingBytes(1));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode::<String>(&[0, 0, 0, 2, 0xc3, 0x28]).unwrap_err();
        assert_eq!(err, ObiError::InvalidUtf8);
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // A hostile count must fail on EOF rather than allocate 4G elements.
        let err = decode::<Vec<u64>>(&[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, ObiError::UnexpectedEof { .. }));
    }
}
