//! Unpadded RFC 4648 Base32 codec.
//!
//! OTP secrets travel in this encoding. No `=` padding is emitted or
//! accepted; the final partial group is zero-padded on encode and the
//! leftover bits are dropped on decode, so `decode(encode(b)) == b`
//! for every byte sequence `b`.

use crate::error::AuthError;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encode bytes into unpadded Base32 text.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode unpadded Base32 text into bytes.
///
/// Case-insensitive. `0` and `1` are accepted as aliases for `O` and
/// `I` to be forgiving with hand-typed secrets. Any other character
/// outside the alphabet fails with [`AuthError::InvalidEncoding`].
pub fn decode(text: &str) -> Result<Vec<u8>, AuthError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for ch in text.bytes() {
        let symbol = symbol_value(ch).ok_or(AuthError::InvalidEncoding)?;
        buffer = (buffer << 5) | u32::from(symbol);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}

fn symbol_value(ch: u8) -> Option<u8> {
    match ch.to_ascii_uppercase() {
        c @ b'A'..=b'Z' => Some(c - b'A'),
        c @ b'2'..=b'7' => Some(c - b'2' + 26),
        b'0' => Some(14), // O
        b'1' => Some(8),  // I
        _ => None,
    }
}
