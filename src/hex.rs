use std::fmt::Write;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("no hex digits")]
    Empty,
    #[error("odd hex length")]
    OddLength,
    #[error("bad hex digit in {0:?}")]
    BadDigit(String),
}

/// Colon separated uppercase hex, e.g. `00:2A:FF`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push(':');
        }
        let _ = write!(s, "{:02X}", b);
    }
    s
}

/// Parse opcode bytes as typed on a command line.
///
/// Accepts an optional `0x` prefix and `:`, `,`, `-` or whitespace between
/// bytes: `01`, `0x01`, `01:02`, `0102` and `0x01 0x02` are all valid.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let mut digits = String::with_capacity(input.len());
    for tok in input.split(|c: char| c == ':' || c == ',' || c == '-' || c.is_whitespace()) {
        let tok = tok
            .strip_prefix("0x")
            .or_else(|| tok.strip_prefix("0X"))
            .unwrap_or(tok);
        digits.push_str(tok);
    }
    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).ok_or_else(|| HexError::BadDigit(digits.clone()))?;
            if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(HexError::BadDigit(pair.to_string()));
            }
            u8::from_str_radix(pair, 16).map_err(|_| HexError::BadDigit(pair.to_string()))
        })
        .collect()
}
