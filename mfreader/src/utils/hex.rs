//! Hexadecimal helpers for UIDs, keys and block dumps.

use std::fmt::Write;

/// Convert a byte slice to a lowercase hex string without separators.
///
/// Example: `&[0xde, 0xad]` -> `"dead"`
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        // write! never fails writing to a String
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Uppercase hex with `separator` between bytes, the form card tools
/// usually print UIDs in.
///
/// Example: `(&[0x0a, 0xff], ":")` -> `"0A:FF"`
pub fn bytes_to_hex_separated(bytes: &[u8], separator: &str) -> String {
    let mut s = String::with_capacity(bytes.len() * (2 + separator.len()));
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push_str(separator);
        }
        let _ = write!(s, "{:02X}", b);
    }
    s
}

/// Lowercase hex with a single space between bytes.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    bytes_to_hex_separated(bytes, " ").to_ascii_lowercase()
}

/// Parse a hex string into bytes.
///
/// ASCII whitespace, `:` and `-` are accepted as separators. Returns an
/// error message string on parse failure.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if digits.len() % 2 != 0 {
        return Err("hex string has odd length".to_string());
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).map_err(|e| format!("invalid hex pair '{}': {}", pair, e))
        })
        .collect()
}
