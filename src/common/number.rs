// src/common/number.rs

use arrayvec::ArrayVec;
use core::fmt;

/// Parses the leading integer of `text` the way configuration values are written.
///
/// A second character of `x` selects hexadecimal (`0x1F`), anything else is read as
/// decimal with an optional sign. Parsing stops at the first character that is not
/// part of the number, so `"12,3"` yields 12 and `"abc"` yields 0. Values wider than
/// 32 bits wrap, which lets `0xFFFFFFFF` stand for the all-ones bit pattern.
pub fn parse_int(text: &str) -> i32 {
    if text.as_bytes().get(1) == Some(&b'x') {
        // Byte 1 is ASCII, so byte 0 is a single-byte char and index 2 is a boundary.
        return parse_radix(&text[2..], 16);
    }
    parse_radix(text, 10)
}

fn parse_radix(text: &str, radix: u32) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value.wrapping_mul(i64::from(radix)).wrapping_add(i64::from(d)),
            None => break,
        }
    }
    if negative {
        value = value.wrapping_neg();
    }
    value as i32
}

/// Converts a hex string (`"C8C8C4"`) into at most `N` bytes, MSB first.
///
/// Characters below `'0'` (spaces, commas, dashes) are skipped as separators and
/// the first control character ends the input. An odd trailing nibble is treated
/// as the high nibble of a last byte. Returns `None` on a non-hex character.
pub fn parse_hex_bytes<const N: usize>(text: &str) -> Option<ArrayVec<u8, N>> {
    let mut bytes = ArrayVec::new();
    let mut high: Option<u8> = None;

    for c in text.chars() {
        if c < ' ' {
            break;
        }
        if c < '0' {
            continue;
        }
        let nibble = c.to_digit(16)? as u8;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => {
                if bytes.try_push((h << 4) | nibble).is_err() {
                    return Some(bytes);
                }
            }
        }
    }
    if let Some(h) = high {
        let _ = bytes.try_push(h << 4);
    }
    Some(bytes)
}

/// Writes the `width` least significant bytes of `value` as uppercase hex,
/// most significant byte first, dropping leading zero bytes but always keeping one.
pub fn write_trimmed_hex<W: fmt::Write>(out: &mut W, value: i32, width: usize) -> fmt::Result {
    let bytes = value.to_le_bytes();
    let mut size = width.clamp(1, bytes.len());
    while size > 1 && bytes[size - 1] == 0 {
        size -= 1;
    }
    for byte in bytes[..size].iter().rev() {
        write!(out, "{:02X}", byte)?;
    }
    Ok(())
}

/// `Display` adapter printing a byte slice as contiguous uppercase hex (`"34120500"`).
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
