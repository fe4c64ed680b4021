// src/common/decoder.rs

use super::number::write_trimmed_hex;
use alloc::string::String;
use core::fmt::Write;

/// How a response value is laid out on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// Little-endian integer of 1..=4 bytes.
    Bytes(u8),
    /// One character per response, NUL terminated.
    Text,
}

impl FieldWidth {
    /// Width from a read command head: `name*2` is two bytes, `name*` (or any
    /// other suffix) is text, no `*` is one byte.
    pub fn from_head(head: &str) -> Self {
        match head.split_once('*') {
            None => FieldWidth::Bytes(1),
            Some((_, rest)) => match rest.as_bytes().first() {
                Some(d @ b'1'..=b'4') => FieldWidth::Bytes(d - b'0'),
                _ => FieldWidth::Text,
            },
        }
    }

    /// Amount an array index advances per element.
    pub fn step(self) -> u8 {
        match self {
            FieldWidth::Bytes(n) => n,
            FieldWidth::Text => 0,
        }
    }
}

/// A decoded response value and its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedValue {
    pub text: String,
    pub value: i32,
}

/// Reads a little-endian integer of `width` bytes. Width 1, 2 and 4 are signed,
/// width 3 is unsigned. Missing bytes read as zero.
pub fn field_value(raw: &[u8], width: u8) -> i32 {
    let mut b = [0u8; 4];
    let n = usize::from(width.min(4)).min(raw.len());
    b[..n].copy_from_slice(&raw[..n]);
    match width {
        1 => i32::from(b[0] as i8),
        2 => i32::from(i16::from_le_bytes([b[0], b[1]])),
        3 => (u32::from_le_bytes(b) & 0x00FF_FFFF) as i32,
        _ => i32::from_le_bytes(b),
    }
}

/// Formats a received value.
///
/// Hex: `0x` plus the value's bytes without leading zero bytes (`0x12`).
/// Decimal: `0`..`9` plain, anything else followed by its hex form (`300 (012C)`).
/// Text: the character itself, empty for the NUL terminator.
pub fn decode(raw: &[u8], width: FieldWidth, as_hex: bool) -> DecodedValue {
    let mut text = String::new();
    let value = match width {
        FieldWidth::Text => {
            let value = i32::from(raw.first().copied().unwrap_or(0));
            if value != 0 {
                text.push(char::from(value as u8));
            }
            value
        }
        FieldWidth::Bytes(n) => {
            let value = field_value(raw, n);
            // Writing into a String never fails.
            let _ = write_number(&mut text, value, usize::from(n), as_hex);
            value
        }
    };
    DecodedValue { text, value }
}

fn write_number(text: &mut String, value: i32, width: usize, as_hex: bool) -> core::fmt::Result {
    if as_hex {
        text.push_str("0x");
        return write_trimmed_hex(text, value, width);
    }
    if (0..=9).contains(&value) {
        return write!(text, "{}", value);
    }
    write!(text, "{} (", value)?;
    write_trimmed_hex(text, value, width)?;
    text.write_char(')')
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_head() {
        assert_eq!(FieldWidth::from_head("Temp"), FieldWidth::Bytes(1));
        assert_eq!(FieldWidth::from_head("Temp*2"), FieldWidth::Bytes(2));
        assert_eq!(FieldWidth::from_head("Arr*4[3]"), FieldWidth::Bytes(4));
        assert_eq!(FieldWidth::from_head("Name*"), FieldWidth::Text);
        assert_eq!(FieldWidth::from_head("Name*5"), FieldWidth::Text);
        assert_eq!(FieldWidth::from_head("Name*0"), FieldWidth::Text);
    }

    #[test]
    fn test_signedness_by_width() {
        assert_eq!(field_value(&[0xFF], 1), -1);
        assert_eq!(field_value(&[0xFE, 0xFF], 2), -2);
        assert_eq!(field_value(&[0xFF, 0xFF, 0xFF], 3), 0x00FF_FFFF);
        assert_eq!(field_value(&[0xFF, 0xFF, 0xFF, 0xFF], 4), -1);
        assert_eq!(field_value(&[0x2C], 2), 0x2C);
    }

    #[test]
    fn test_decimal_text() {
        assert_eq!(decode(&[7], FieldWidth::Bytes(1), false).text, "7");
        assert_eq!(decode(&[0x2C, 0x01], FieldWidth::Bytes(2), false).text, "300 (012C)");
        assert_eq!(decode(&[0xC8], FieldWidth::Bytes(1), false).text, "-56 (C8)");
    }

    #[test]
    fn test_hex_text() {
        let decoded = decode(&[0x12, 0x00], FieldWidth::Bytes(2), true);
        assert_eq!(decoded.text, "0x12");
        assert_eq!(decoded.value, 0x12);
        assert_eq!(decode(&[0x00, 0x00], FieldWidth::Bytes(2), true).text, "0x00");
        assert_eq!(decode(&[0xAB, 0xCD, 0x01], FieldWidth::Bytes(3), true).text, "0x01CDAB");
    }

    #[test]
    fn test_text_chars() {
        let decoded = decode(&[b'H'], FieldWidth::Text, false);
        assert_eq!(decoded.text, "H");
        assert_eq!(decoded.value, i32::from(b'H'));

        let end = decode(&[0], FieldWidth::Text, false);
        assert!(end.text.is_empty());
        assert_eq!(end.value, 0);
    }

    #[test]
    fn test_short_frame_reads_zero() {
        assert_eq!(decode(&[], FieldWidth::Bytes(2), false).text, "0");
    }
}
