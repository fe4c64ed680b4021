// src/common/schema.rs

use super::error::ConfigError;
use super::number::parse_int;
use arrayvec::ArrayVec;

/// Maximum radio payload size in bytes.
pub const MAX_PAYLOAD: usize = 32;

/// Maximum number of payload fields.
pub const MAX_FIELDS: usize = 31;

/// Fixed-size outgoing payload buffer.
pub type PayloadBuf = [u8; MAX_PAYLOAD];

/// Ordered list of field widths (1..=4 bytes each) making up every outgoing payload.
///
/// Built from the `Payload struct:` line, e.g. `2,1,1`. The total never exceeds
/// [`MAX_PAYLOAD`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    widths: ArrayVec<u8, MAX_FIELDS>,
    size: usize,
}

impl FieldSchema {
    pub fn new(widths: &[u8]) -> Result<Self, ConfigError> {
        let mut schema = FieldSchema::default();
        for &width in widths {
            schema.push(i32::from(width))?;
        }
        Ok(schema)
    }

    /// Parses a comma separated width list.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut schema = FieldSchema::default();
        for item in text.split(',') {
            if schema.widths.is_full() {
                return Err(ConfigError::TooManyFields);
            }
            schema.push(parse_int(item.trim()))?;
        }
        Ok(schema)
    }

    fn push(&mut self, width: i32) -> Result<(), ConfigError> {
        if !(1..=4).contains(&width) {
            return Err(ConfigError::InvalidFieldWidth(width));
        }
        let size = self.size + width as usize;
        if size > MAX_PAYLOAD {
            return Err(ConfigError::PayloadTooLarge(size));
        }
        self.widths
            .try_push(width as u8)
            .map_err(|_| ConfigError::TooManyFields)?;
        self.size = size;
        Ok(())
    }

    pub fn widths(&self) -> &[u8] {
        &self.widths
    }

    pub fn field_count(&self) -> usize {
        self.widths.len()
    }

    /// Total payload size in bytes.
    pub fn payload_size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Byte offset and width of every field, in order.
    pub fn layout(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.widths.iter().scan(0usize, |offset, &width| {
            let start = *offset;
            *offset += usize::from(width);
            Some((start, width))
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_parse_schema() {
        let schema = FieldSchema::parse("2,1,1").unwrap();
        assert_eq!(schema.widths(), &[2, 1, 1]);
        assert_eq!(schema.payload_size(), 4);
        assert_eq!(schema.field_count(), 3);
    }

    #[test]
    fn test_layout_offsets() {
        let schema = FieldSchema::new(&[2, 4, 1]).unwrap();
        let layout: Vec<(usize, u8)> = schema.layout().collect();
        assert_eq!(layout, [(0, 2), (2, 4), (6, 1)]);
    }

    #[test]
    fn test_rejects_bad_width() {
        assert_eq!(FieldSchema::parse("2,5"), Err(ConfigError::InvalidFieldWidth(5)));
        assert_eq!(FieldSchema::parse("1,,1"), Err(ConfigError::InvalidFieldWidth(0)));
    }

    #[test]
    fn test_rejects_oversized_payload() {
        // 8 * 4 = 32 fits exactly, one more byte does not
        assert!(FieldSchema::parse("4,4,4,4,4,4,4,4").is_ok());
        assert_eq!(
            FieldSchema::parse("4,4,4,4,4,4,4,4,1"),
            Err(ConfigError::PayloadTooLarge(33))
        );
    }
}
