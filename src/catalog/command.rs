// src/catalog/command.rs

use crate::common::compiler::split_hex_hint;
use crate::common::decoder::FieldWidth;
use crate::common::number::parse_int;
use alloc::string::String;

/// One `R:` entry: `label[*w][[count]]=expression[#]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCommand {
    raw: String,
    eq: usize,
}

impl ReadCommand {
    /// Returns `None` if the line has no `=`.
    pub fn parse(text: &str) -> Option<Self> {
        let eq = text.find('=')?;
        Some(ReadCommand { raw: String::from(text), eq })
    }

    /// Full `head=expression` text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Everything before `=`, e.g. `Temp*2[4]`.
    pub fn head(&self) -> &str {
        &self.raw[..self.eq]
    }

    /// Name without width or count suffixes.
    pub fn label(&self) -> &str {
        let head = self.head();
        let end = head.find(['*', '[']).unwrap_or(head.len());
        &head[..end]
    }

    /// Payload expression, `#` hint included.
    pub fn expression(&self) -> &str {
        &self.raw[self.eq + 1..]
    }

    pub fn width(&self) -> FieldWidth {
        FieldWidth::from_head(self.head())
    }

    /// Whether responses are shown in hex.
    pub fn is_hex(&self) -> bool {
        split_hex_hint(self.expression()).1
    }

    /// Element count for `name[count]` heads, only when it asks for more than one.
    pub fn array_len(&self) -> Option<u32> {
        let head = self.head();
        if !head.ends_with(']') {
            return None;
        }
        let open = head.find('[')?;
        let count = parse_int(&head[open + 1..]);
        (count > 1).then_some(count as u32)
    }

    /// Whether a batch reference names this command. The reference must be a
    /// prefix of the entry that ends right before `=`, `*` or `[`.
    pub fn matches_reference(&self, reference: &str) -> bool {
        !reference.is_empty()
            && self.raw.starts_with(reference)
            && matches!(self.raw.as_bytes().get(reference.len()), Some(b'=' | b'*' | b'['))
    }
}

/// A `W:`/`S:` definition resolved for one batch assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteDefinition<'a> {
    pub name: &'a str,
    /// Byte width from a `name*w=` head.
    pub width: Option<u8>,
    pub expression: &'a str,
}

impl<'a> WriteDefinition<'a> {
    /// Parses the text after the `W:`/`S:` prefix.
    pub fn parse(body: &'a str) -> Option<Self> {
        let (head, expression) = body.split_once('=')?;
        let (name, width) = match head.as_bytes() {
            [.., b'*', d @ b'1'..=b'4'] => (&head[..head.len() - 2], Some(d - b'0')),
            _ => (head, None),
        };
        Some(WriteDefinition { name, width, expression })
    }

    /// Array index advance per element.
    pub fn step(&self) -> u8 {
        self.width.unwrap_or(1)
    }

    /// Restricts a value to the declared width; unsized definitions pass it through.
    pub fn mask(&self, value: i32) -> i32 {
        match self.width {
            Some(1) => value & 0xFF,
            Some(2) => value & 0xFFFF,
            Some(3) => value & 0x00FF_FFFF,
            _ => value,
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_command_parts() {
        let cmd = ReadCommand::parse("Temp*2[4]=1,i:0#").unwrap();
        assert_eq!(cmd.head(), "Temp*2[4]");
        assert_eq!(cmd.label(), "Temp");
        assert_eq!(cmd.expression(), "1,i:0#");
        assert_eq!(cmd.width(), FieldWidth::Bytes(2));
        assert!(cmd.is_hex());
        assert_eq!(cmd.array_len(), Some(4));
    }

    #[test]
    fn test_read_command_without_equals() {
        assert!(ReadCommand::parse("Broken").is_none());
    }

    #[test]
    fn test_single_element_is_not_array() {
        let cmd = ReadCommand::parse("One[1]=i:0").unwrap();
        assert_eq!(cmd.array_len(), None);
        let plain = ReadCommand::parse("Plain=1").unwrap();
        assert_eq!(plain.array_len(), None);
    }

    #[test]
    fn test_matches_reference() {
        let cmd = ReadCommand::parse("Temp*2=1").unwrap();
        assert!(cmd.matches_reference("Temp"));
        assert!(!cmd.matches_reference("Tem"));
        assert!(!cmd.matches_reference(""));

        let arr = ReadCommand::parse("Arr[3]=i:0").unwrap();
        assert!(arr.matches_reference("Arr"));

        let plain = ReadCommand::parse("Mode=2").unwrap();
        assert!(plain.matches_reference("Mode"));
        assert!(!plain.matches_reference("Mod"));
    }

    #[test]
    fn test_write_definition() {
        let def = WriteDefinition::parse("Speed*2=3,n").unwrap();
        assert_eq!(def.name, "Speed");
        assert_eq!(def.width, Some(2));
        assert_eq!(def.step(), 2);
        assert_eq!(def.mask(0x12345), 0x2345);

        let plain = WriteDefinition::parse("Mode=4,n").unwrap();
        assert_eq!(plain.name, "Mode");
        assert_eq!(plain.width, None);
        assert_eq!(plain.step(), 1);
        assert_eq!(plain.mask(-1), -1);
    }
}
