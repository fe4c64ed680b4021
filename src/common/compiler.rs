// src/common/compiler.rs

use super::constants::ConstantStore;
use super::error::CompileError;
use super::number::parse_int;
use super::schema::{FieldSchema, PayloadBuf, MAX_PAYLOAD};
use alloc::string::ToString;

/// Expression suffix asking for hexadecimal display of the response.
pub const HEX_HINT: char = '#';

/// Splits a trailing `#` off an expression. Returns the body and whether it was present.
pub fn split_hex_hint(expr: &str) -> (&str, bool) {
    match expr.strip_suffix(HEX_HINT) {
        Some(body) => (body, true),
        None => (expr, false),
    }
}

/// Result of compiling one expression into a fresh buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub payload: PayloadBuf,
    /// Byte offset of the field written by an `i:` token, if any.
    pub array_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'t> {
    Literal(i32),
    ArrayIndex(i32),
    External,
    Constant(&'t str),
    Skip,
}

fn classify(token: &str) -> Result<Token<'_>, CompileError> {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return Ok(Token::Skip);
    };
    if first.is_ascii_digit() {
        return Ok(Token::Literal(parse_int(token)));
    }
    if let Some(rest) = token.strip_prefix("i:") {
        return Ok(Token::ArrayIndex(parse_int(rest)));
    }
    if first == 'n' && chars.next().map_or(true, |c| c < '0') {
        return Ok(Token::External);
    }
    if first.is_ascii_alphabetic() || first == '_' {
        return Ok(Token::Constant(token));
    }
    Err(CompileError::BadToken(first))
}

/// Turns comma separated payload expressions into little-endian field bytes.
///
/// One token per schema field:
/// - a leading digit is a literal (`12`, `0x1F`)
/// - `i:<v>` writes `v` and marks that field as the array index
/// - `n` is the caller-supplied value (0 if none)
/// - a name is looked up in the constant store
/// - an empty token leaves the field untouched
///
/// Compilation stops quietly when tokens or fields run out, so short expressions
/// only fill the leading fields.
#[derive(Debug, Clone, Copy)]
pub struct PayloadCompiler<'a> {
    schema: &'a FieldSchema,
    constants: &'a ConstantStore,
}

impl<'a> PayloadCompiler<'a> {
    pub fn new(schema: &'a FieldSchema, constants: &'a ConstantStore) -> Self {
        PayloadCompiler { schema, constants }
    }

    /// Compiles into a zeroed buffer.
    pub fn compile(&self, expr: &str, external: Option<i32>) -> Result<Compiled, CompileError> {
        let mut payload = [0u8; MAX_PAYLOAD];
        let array_index = self.compile_into(expr, external, &mut payload)?;
        Ok(Compiled { payload, array_index })
    }

    /// Compiles on top of an existing buffer. Fields covered by skipped or
    /// missing tokens keep their bytes, which is how defaults get layered.
    pub fn compile_into(
        &self,
        expr: &str,
        external: Option<i32>,
        payload: &mut PayloadBuf,
    ) -> Result<Option<usize>, CompileError> {
        let (body, _) = split_hex_hint(expr);
        let mut array_index = None;
        let mut fields = self.schema.layout();

        for token in body.split(',') {
            let Some((offset, width)) = fields.next() else {
                break;
            };
            if offset >= MAX_PAYLOAD {
                break;
            }
            let width = usize::from(width);
            let value = match classify(token)? {
                Token::Skip => continue,
                Token::Literal(v) => v,
                Token::ArrayIndex(v) => {
                    array_index = Some(offset);
                    v
                }
                Token::External => external.unwrap_or(0),
                Token::Constant(name) => self
                    .constants
                    .resolve(name)
                    .ok_or_else(|| CompileError::ConstantNotFound(name.to_string()))?,
            };
            let Some(slot) = payload.get_mut(offset..offset + width) else {
                break;
            };
            slot.copy_from_slice(&value.to_le_bytes()[..width]);
        }
        Ok(array_index)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn constants() -> ConstantStore {
        let mut store = ConstantStore::new();
        store.append_line("ADDR=0x1234;FLAG=1").unwrap();
        store
    }

    #[test]
    fn test_literal_fields_little_endian() {
        let schema = FieldSchema::new(&[2, 1, 1]).unwrap();
        let consts = ConstantStore::new();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("0x1234,5", None).unwrap();
        assert_eq!(&compiled.payload[..4], &[0x34, 0x12, 0x05, 0x00]);
        assert_eq!(compiled.array_index, None);
    }

    #[test]
    fn test_constants_and_external() {
        let schema = FieldSchema::new(&[2, 1, 4]).unwrap();
        let consts = constants();
        let compiled = PayloadCompiler::new(&schema, &consts)
            .compile("ADDR,FLAG,n", Some(-2))
            .unwrap();
        assert_eq!(&compiled.payload[..7], &[0x34, 0x12, 0x01, 0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_external_defaults_to_zero() {
        let schema = FieldSchema::new(&[1, 1]).unwrap();
        let consts = ConstantStore::new();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("7,n", None).unwrap();
        assert_eq!(&compiled.payload[..2], &[7, 0]);
    }

    #[test]
    fn test_array_index_marker() {
        let schema = FieldSchema::new(&[1, 2, 1]).unwrap();
        let consts = ConstantStore::new();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("3,i:0x10,9", None).unwrap();
        assert_eq!(compiled.array_index, Some(1));
        assert_eq!(&compiled.payload[..4], &[3, 0x10, 0, 9]);
    }

    #[test]
    fn test_skip_keeps_layered_bytes() {
        let schema = FieldSchema::new(&[1, 1, 1]).unwrap();
        let consts = ConstantStore::new();
        let compiler = PayloadCompiler::new(&schema, &consts);
        let mut payload = [0u8; MAX_PAYLOAD];
        compiler.compile_into("1,2,3", None, &mut payload).unwrap();
        compiler.compile_into(",9", None, &mut payload).unwrap();
        assert_eq!(&payload[..3], &[1, 9, 3]);
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let schema = FieldSchema::new(&[1]).unwrap();
        let consts = ConstantStore::new();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("1,2,3", None).unwrap();
        assert_eq!(&compiled.payload[..2], &[1, 0]);
    }

    #[test]
    fn test_hex_hint_stripped() {
        assert_eq!(split_hex_hint("FLAG#"), ("FLAG", true));
        assert_eq!(split_hex_hint("FLAG"), ("FLAG", false));

        let schema = FieldSchema::new(&[1]).unwrap();
        let consts = constants();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("FLAG#", None).unwrap();
        assert_eq!(compiled.payload[0], 1);
    }

    #[test]
    fn test_unknown_constant() {
        let schema = FieldSchema::new(&[1]).unwrap();
        let consts = constants();
        let err = PayloadCompiler::new(&schema, &consts).compile("BAZ", None).unwrap_err();
        assert_eq!(err, CompileError::ConstantNotFound(String::from("BAZ")));
    }

    #[test]
    fn test_bad_token() {
        let schema = FieldSchema::new(&[1, 1]).unwrap();
        let consts = ConstantStore::new();
        let err = PayloadCompiler::new(&schema, &consts).compile("1,$", None).unwrap_err();
        assert_eq!(err, CompileError::BadToken('$'));
    }

    #[test]
    fn test_name_starting_with_n_is_constant() {
        let schema = FieldSchema::new(&[1]).unwrap();
        let mut consts = ConstantStore::new();
        consts.append_line("node=4").unwrap();
        let compiled = PayloadCompiler::new(&schema, &consts).compile("node", Some(9)).unwrap();
        assert_eq!(compiled.payload[0], 4);
    }

    #[test]
    fn test_deterministic() {
        let schema = FieldSchema::new(&[2, 1, 1]).unwrap();
        let consts = constants();
        let compiler = PayloadCompiler::new(&schema, &consts);
        let a = compiler.compile("ADDR,i:2,n", Some(5)).unwrap();
        let b = compiler.compile("ADDR,i:2,n", Some(5)).unwrap();
        assert_eq!(a, b);
    }
}
