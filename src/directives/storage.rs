/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! `DS`, `DB`, and `DW`: the three storage directives that emit literal bytes
//! straight into the image rather than resolving to an instruction opcode.

use crate::errors::AssemblyError;
use crate::token::{Token, TokenGroup};
use crate::value::convert;

/// Parse a storage statement starting at `tokens[0]` (the `DS`/`DB`/`DW`
/// token itself) and return the emitted bytes plus the index of the first
/// unconsumed token (always `tokens.len()`, since a storage directive
/// consumes the rest of its line).
pub fn parse_storage(tokens: &TokenGroup) -> Result<(Vec<u8>, usize), AssemblyError> {
    let directive = tokens.get(0).ok_or_else(|| {
        AssemblyError::StorageValueError("empty storage statement".to_string())
    })?;

    let bytes = match directive.text().to_ascii_uppercase().as_str() {
        "DS" => to_space(tokens)?,
        "DB" => to_bytes(tokens)?,
        "DW" => to_words(tokens)?,
        other => {
            return Err(AssemblyError::StorageValueError(format!(
                "unrecognized storage directive: {other}"
            )));
        }
    };
    Ok((bytes, tokens.len()))
}

/// `DS <size> [v1 v2 ... vN]`: allocate `size` bytes. With no fill values,
/// the block is zero-filled; otherwise the given 8-bit values are tiled
/// across the block, repeating as needed.
fn to_space(tokens: &TokenGroup) -> Result<Vec<u8>, AssemblyError> {
    if tokens.len() <= 1 {
        return Ok(vec![0u8; 1]);
    }

    let size_token = tokens.get(1).expect("length checked above");
    let size_expr = size_token.as_expression().ok_or_else(|| {
        AssemblyError::StorageValueError(format!(
            "DS size must be an expression, got {}",
            size_token.text()
        ))
    })?;
    let size = size_expr.integer_value().max(0) as usize;

    if tokens.len() <= 2 {
        return Ok(vec![0u8; size]);
    }

    let values: Vec<u8> = tokens
        .iter()
        .skip(2)
        .filter_map(|t| t.as_expression())
        .map(convert::to_hex)
        .collect();
    if values.is_empty() {
        return Ok(vec![0u8; size]);
    }

    Ok((0..size).map(|idx| values[idx % values.len()]).collect())
}

/// `DB <value> ...`: one byte per numeric expression (truncated to its low
/// byte), or one byte per character of a quoted string.
fn to_bytes(tokens: &TokenGroup) -> Result<Vec<u8>, AssemblyError> {
    if tokens.len() <= 1 {
        return Err(AssemblyError::StorageValueError(
            "DB requires at least one value".to_string(),
        ));
    }

    let mut out = Vec::new();
    for token in tokens.iter().skip(1) {
        match token {
            Token::Expression { value, .. } => out.push(convert::to_hex(value)),
            Token::Literal(text) => out.extend(text.bytes()),
            Token::Punctuator { .. } => {}
            other => {
                return Err(AssemblyError::StorageValueError(format!(
                    "unexpected token in DB statement: {}",
                    other.text()
                )));
            }
        }
    }
    Ok(out)
}

/// `DW <value> ...`: two bytes per expression, little-endian.
fn to_words(tokens: &TokenGroup) -> Result<Vec<u8>, AssemblyError> {
    if tokens.len() <= 1 {
        return Err(AssemblyError::StorageValueError(
            "DW requires at least one value".to_string(),
        ));
    }

    let mut out = Vec::new();
    for token in tokens.iter().skip(1) {
        let expr = token.as_expression().ok_or_else(|| {
            AssemblyError::StorageValueError(format!(
                "DW value must be an expression, got {}",
                token.text()
            ))
        })?;
        let word = convert::to_hex16(expr);
        out.push((word & 0xFF) as u8);
        out.push((word >> 8) as u8);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn ds_with_no_values_is_zero_filled() {
        let tokens = tokenize("DS $05", 0);
        let (bytes, _) = parse_storage(&tokens).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn ds_tiles_fill_values_across_the_block() {
        let tokens = tokenize("DS $05 $01 $02 $03", 0);
        let (bytes, _) = parse_storage(&tokens).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x01, 0x02]);
    }

    #[test]
    fn db_mixes_numbers_and_a_quoted_string() {
        let tokens = tokenize(r#"DB $FF "Hello""#, 0);
        let (bytes, _) = parse_storage(&tokens).unwrap();
        assert_eq!(bytes, vec![0xFF, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn dw_emits_little_endian_words() {
        let tokens = tokenize("DW $FFD2 $1234", 0);
        let (bytes, _) = parse_storage(&tokens).unwrap();
        assert_eq!(bytes, vec![0xD2, 0xFF, 0x34, 0x12]);
    }

    #[test]
    fn db_with_no_values_rejected() {
        let tokens = tokenize("DB", 0);
        assert!(parse_storage(&tokens).is_err());
    }
}
