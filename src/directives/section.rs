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

//! `SECTION "<label>", <memblock> ['[' <offset> ']'] [, BANK '[' <n> ']']
//! [, ALIGN '[' <n> ']']`.

use crate::errors::AssemblyError;
use crate::section::{MemoryBlock, Section};
use crate::token::{Token, TokenGroup};

/// Find a `[`..`]` enclosure starting at `start` (which must itself be the
/// `BeginPunctuator`). Returns `(end_idx, enclosed_token_idx)`. Nested
/// delimiters are rejected.
fn find_bracket_enclosure(
    tokens: &TokenGroup,
    start: usize,
) -> Result<(usize, usize), AssemblyError> {
    let begin = tokens.get(start).ok_or_else(|| {
        AssemblyError::SectionDeclarationError("expected '[' in SECTION declaration".to_string())
    })?;
    if begin.kind_name() != "BeginPunctuator" {
        return Err(AssemblyError::SectionDeclarationError(format!(
            "expected '[', found {}",
            begin.text()
        )));
    }
    let enclosed_idx = start + 1;
    let end_idx = start + 2;
    let end = tokens.get(end_idx).ok_or_else(|| {
        AssemblyError::SectionDeclarationError("unterminated '[' in SECTION declaration".to_string())
    })?;
    if end.kind_name() != "EndPunctuator" {
        return Err(AssemblyError::SectionDeclarationError(
            "nested or unterminated bracket enclosure in SECTION declaration".to_string(),
        ));
    }
    Ok((end_idx, enclosed_idx))
}

fn parse_u8_literal(token: &Token) -> Result<u8, AssemblyError> {
    token.text().parse::<u8>().map_err(|_| {
        AssemblyError::SectionDeclarationError(format!("expected a small integer, got {}", token.text()))
    })
}

/// Parse a `SECTION` statement starting at `tokens[0]` and return the
/// `Section` plus the index of the first unconsumed token.
pub fn parse_section(tokens: &TokenGroup) -> Result<(Section, usize), AssemblyError> {
    if tokens.len() < 5 {
        return Err(AssemblyError::SectionDeclarationError(
            "malformed SECTION declaration".to_string(),
        ));
    }

    let open_quote = tokens.get(1).expect("length checked above");
    let label_token = tokens.get(2).expect("length checked above");
    let close_quote = tokens.get(3).expect("length checked above");
    if open_quote.kind_name() != "Punctuator"
        || close_quote.kind_name() != "Punctuator"
        || open_quote.text() != close_quote.text()
        || !matches!(open_quote.text(), "\"" | "'")
    {
        return Err(AssemblyError::SectionDeclarationError(
            "SECTION label must be enclosed in matching quotes".to_string(),
        ));
    }
    let label = label_token.text();

    let block_token = tokens.get(4).expect("length checked above");
    let block = MemoryBlock::from_name(block_token.text()).ok_or_else(|| {
        AssemblyError::SectionDeclarationError(format!(
            "unrecognized memory region: {}",
            block_token.text()
        ))
    })?;

    let mut cursor = 5;
    let mut offset = None;
    if tokens.get(cursor).map(|t| t.kind_name()) == Some("BeginPunctuator") {
        let (end_idx, enclosed_idx) = find_bracket_enclosure(tokens, cursor)?;
        let expr_token = tokens.get(enclosed_idx).ok_or_else(|| {
            AssemblyError::SectionDeclarationError("missing SECTION offset expression".to_string())
        })?;
        let expr = expr_token.as_expression().ok_or_else(|| {
            AssemblyError::SectionDeclarationError(format!(
                "SECTION offset must be an expression, got {}",
                expr_token.text()
            ))
        })?;
        offset = Some(expr.clone());
        cursor = end_idx + 1;
    }

    let mut bank = None;
    let mut align = None;
    while let Some(token) = tokens.get(cursor) {
        match token {
            Token::MemoryOption(opt) if opt.eq_ignore_ascii_case("BANK") => {
                let (end_idx, enclosed_idx) = find_bracket_enclosure(tokens, cursor + 1)?;
                let value_token = tokens.get(enclosed_idx).ok_or_else(|| {
                    AssemblyError::SectionBankError("missing BANK value".to_string())
                })?;
                bank = Some(parse_u8_literal(value_token).map_err(|_| {
                    AssemblyError::SectionBankError(format!(
                        "invalid BANK value: {}",
                        value_token.text()
                    ))
                })?);
                cursor = end_idx + 1;
            }
            Token::MemoryOption(opt) if opt.eq_ignore_ascii_case("ALIGN") => {
                let (end_idx, enclosed_idx) = find_bracket_enclosure(tokens, cursor + 1)?;
                let value_token = tokens.get(enclosed_idx).ok_or_else(|| {
                    AssemblyError::SectionAlignError("missing ALIGN value".to_string())
                })?;
                align = Some(parse_u8_literal(value_token).map_err(|_| {
                    AssemblyError::SectionAlignError(format!(
                        "invalid ALIGN value: {}",
                        value_token.text()
                    ))
                })?);
                cursor = end_idx + 1;
            }
            _ => break,
        }
    }

    let section = Section::new(label, block, offset, bank, align)?;
    Ok((section, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn parses_label_and_memblock_with_offset() {
        let tokens = tokenize(r#"SECTION "coolstuff", WRAM0[$4567]"#, 0);
        let (section, next) = parse_section(&tokens).unwrap();
        assert_eq!(section.label, "coolstuff");
        assert_eq!(section.starting_address, 0xC000 + 0x4567);
        assert_eq!(next, tokens.len());
    }

    #[test]
    fn parses_bank_and_align_options() {
        let tokens = tokenize(r#"SECTION "bankroll", ROMX[0x4000], BANK[2], ALIGN[4]"#, 0);
        let (section, _) = parse_section(&tokens).unwrap();
        assert_eq!(section.bank, Some(2));
        assert_eq!(section.align, Some(4));
    }

    #[test]
    fn mismatched_quotes_rejected() {
        let tokens = tokenize(r#"SECTION "oops', WRAM0"#, 0);
        assert!(parse_section(&tokens).is_err());
    }

    #[test]
    fn missing_memblock_rejected() {
        let tokens = tokenize(r#"SECTION "nomem""#, 0);
        assert!(parse_section(&tokens).is_err());
    }
}
