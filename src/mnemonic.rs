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

//! The mnemonic resolver: walks the opcode tree against a tokenized
//! instruction line and produces a concrete, byte-encoded instruction.

use std::collections::HashMap;

use crate::errors::AssemblyError;
use crate::instruction_table::{InstructionTable, OpcodeNode};
use crate::label::LabelStore;
use crate::symbol::SymbolStore;
use crate::token::TokenGroup;
use crate::value::Expression;

/// An `InstructionDetail` whose operands have been resolved against actual
/// source atoms, with `code` populated for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInstruction {
    pub opcode: u8,
    pub mnemonic: String,
    pub operand1: Option<String>,
    pub operand2: Option<String>,
    pub length: u8,
    pub cycles: Vec<u16>,
    pub flags: [String; 4],
    pub immediate1: bool,
    pub immediate2: bool,
    pub code: Vec<u8>,
    /// True if one or more operands were provisionally resolved against a
    /// label/symbol name not yet present in either store. `code` is then a
    /// placeholder (zero-filled immediate) the caller must patch once the
    /// reference resolves, via [`resolve_again`].
    pub unresolved: bool,
}

struct Resolved {
    text: String,
    placeholder_key: Option<String>,
    value: Option<Expression>,
    forward_ref: bool,
}

/// Flatten a tokenized instruction line into operand atoms. Tokens between a
/// `(` and its `)` concatenate into one atom, parens included. A `+` atom
/// then smashes its neighbors into one composite atom (`SP` `+` `$05` →
/// `SP+$05`), recorded in `special` so the tree walk can try the placeholder
/// variants of its right-hand side.
fn listify(tokens: &TokenGroup) -> (Vec<String>, HashMap<String, (String, String)>) {
    let mut elements = Vec::new();
    let mut value = String::new();
    let mut in_paren = false;

    for token in tokens.iter() {
        let text = token.text();
        if text == "(" {
            in_paren = true;
        } else if text == ")" {
            in_paren = false;
        }
        value.push_str(text);
        if !in_paren {
            elements.push(std::mem::take(&mut value));
        }
    }
    if !value.is_empty() {
        elements.push(value);
    }

    let mut special = HashMap::new();
    let mut i = 0;
    while i < elements.len() {
        if elements[i] == "+" && i > 0 && i + 1 < elements.len() {
            let left = elements[i - 1].clone();
            let right = elements[i + 1].clone();
            let composite = format!("{left}+{right}");
            special.insert(composite.clone(), (left, right));
            elements.splice(i - 1..=i + 1, [composite]);
            i = i.saturating_sub(1);
            continue;
        }
        i += 1;
    }

    (elements, special)
}

/// Strip one layer of enclosing parens, if present.
fn strip_parens(atom: &str) -> &str {
    if atom.starts_with('(') && atom.ends_with(')') && atom.len() >= 2 {
        &atom[1..atom.len() - 1]
    } else {
        atom
    }
}

/// Resolve `atom` to a numeric value via an Expression literal, a Label, or
/// a Symbol address, in that order. Returns `None` if none apply (a plain
/// register or condition-code atom).
fn resolve_value(atom: &str, symbols: &SymbolStore, labels: &LabelStore) -> Result<Option<Expression>, AssemblyError> {
    let bare = strip_parens(atom);
    if Expression::has_valid_prefix(bare) {
        return Ok(Some(Expression::new(bare)?));
    }
    if let Some(label) = labels.find(bare) {
        return Ok(Some(label.value.clone()));
    }
    if let Some(symbol) = symbols.find(bare) {
        return Ok(Some(symbol.address.clone()));
    }
    Ok(None)
}

const WIDTH_8_KEYS: [&str; 3] = ["d8", "a8", "r8"];
const WIDTH_16_KEYS: [&str; 2] = ["d16", "a16"];

fn width_key<'a>(node: &'a OpcodeNode, value: &Expression) -> Option<&'a str> {
    let candidates: &[&str] = if value.is_8_bit() { &WIDTH_8_KEYS } else { &WIDTH_16_KEYS };
    candidates.iter().copied().find(|key| node.get(key).is_some())
}

/// The placeholder key a not-yet-defined identifier should provisionally
/// resolve against. Symbols (the common forward-reference case, colon
/// labels used as jump/call targets) are always 16-bit, so a 16-bit
/// placeholder is preferred when the node offers one; a node that only
/// carries 8-bit placeholders falls back to those.
fn forward_ref_width_key(node: &OpcodeNode) -> Option<&str> {
    WIDTH_16_KEYS
        .iter()
        .chain(WIDTH_8_KEYS.iter())
        .copied()
        .find(|key| node.get(key).is_some())
}

/// True if `atom` has the shape of a label/symbol name (letter-led,
/// `[A-Za-z0-9_]` body) rather than a register or condition-code keyword —
/// the only kind of unresolved atom worth deferring instead of rejecting.
fn looks_like_identifier(atom: &str) -> bool {
    let mut chars = atom.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve one operand atom against `node`'s children, in the order the
/// opcode tree supports: a special `+` composite, an exact key, then a
/// width-matched placeholder derived from an Expression, Label, or Symbol.
/// An identifier-shaped atom absent from both stores is provisionally
/// resolved against a zero-valued placeholder (`forward_ref: true`) instead
/// of rejected, so the driver can defer and patch it in once the unit's
/// remaining lines have registered it.
fn resolve_operand<'a>(
    atom: &str,
    node: &'a OpcodeNode,
    special: &HashMap<String, (String, String)>,
    symbols: &SymbolStore,
    labels: &LabelStore,
) -> Result<(&'a OpcodeNode, Resolved), AssemblyError> {
    if let Some((left, right)) = special.get(atom) {
        let right_value = resolve_value(right, symbols, labels)?;
        for placeholder in ["d8", "d16", "a8", "a16", "r8"] {
            let candidate = format!("{left}+{placeholder}");
            if let Some(child) = node.get(&candidate) {
                return Ok((
                    child,
                    Resolved {
                        text: atom.to_string(),
                        placeholder_key: Some(candidate),
                        value: right_value,
                        forward_ref: false,
                    },
                ));
            }
        }
        return Err(AssemblyError::InvalidOperand {
            mnemonic: String::new(),
            operand: atom.to_string(),
        });
    }

    if let Some(child) = node.get(atom) {
        return Ok((
            child,
            Resolved { text: atom.to_string(), placeholder_key: None, value: None, forward_ref: false },
        ));
    }

    if let Some(value) = resolve_value(atom, symbols, labels)? {
        if let Some(key) = width_key(node, &value) {
            let child = node.get(key).expect("width_key only returns present keys");
            return Ok((
                child,
                Resolved {
                    text: value.cleaned_str(),
                    placeholder_key: Some(key.to_string()),
                    value: Some(value),
                    forward_ref: false,
                },
            ));
        }
    }

    if looks_like_identifier(strip_parens(atom)) {
        if let Some(key) = forward_ref_width_key(node) {
            let child = node.get(key).expect("forward_ref_width_key only returns present keys");
            let zero = if key.ends_with("16") { "$$0000" } else { "$00" };
            return Ok((
                child,
                Resolved {
                    text: atom.to_string(),
                    placeholder_key: Some(key.to_string()),
                    value: Some(Expression::new(zero).expect("zero placeholder is always valid")),
                    forward_ref: true,
                },
            ));
        }
    }

    Err(AssemblyError::InvalidOperand { mnemonic: String::new(), operand: atom.to_string() })
}

fn immediate_bytes(placeholder_key: &str, value: &Expression) -> Vec<u8> {
    if placeholder_key.ends_with("16") {
        let word = (value.integer_value() & 0xFFFF) as u16;
        vec![(word & 0xFF) as u8, (word >> 8) as u8]
    } else {
        vec![(value.integer_value() & 0xFF) as u8]
    }
}

/// Resolve a whole instruction line (`tokens[0]` must be an `Instruction`
/// token) into a byte-encoded `ResolvedInstruction`.
pub fn resolve_mnemonic(
    tokens: &TokenGroup,
    symbols: &SymbolStore,
    labels: &LabelStore,
) -> Result<ResolvedInstruction, AssemblyError> {
    let mnemonic_token = tokens
        .get(0)
        .ok_or_else(|| AssemblyError::InvalidMnemonic("empty instruction line".to_string()))?;
    let mnemonic_text = mnemonic_token.text().to_string();

    let table = InstructionTable::global();
    let mut node = table
        .from_mnemonic(&mnemonic_text)
        .ok_or_else(|| AssemblyError::InvalidMnemonic(mnemonic_text.clone()))?;

    let (elements, special) = listify(tokens);
    let mut resolved: Vec<Resolved> = Vec::new();
    let mut idx = 1;

    loop {
        if let Some(opcode) = node.opcode() {
            let detail = table.detail_from_byte(opcode)?;
            let mut code = vec![opcode];

            if detail.immediate1 {
                if let (Some(r), true) = (resolved.first(), true) {
                    if let (Some(value), Some(key)) = (&r.value, &r.placeholder_key) {
                        code.extend(immediate_bytes(key, value));
                    }
                }
            }
            if detail.immediate2 {
                if let Some(r) = resolved.get(1) {
                    if let (Some(value), Some(key)) = (&r.value, &r.placeholder_key) {
                        code.extend(immediate_bytes(key, value));
                    }
                }
            }

            return Ok(ResolvedInstruction {
                opcode,
                mnemonic: detail.mnemonic.clone(),
                operand1: resolved.first().map(|r| r.text.clone()).or_else(|| detail.operand1.clone()),
                operand2: resolved.get(1).map(|r| r.text.clone()).or_else(|| detail.operand2.clone()),
                length: detail.length,
                cycles: detail.cycles.clone(),
                flags: detail.flags.clone(),
                immediate1: detail.immediate1,
                immediate2: detail.immediate2,
                code,
                unresolved: resolved.iter().any(|r| r.forward_ref),
            });
        }

        let atom = elements.get(idx).ok_or_else(|| AssemblyError::InvalidOperand {
            mnemonic: mnemonic_text.clone(),
            operand: String::new(),
        })?;
        let (next_node, res) = resolve_operand(atom, node, &special, symbols, labels).map_err(|_| {
            AssemblyError::InvalidOperand { mnemonic: mnemonic_text.clone(), operand: atom.clone() }
        })?;
        node = next_node;
        resolved.push(res);
        idx += 1;
    }
}

/// Re-run resolution against the same token group. Exposed so callers can
/// re-resolve a previously assembled instruction after a referenced Label or
/// Symbol's value has changed.
pub fn resolve_again(
    tokens: &TokenGroup,
    symbols: &SymbolStore,
    labels: &LabelStore,
) -> Result<ResolvedInstruction, AssemblyError> {
    resolve_mnemonic(tokens, symbols, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn empty_stores() -> (SymbolStore, LabelStore) {
        (SymbolStore::new(), LabelStore::new())
    }

    #[test]
    fn ld_b_c_resolves_to_single_byte() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("LD B, C", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.code, vec![0x41]);
    }

    #[test]
    fn ld_indirect_hl_with_immediate() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("LD (HL), $FF", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.code, vec![0x36, 0xFF]);
    }

    #[test]
    fn ld_hl_resolves_a_label_to_its_16_bit_value() {
        let mut labels = LabelStore::new();
        labels.push(
            crate::label::Label::new("USER_IO", Expression::new("$FF00").unwrap()).unwrap(),
            false,
        );
        let symbols = SymbolStore::new();
        let tokens = tokenize("LD HL, USER_IO", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.code, vec![0x21, 0x00, 0xFF]);
    }

    #[test]
    fn ldh_both_directions() {
        let (symbols, labels) = empty_stores();
        let store_tokens = tokenize("LDH ($20), A", 0);
        let store = resolve_mnemonic(&store_tokens, &symbols, &labels).unwrap();
        assert_eq!(store.code, vec![0xE0, 0x20]);

        let load_tokens = tokenize("LDH A, ($32)", 0);
        let load = resolve_mnemonic(&load_tokens, &symbols, &labels).unwrap();
        assert_eq!(load.code, vec![0xF0, 0x32]);
    }

    #[test]
    fn jr_nz_resolves_condition_then_relative_byte() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("JR NZ, $41", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.opcode, 0x20);
        assert_eq!(detail.code, vec![0x20, 0x41]);
    }

    #[test]
    fn add_sp_r8_begins_with_its_opcode() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("ADD SP, 0x10", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.code[0], 0xE8);
    }

    #[test]
    fn ld_hl_sp_plus_r8_uses_the_composite_key() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("LD HL, SP+$05", 0);
        let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(detail.code, vec![0xF8, 0x05]);
    }

    #[test]
    fn resolve_again_picks_up_a_moved_symbol() {
        let mut symbols = SymbolStore::new();
        symbols.push(
            crate::symbol::Symbol::new("prog_main:", Expression::new("$0200").unwrap()).unwrap(),
            false,
        );
        let labels = LabelStore::new();
        let tokens = tokenize("JP prog_main", 0);

        let first = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert_eq!(first.operand1.as_deref(), Some("$0200"));
        assert_eq!(first.opcode, 0xC3);

        symbols.push(
            crate::symbol::Symbol::new("prog_main:", Expression::new("$FFD2").unwrap()).unwrap(),
            true,
        );
        let second = resolve_again(&tokens, &symbols, &labels).unwrap();
        assert_eq!(second.operand1.as_deref(), Some("$FFD2"));
        assert_eq!(second.opcode, 0xC3);
    }

    #[test]
    fn a_not_yet_defined_symbol_resolves_provisionally_with_a_zero_placeholder() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("JP later_label", 0);

        let first = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert!(first.unresolved);
        assert_eq!(first.opcode, 0xC3);
        assert_eq!(first.code, vec![0xC3, 0x00, 0x00]);
    }

    #[test]
    fn resolve_again_patches_a_forward_reference_once_defined() {
        let mut symbols = SymbolStore::new();
        let labels = LabelStore::new();
        let tokens = tokenize("JP later_label", 0);

        let provisional = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert!(provisional.unresolved);

        symbols.push(
            crate::symbol::Symbol::new("later_label:", Expression::new("$0300").unwrap()).unwrap(),
            false,
        );
        let patched = resolve_again(&tokens, &symbols, &labels).unwrap();
        assert!(!patched.unresolved);
        assert_eq!(patched.code, vec![0xC3, 0x00, 0x03]);
        assert_eq!(patched.code.len(), provisional.code.len());
    }

    #[test]
    fn an_8_bit_only_forward_reference_defers_against_a_one_byte_placeholder() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("LDH A, (later_port)", 0);
        let provisional = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
        assert!(provisional.unresolved);
        assert_eq!(provisional.code, vec![0xF0, 0x00]);
    }

    #[test]
    fn unknown_mnemonic_is_rejected() {
        let (symbols, labels) = empty_stores();
        let tokens = tokenize("FROB A, B", 0);
        assert!(resolve_mnemonic(&tokens, &symbols, &labels).is_err());
    }
}
