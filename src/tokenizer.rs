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

//! One-pass tokenizer: a logical source line in, a [`TokenGroup`] out.

use crate::constants::{self, BEGIN_PUNCTUATORS, DELIMITERS, END_PUNCTUATORS, PUNCTUATORS};
use crate::instruction_table::InstructionTable;
use crate::symbol::Symbol;
use crate::token::{PunctuatorSide, Token, TokenGroup};
use crate::value::Expression;

/// Strip a trailing `;`-comment, defensive against callers that bypass the
/// Reader collaborator's own comment stripping.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Explode each delimiter character by surrounding it with spaces, so it
/// becomes a standalone atom once the line is whitespace-split.
fn explode_delimiters(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    for c in line.chars() {
        if DELIMITERS.contains(&c) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn punctuator_side(c: char) -> Option<PunctuatorSide> {
    if BEGIN_PUNCTUATORS.contains(&c) {
        Some(PunctuatorSide::Begin)
    } else if END_PUNCTUATORS.contains(&c) {
        Some(PunctuatorSide::End)
    } else {
        None
    }
}

fn classify(atom: &str, current_ip: u16) -> Token {
    let chars: Vec<char> = atom.chars().collect();

    if chars.len() == 1 && PUNCTUATORS.contains(&chars[0]) {
        return Token::Punctuator { text: atom.to_string(), side: punctuator_side(chars[0]) };
    }
    if constants::is_directive(atom) {
        return Token::Directive(atom.to_string());
    }
    if constants::is_memory_directive(atom) {
        return Token::MemoryDirective(atom.to_string());
    }
    if constants::is_memory_option(atom) {
        return Token::MemoryOption(atom.to_string());
    }
    if constants::is_storage_directive(atom) {
        return Token::StorageDirective(atom.to_string());
    }
    if constants::is_define_operator(atom) {
        return Token::Operator(atom.to_string());
    }
    if Expression::has_valid_prefix(atom) {
        return match Expression::new(atom) {
            Ok(value) => Token::Expression { text: atom.to_string(), value },
            Err(e) => Token::Invalid { text: atom.to_string(), reason: e.to_string() },
        };
    }
    if looks_like_symbol_name(atom) {
        let ip_expr = Expression::new(&format!("${current_ip:04X}"))
            .expect("formatted IP is always a valid 16-bit hex expression");
        return match Symbol::new(atom, ip_expr) {
            Ok(value) => Token::Symbol { text: atom.to_string(), value },
            Err(e) => Token::Invalid { text: atom.to_string(), reason: e.to_string() },
        };
    }
    if let Some(node) = InstructionTable::global().from_mnemonic(atom) {
        return Token::Instruction { text: atom.to_string(), node: node.clone() };
    }

    Token::Literal(atom.to_string())
}

/// A symbol atom always carries a trailing colon affix (`:` or `::`,
/// optionally a leading `.`); that's what separates it from a bare mnemonic
/// or register sharing the same charset.
fn looks_like_symbol_name(atom: &str) -> bool {
    atom.ends_with(':')
}

/// Tokenize one already-decommented, continuation-joined logical line.
/// `current_ip` seeds any Symbol token built from this line with its
/// creation-time address.
pub fn tokenize(line: &str, current_ip: u16) -> TokenGroup {
    let stripped = strip_comment(line);
    let exploded = explode_delimiters(stripped);

    let tokens: Vec<Token> = exploded
        .split_whitespace()
        .map(|atom| atom.trim_matches(','))
        .filter(|atom| !atom.is_empty())
        .map(|atom| classify(atom, current_ip))
        .collect();

    TokenGroup::new(tokens)
}
