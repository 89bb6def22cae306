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

//! Fixed vocabulary the tokenizer classifies against: directive keywords,
//! memory regions/options, storage mnemonics, and punctuation sets.

/// All directive keywords, executed or reserved. Only `DEF` and `SECTION`
/// are dispatched by the driver; the rest are tokenized and then rejected.
pub const DIRECTIVES: &[&str] = &[
    "DEF", "ENDM", "ENDU", "EXPORT", "GLOBAL", "INCBIN", "INCLUDE", "MACRO", "NEXTU", "ORG",
    "PURGE", "SECTION", "SET", "UNION",
];

/// Directives the driver actually executes.
pub const EXECUTED_DIRECTIVES: &[&str] = &["DEF", "SECTION"];

pub const STORAGE_DIRECTIVES: &[&str] = &["DS", "DB", "DW"];

pub const MEMORY_DIRECTIVES: &[&str] =
    &["WRAM0", "VRAM", "ROMX", "ROM0", "HRAM", "WRAMX", "SRAM", "OAM"];

pub const MEMORY_OPTIONS: &[&str] = &["BANK", "ALIGN"];

pub const DEFINE_OPERATORS: &[&str] = &["=", "EQU", "EQUS"];

/// Single-character punctuators. `BeginPunctuator`/`EndPunctuator` are a
/// further refinement by membership in the two halves below.
pub const PUNCTUATORS: &[char] = &['(', ')', '[', ']', '{', '}', '\'', '"', ','];

pub const BEGIN_PUNCTUATORS: &[char] = &['(', '[', '{'];
pub const END_PUNCTUATORS: &[char] = &[')', ']', '}'];

/// Characters exploded (surrounded with spaces) before whitespace splitting.
pub const DELIMITERS: &[char] = &['"', '\'', '(', ')', '[', '{', '}', ']', ',', '+'];

pub fn is_directive(word: &str) -> bool {
    DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(word))
}

pub fn is_storage_directive(word: &str) -> bool {
    STORAGE_DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(word))
}

pub fn is_memory_directive(word: &str) -> bool {
    MEMORY_DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(word))
}

pub fn is_memory_option(word: &str) -> bool {
    MEMORY_OPTIONS.iter().any(|d| d.eq_ignore_ascii_case(word))
}

pub fn is_define_operator(word: &str) -> bool {
    DEFINE_OPERATORS.iter().any(|d| d.eq_ignore_ascii_case(word))
}
