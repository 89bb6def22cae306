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

use cicasm::assemble;
use cicasm::assembler::AssemblerContext;
use cicasm::file_reader::MockFileReader;
use cicasm::label::LabelStore;
use cicasm::mnemonic::resolve_mnemonic;
use cicasm::symbol::{Symbol, SymbolStore};
use cicasm::tokenizer::tokenize;
use cicasm::value::Expression;
use std::path::Path;

fn assemble_lines(lines: &[&str]) -> Vec<u8> {
    let src = lines.join("\n");
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", &src);
    assemble(Path::new("test.asm"), 0x0000, 0x7FFF, &reader).unwrap()
}

#[test]
fn def_equ_populates_the_label_store() {
    let mut ctx = AssemblerContext::new();
    ctx.assemble_lines(&["DEF VAR_NAME EQU $0100".to_string()]).unwrap();
    assert_eq!(ctx.labels.find("VAR_NAME").unwrap().value.integer_value(), 256);
}

#[test]
fn ds_tiles_fill_values_across_the_block() {
    let rom = assemble_lines(&["DS $05 $01 $02 $03"]);
    assert_eq!(&rom[0..5], &[0x01, 0x02, 0x03, 0x01, 0x02]);
}

#[test]
fn db_mixes_numbers_and_a_quoted_string() {
    let rom = assemble_lines(&[r#"DB $FF "Hello""#]);
    assert_eq!(&rom[0..6], &[0xFF, b'H', b'e', b'l', b'l', b'o']);
}

#[test]
fn dw_emits_little_endian_words() {
    let rom = assemble_lines(&["DW $FFD2 $1234"]);
    assert_eq!(&rom[0..4], &[0xD2, 0xFF, 0x34, 0x12]);
}

#[test]
fn ld_b_c_resolves_to_a_single_byte() {
    let (symbols, labels) = (SymbolStore::new(), LabelStore::new());
    let tokens = tokenize("LD B, C", 0);
    let detail = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
    assert_eq!(detail.code, vec![0x41]);
}

#[test]
fn ld_indirect_hl_with_an_immediate() {
    let rom = assemble_lines(&["LD (HL), $FF"]);
    assert_eq!(&rom[0..2], &[0x36, 0xFF]);
}

#[test]
fn ld_hl_resolves_a_label_to_its_16_bit_value() {
    let rom = assemble_lines(&["DEF USER_IO EQU $FF00", "LD HL, USER_IO"]);
    assert_eq!(&rom[0..3], &[0x21, 0x00, 0xFF]);
}

#[test]
fn ldh_resolves_both_directions() {
    let rom = assemble_lines(&["LDH ($20), A", "LDH A, ($32)"]);
    assert_eq!(&rom[0..2], &[0xE0, 0x20]);
    assert_eq!(&rom[2..4], &[0xF0, 0x32]);
}

#[test]
fn jr_nz_emits_the_opcode_then_a_relative_byte() {
    let rom = assemble_lines(&["JR NZ, $41"]);
    assert_eq!(&rom[0..2], &[0x20, 0x41]);
}

#[test]
fn add_sp_begins_with_its_opcode() {
    let rom = assemble_lines(&["ADD SP, 0x10"]);
    assert_eq!(rom[0], 0xE8);
}

#[test]
fn section_starting_address_is_block_start_plus_offset() {
    let mut ctx = AssemblerContext::new();
    ctx.assemble_lines(&[r#"SECTION "coolstuff", WRAM0[$4567]"#.to_string()]).unwrap();
    let section = ctx.sections.find("coolstuff").unwrap();
    assert_eq!(section.starting_address, 0xC000 + 0x4567);
    assert_eq!(ctx.current_address(), section.address_u16());
}

#[test]
fn resolve_again_picks_up_a_relocated_symbol() {
    let mut symbols = SymbolStore::new();
    symbols.push(Symbol::new("prog_main:", Expression::new("$0200").unwrap()).unwrap(), false);
    let labels = LabelStore::new();
    let tokens = tokenize("JP prog_main", 0);

    let first = resolve_mnemonic(&tokens, &symbols, &labels).unwrap();
    assert_eq!(first.operand1.as_deref(), Some("$0200"));
    assert_eq!(first.opcode, 0xC3);

    symbols.push(Symbol::new("prog_main:", Expression::new("$FFD2").unwrap()).unwrap(), true);
    let second = cicasm::mnemonic::resolve_again(&tokens, &symbols, &labels).unwrap();
    assert_eq!(second.operand1.as_deref(), Some("$FFD2"));
    assert_eq!(second.opcode, 0xC3);
}

#[test]
fn a_label_and_its_jump_assemble_end_to_end() {
    let rom = assemble_lines(&["prog_main: NOP", "JP prog_main"]);
    assert_eq!(rom[0], 0x00);
    assert_eq!(&rom[1..4], &[0xC3, 0x00, 0x00]);
}

#[test]
fn a_jump_to_a_symbol_declared_later_patches_in_after_the_fixup_pass() {
    let rom = assemble_lines(&["JP prog_main", "prog_main: NOP"]);
    assert_eq!(&rom[0..3], &[0xC3, 0x03, 0x00]);
    assert_eq!(rom[3], 0x00);
}

#[test]
fn a_reference_that_is_never_defined_fails_the_whole_assembly() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "JP nowhere\n");
    assert!(assemble(Path::new("test.asm"), 0x0000, 0x7FFF, &reader).is_err());
}

#[test]
fn include_splices_a_second_file_into_the_translation_unit() {
    let mut reader = MockFileReader::default();
    reader.add_file("main.asm", "DEF FOO EQU $01\nINCLUDE \"sub.asm\"\nLD A, B\n");
    reader.add_file("sub.asm", "DEF BAR EQU $02\n");

    let rom = assemble(Path::new("main.asm"), 0x0000, 0x7FFF, &reader).unwrap();
    // LD A, B is the only emitting line; DEF lines from both files contribute
    // no bytes, so the one emitted opcode still lands at address 0.
    assert_eq!(rom[0], 0x78);
}

#[test]
fn cyclic_include_fails_the_whole_assembly() {
    let mut reader = MockFileReader::default();
    reader.add_file("a.asm", "INCLUDE \"b.asm\"\n");
    reader.add_file("b.asm", "INCLUDE \"a.asm\"\n");

    assert!(assemble(Path::new("a.asm"), 0x0000, 0x7FFF, &reader).is_err());
}

#[test]
fn a_reserved_directive_fails_the_whole_assembly() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "MACRO cool_macro\n");
    assert!(assemble(Path::new("test.asm"), 0x0000, 0x7FFF, &reader).is_err());
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let rom = assemble_lines(&["; a header comment", "", "NOP ; trailing", "HALT"]);
    assert_eq!(rom[0], 0x00);
    assert_eq!(rom[1], 0x76);
}

#[test]
fn program_past_the_final_logical_address_is_rejected() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "SECTION \"late\", ROM0[$3FFE]\nDS $10\n");
    let result = assemble(Path::new("test.asm"), 0x0000, 0x3FFF, &reader);
    assert!(result.is_err());
}
