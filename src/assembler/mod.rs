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

//! [`AssemblerContext`]: the per-translation-unit driver. Owns every store
//! the pipeline mutates and walks a tokenized source one line at a time,
//! dispatching on the leading token's kind and recursing on whatever that
//! handler leaves unconsumed.

use crate::constants::EXECUTED_DIRECTIVES;
use crate::directives::{define, section, storage};
use crate::errors::AssemblyError;
use crate::image::Image;
use crate::instruction_pointer::InstructionPointer;
use crate::label::LabelStore;
use crate::mnemonic;
use crate::section::SectionStore;
use crate::symbol::SymbolStore;
use crate::token::{Token, TokenGroup};
use crate::tokenizer::tokenize;

/// A not-yet-resolved instruction, recorded so its placeholder bytes can be
/// patched once the rest of the translation unit has registered whatever
/// label or symbol it named.
struct Fixup {
    addr: u16,
    length: usize,
    tokens: TokenGroup,
    line_no: usize,
}

pub struct AssemblerContext {
    pub symbols: SymbolStore,
    pub labels: LabelStore,
    pub sections: SectionStore,
    pub ip: InstructionPointer,
    pub image: Image,
    fixups: Vec<Fixup>,
}

impl AssemblerContext {
    pub fn new() -> Self {
        AssemblerContext {
            symbols: SymbolStore::new(),
            labels: LabelStore::new(),
            sections: SectionStore::new(),
            ip: InstructionPointer::new(),
            image: Image::new(),
            fixups: Vec::new(),
        }
    }

    /// A fresh context whose instruction pointer starts at `addr`.
    pub fn with_start_address(addr: u16) -> Self {
        let mut ctx = AssemblerContext::new();
        ctx.ip.set_base_addr(addr);
        ctx.image.new_segment(addr);
        ctx
    }

    /// Drop everything a prior translation unit left behind, so the same
    /// context can be reused for another assemble pass.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.labels.clear();
        self.sections.clear();
        self.ip = InstructionPointer::new();
        self.image = Image::new();
        self.fixups.clear();
    }

    pub fn current_address(&self) -> u16 {
        self.ip.current()
    }

    pub fn into_rom(self) -> Vec<u8> {
        self.image.flatten()
    }

    /// Tokenize and dispatch every source line in order. Blank lines (a
    /// Reader collaborator's comment-stripped leftovers included) are
    /// skipped without being tokenized.
    pub fn assemble_lines(&mut self, lines: &[String]) -> Result<(), AssemblyError> {
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let tokens = tokenize(line, self.ip.current());
            self.process_line(&tokens, idx + 1)?;
        }
        self.resolve_fixups()
    }

    /// Retry every instruction that provisionally resolved against a
    /// not-yet-defined label or symbol, now that the whole translation unit
    /// has been seen. A fixup that still fails to resolve is a genuine
    /// undefined reference, not a forward one, and fails the assembly.
    fn resolve_fixups(&mut self) -> Result<(), AssemblyError> {
        let fixups = std::mem::take(&mut self.fixups);
        for fixup in fixups {
            let retried = mnemonic::resolve_again(&fixup.tokens, &self.symbols, &self.labels)
                .map_err(|e| e.on_line(fixup.line_no))?;
            if retried.unresolved || retried.code.len() != fixup.length {
                return Err(AssemblyError::Unresolved(format!(
                    "{} (line {})",
                    fixup.tokens.get(0).map(|t| t.text()).unwrap_or_default(),
                    fixup.line_no
                ))
                .on_line(fixup.line_no));
            }
            self.image.patch(fixup.addr, &retried.code);
        }
        Ok(())
    }

    /// Dispatch on `tokens[0]`'s kind, consume the prefix the handler used,
    /// and recurse on whatever remains so `LABEL: LD A, $10` runs the Symbol
    /// handler then the Instruction handler on the same line.
    fn process_line(&mut self, tokens: &TokenGroup, line_no: usize) -> Result<(), AssemblyError> {
        let mut remaining = tokens.clone();
        while !remaining.is_empty() {
            let consumed = self.dispatch(&remaining, line_no)?;
            remaining = remaining.slice(consumed);
        }
        Ok(())
    }

    fn dispatch(&mut self, tokens: &TokenGroup, line_no: usize) -> Result<usize, AssemblyError> {
        let first = tokens.get(0).expect("caller checked tokens is non-empty");
        match first {
            Token::Directive(name) => self.dispatch_directive(name, tokens, line_no),
            Token::StorageDirective(_) => {
                let (bytes, next) =
                    storage::parse_storage(tokens).map_err(|e| e.on_line(line_no))?;
                self.image.append(&bytes, &mut self.ip);
                Ok(next)
            }
            Token::Instruction { .. } => {
                let resolved = mnemonic::resolve_mnemonic(tokens, &self.symbols, &self.labels)
                    .map_err(|e| e.on_line(line_no))?;
                if resolved.unresolved {
                    self.fixups.push(Fixup {
                        addr: self.ip.current(),
                        length: resolved.code.len(),
                        tokens: tokens.clone(),
                        line_no,
                    });
                }
                self.image.append(&resolved.code, &mut self.ip);
                Ok(tokens.len())
            }
            Token::Symbol { value, .. } => {
                if !self.symbols.push(value.clone(), false) {
                    return Err(AssemblyError::StructuralError {
                        line: line_no,
                        reason: format!("duplicate symbol definition: {}", first.text()),
                    });
                }
                Ok(1)
            }
            _ => Ok(1),
        }
    }

    fn dispatch_directive(
        &mut self,
        name: &str,
        tokens: &TokenGroup,
        line_no: usize,
    ) -> Result<usize, AssemblyError> {
        if name.eq_ignore_ascii_case("DEF") {
            let (label, next) = define::parse_define(tokens).map_err(|e| e.on_line(line_no))?;
            self.labels.push(label, true);
            Ok(next)
        } else if name.eq_ignore_ascii_case("SECTION") {
            let (sec, next) = section::parse_section(tokens).map_err(|e| e.on_line(line_no))?;
            let addr = sec.address_u16();
            self.ip.set_base_addr(addr);
            self.image.new_segment(addr);
            self.sections.replace(sec);
            Ok(next)
        } else {
            debug_assert!(
                EXECUTED_DIRECTIVES.iter().all(|d| !d.eq_ignore_ascii_case(name)),
                "executed directive {name} has no dispatch arm"
            );
            Err(AssemblyError::ReservedDirective(name.to_string()).on_line(line_no))
        }
    }
}

impl Default for AssemblerContext {
    fn default() -> Self {
        AssemblerContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn def_populates_the_label_store() {
        let mut ctx = AssemblerContext::new();
        ctx.assemble_lines(&lines(&["DEF VAR_NAME EQU $0100"])).unwrap();
        assert_eq!(ctx.labels.find("VAR_NAME").unwrap().value.integer_value(), 256);
    }

    #[test]
    fn storage_directives_append_to_the_image() {
        let mut ctx = AssemblerContext::new();
        ctx.assemble_lines(&lines(&["DS $05 $01 $02 $03"])).unwrap();
        let rom = ctx.into_rom();
        assert_eq!(&rom[0..5], &[0x01, 0x02, 0x03, 0x01, 0x02]);
    }

    #[test]
    fn section_declaration_relocates_the_instruction_pointer() {
        let mut ctx = AssemblerContext::new();
        ctx.assemble_lines(&lines(&[r#"SECTION "coolstuff", WRAM0[$4567]"#])).unwrap();
        assert_eq!(ctx.current_address(), 0xC000u16.wrapping_add(0x4567));
    }

    #[test]
    fn label_then_instruction_share_a_line() {
        let mut ctx = AssemblerContext::with_start_address(0x0150);
        ctx.assemble_lines(&lines(&["prog_main: NOP"])).unwrap();
        assert_eq!(ctx.symbols.find("prog_main").unwrap().address.integer_value(), 0x0150);
    }

    #[test]
    fn jp_to_an_already_declared_symbol_resolves_inline() {
        let mut ctx = AssemblerContext::with_start_address(0x0200);
        ctx.assemble_lines(&lines(&["prog_main: NOP", "JP prog_main"])).unwrap();
        let rom = ctx.into_rom();
        assert_eq!(&rom[0x0201..0x0204], &[0xC3, 0x00, 0x02]);
    }

    #[test]
    fn jp_to_a_symbol_declared_later_in_the_unit_patches_in_on_the_fixup_pass() {
        let mut ctx = AssemblerContext::with_start_address(0x0200);
        ctx.assemble_lines(&lines(&["JP prog_main", "prog_main: NOP"])).unwrap();
        let rom = ctx.into_rom();
        assert_eq!(&rom[0x0200..0x0203], &[0xC3, 0x03, 0x02]);
        assert_eq!(rom[0x0203], 0x00);
    }

    #[test]
    fn a_reference_that_never_resolves_fails_the_whole_assembly() {
        let mut ctx = AssemblerContext::with_start_address(0x0200);
        let err = ctx.assemble_lines(&lines(&["JP never_defined"])).unwrap_err();
        assert!(matches!(err, AssemblyError::SemanticError { .. }));
    }

    #[test]
    fn reserved_directive_is_rejected() {
        let mut ctx = AssemblerContext::new();
        let err = ctx.assemble_lines(&lines(&["MACRO foo"])).unwrap_err();
        assert!(matches!(err, AssemblyError::SemanticError { .. }));
    }

    #[test]
    fn duplicate_symbol_definition_is_rejected() {
        let mut ctx = AssemblerContext::new();
        let err =
            ctx.assemble_lines(&lines(&["loop_top: NOP", "loop_top: NOP"])).unwrap_err();
        assert!(matches!(err, AssemblyError::StructuralError { .. }));
    }

    #[test]
    fn reset_clears_every_store() {
        let mut ctx = AssemblerContext::new();
        ctx.assemble_lines(&lines(&["DEF X EQU $01", "loop_top: NOP"])).unwrap();
        ctx.reset();
        assert!(ctx.labels.find("X").is_none());
        assert!(ctx.symbols.find("loop_top").is_none());
        assert_eq!(ctx.current_address(), 0);
    }
}
