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

pub mod assembler;
pub mod constants;
pub mod directives;
pub mod errors;
pub mod file_reader;
pub mod image;
pub mod instruction_pointer;
pub mod instruction_table;
pub mod label;
pub mod mnemonic;
pub mod section;
pub mod symbol;
pub mod token;
pub mod tokenizer;
pub mod value;

use std::path::Path;

use anyhow::{Context, Result};

use assembler::AssemblerContext;
use file_reader::FileReader;

/// Assemble the source file at `source_path` (and anything it `INCLUDE`s)
/// into a flattened 64 KiB ROM image.
///
/// `start_addr` seeds the instruction pointer before the first line runs;
/// `final_logical_addr` is the highest address the program may legally
/// occupy (the boot ROM's 16 KiB ceiling, or a cartridge ROM bank's).
pub fn assemble<F: FileReader>(
    source_path: &Path,
    start_addr: u16,
    final_logical_addr: u16,
    reader: &F,
) -> Result<Vec<u8>> {
    let lines = file_reader::logical_lines(reader, source_path)
        .context("Failed while reading source lines")?;

    let mut ctx = AssemblerContext::with_start_address(start_addr);
    ctx.assemble_lines(&lines).context("Failed during assembly")?;

    if ctx.current_address() > final_logical_addr {
        anyhow::bail!(
            "assembled program extends to {:#06x}, past the final logical address {:#06x}",
            ctx.current_address(),
            final_logical_addr
        );
    }

    Ok(ctx.into_rom())
}
