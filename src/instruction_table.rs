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

//! The LR35902 opcode catalog: a nested map-of-maps opcode tree plus a
//! flat byte → detail table, both built once from the embedded JSON
//! catalog.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::errors::AssemblyError;

const CATALOG_JSON: &str = include_str!("data/lr35902_opcodes.json");

/// One row of the embedded catalog, deserialized directly from JSON.
#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    mnemonic: String,
    #[serde(default)]
    operand1: Option<String>,
    #[serde(default)]
    operand2: Option<String>,
    length: u8,
    cycles: Vec<u16>,
    flags: [String; 4],
}

/// The reserved key a terminal node carries its opcode byte under.
pub const TERMINAL_KEY: &str = "!";

/// A node in the opcode tree: either more operand-keyed children or a
/// terminal carrying the opcode byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpcodeNode {
    Interior(BTreeMap<String, OpcodeNode>),
    Terminal(u8),
}

impl OpcodeNode {
    fn interior() -> OpcodeNode {
        OpcodeNode::Interior(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&OpcodeNode> {
        match self {
            OpcodeNode::Interior(map) => map.get(&key.to_ascii_uppercase()),
            OpcodeNode::Terminal(_) => None,
        }
    }

    pub fn opcode(&self) -> Option<u8> {
        match self {
            OpcodeNode::Terminal(byte) => Some(*byte),
            OpcodeNode::Interior(map) => match map.get(TERMINAL_KEY) {
                Some(OpcodeNode::Terminal(byte)) => Some(*byte),
                _ => None,
            },
        }
    }

    /// The operand keys available at this node, excluding the terminal marker.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            OpcodeNode::Interior(map) => {
                map.keys().filter(|k| k.as_str() != TERMINAL_KEY).map(|k| k.as_str()).collect()
            }
            OpcodeNode::Terminal(_) => Vec::new(),
        }
    }

    fn insert_path(&mut self, path: &[String], opcode: u8) {
        if path.is_empty() {
            if let OpcodeNode::Interior(map) = self {
                map.insert(TERMINAL_KEY.to_string(), OpcodeNode::Terminal(opcode));
            }
            return;
        }
        if let OpcodeNode::Interior(map) = self {
            let child =
                map.entry(path[0].to_ascii_uppercase()).or_insert_with(OpcodeNode::interior);
            child.insert_path(&path[1..], opcode);
        }
    }
}

/// Computed per-operand flags: true when that operand slot is a placeholder
/// (an immediate resolved at assemble time) rather than a fixed register or
/// condition keyword.
fn is_placeholder(operand: &str) -> bool {
    matches!(operand, "d8" | "d16" | "a8" | "a16" | "r8") || operand.contains("r8")
}


#[derive(Debug, Clone, PartialEq)]
pub struct InstructionDetail {
    pub opcode: u8,
    pub mnemonic: String,
    pub operand1: Option<String>,
    pub operand2: Option<String>,
    pub length: u8,
    pub cycles: Vec<u16>,
    pub flags: [String; 4],
    pub immediate1: bool,
    pub immediate2: bool,
}

pub struct InstructionTable {
    tree: BTreeMap<String, OpcodeNode>,
    by_opcode: BTreeMap<u8, InstructionDetail>,
}

fn parsed_catalog() -> BTreeMap<u8, CatalogEntry> {
    let raw: BTreeMap<String, CatalogEntry> =
        serde_json::from_str(CATALOG_JSON).expect("embedded opcode catalog must parse");
    raw.into_iter()
        .map(|(hex, entry)| {
            let byte = u8::from_str_radix(&hex, 16).expect("catalog keys are 2-digit hex");
            (byte, entry)
        })
        .collect()
}

impl InstructionTable {
    fn build() -> InstructionTable {
        let catalog = parsed_catalog();
        let mut tree: BTreeMap<String, OpcodeNode> = BTreeMap::new();
        let mut by_opcode = BTreeMap::new();

        for (opcode, entry) in catalog {
            // CB-prefixed bit instructions are not modeled; the catalog's own
            // 0xCB row exists only as a hardware placeholder.
            if entry.mnemonic == "PREFIX" {
                continue;
            }

            let mut path = Vec::new();
            if let Some(op1) = &entry.operand1 {
                path.push(op1.clone());
            }
            if let Some(op2) = &entry.operand2 {
                path.push(op2.clone());
            }

            let root = tree.entry(entry.mnemonic.to_ascii_uppercase()).or_insert_with(|| {
                if path.is_empty() {
                    OpcodeNode::interior()
                } else {
                    OpcodeNode::interior()
                }
            });
            root.insert_path(&path, opcode);

            let immediate1 = entry.operand1.as_deref().is_some_and(is_placeholder);
            let immediate2 = entry.operand2.as_deref().is_some_and(is_placeholder);

            by_opcode.insert(
                opcode,
                InstructionDetail {
                    opcode,
                    mnemonic: entry.mnemonic,
                    operand1: entry.operand1,
                    operand2: entry.operand2,
                    length: entry.length,
                    cycles: entry.cycles,
                    flags: entry.flags,
                    immediate1,
                    immediate2,
                },
            );
        }

        InstructionTable { tree, by_opcode }
    }

    pub fn global() -> &'static InstructionTable {
        static TABLE: OnceLock<InstructionTable> = OnceLock::new();
        TABLE.get_or_init(InstructionTable::build)
    }

    /// Look up the opcode subtree rooted at `mnemonic` (case-insensitive).
    pub fn from_mnemonic(&self, mnemonic: &str) -> Option<&OpcodeNode> {
        self.tree.get(&mnemonic.to_ascii_uppercase())
    }

    pub fn detail_from_byte(&self, opcode: u8) -> Result<&InstructionDetail, AssemblyError> {
        self.by_opcode.get(&opcode).ok_or_else(|| {
            AssemblyError::InvalidMnemonic(format!("no catalog entry for opcode {opcode:#04x}"))
        })
    }
}
