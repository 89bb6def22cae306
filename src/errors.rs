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

use thiserror::Error;

/// The full error taxonomy produced by the core pipeline.
///
/// Every variant names the construct that failed and the offending text, per
/// the fail-fast policy: parsers and validators never swallow a malformed
/// construct. A forward reference to a not-yet-defined label or symbol is
/// not surfaced as an error while resolution is still in progress — the
/// resolver provisionally resolves it and the driver retries at the end of
/// the translation unit (see `AssemblerContext::resolve_fixups`).
/// `Unresolved` below is the terminal failure: a reference still absent
/// once every line has been seen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("expression syntax error: {0}")]
    ExpressionSyntax(String),

    #[error("expression descriptor error: {0}")]
    ExpressionDescriptor(String),

    #[error("invalid symbol name: {0}")]
    InvalidSymbolName(String),

    #[error("invalid symbol scope: {0}")]
    InvalidSymbolScope(String),

    #[error("DEF is missing a name or value: {0}")]
    DefineSymbolError(String),

    #[error("DEF has an unrecognized assignment operator: {0}")]
    DefineAssignmentError(String),

    #[error("malformed SECTION declaration: {0}")]
    SectionDeclarationError(String),

    #[error("invalid SECTION bank: {0}")]
    SectionBankError(String),

    #[error("invalid SECTION alignment: {0}")]
    SectionAlignError(String),

    #[error("storage directive error: {0}")]
    StorageValueError(String),

    #[error("cannot update address of a non-addressing symbol: {0}")]
    UpdateSymbolAddressError(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid operand for {mnemonic}: {operand}")]
    InvalidOperand { mnemonic: String, operand: String },

    #[error("reserved directive is not implemented: {0}")]
    ReservedDirective(String),

    #[error("unresolved reference: {0}")]
    Unresolved(String),

    #[error("Structural Error on line {line}: {reason}")]
    StructuralError { line: usize, reason: String },

    #[error("Semantic Error on line {line}: {reason}")]
    SemanticError { line: usize, reason: String },

    #[error("Semantic Error: {reason}")]
    SemanticErrorNoLine { reason: String },
}

impl AssemblyError {
    /// Attach a source line number to an error that doesn't already carry one.
    pub fn on_line(self, line: usize) -> AssemblyError {
        match self {
            AssemblyError::StructuralError { .. } | AssemblyError::SemanticError { .. } => self,
            other => AssemblyError::SemanticError {
                line,
                reason: other.to_string(),
            },
        }
    }
}
