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

//! `DEF <name> (=|EQU|EQUS) <expression>`.

use crate::errors::AssemblyError;
use crate::label::Label;
use crate::token::TokenGroup;

/// Parse a `DEF` statement starting at `tokens[0]` (the `DEF` token itself)
/// and return the Label it defines plus the index of the first unconsumed
/// token.
pub fn parse_define(tokens: &TokenGroup) -> Result<(Label, usize), AssemblyError> {
    if tokens.len() < 4 {
        return Err(AssemblyError::DefineSymbolError(
            "Incomplete DEF definition".to_string(),
        ));
    }

    let name = tokens.get(1).expect("length checked above").text();
    let assignment = tokens.get(2).expect("length checked above").text();
    if !["=", "EQU", "EQUS"].iter().any(|op| op.eq_ignore_ascii_case(assignment)) {
        return Err(AssemblyError::DefineAssignmentError(format!(
            "unrecognized DEF assignment operator: {assignment}"
        )));
    }

    let value_token = tokens.get(3).expect("length checked above");
    let value = value_token.as_expression().ok_or_else(|| {
        AssemblyError::DefineSymbolError(format!(
            "DEF value must be an expression, got: {}",
            value_token.text()
        ))
    })?;

    let label = Label::new(name, value.clone())?;
    Ok((label, 4))
}
