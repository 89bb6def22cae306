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

//! [`Token`], the tagged union every tokenized atom becomes, and
//! [`TokenGroup`], the ordered sequence one source line tokenizes into.

use crate::instruction_table::OpcodeNode;
use crate::symbol::Symbol;
use crate::value::Expression;

/// Which of `([{` or `)]}` a punctuator atom is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctuatorSide {
    Begin,
    End,
}

/// A single tokenized atom. Variants carry typed payloads rather than a
/// dynamic `data` slot, so matching on `Token` is exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Directive(String),
    StorageDirective(String),
    MemoryDirective(String),
    MemoryOption(String),
    Operator(String),
    Punctuator { text: String, side: Option<PunctuatorSide> },
    Expression { text: String, value: Expression },
    Symbol { text: String, value: Symbol },
    Instruction { text: String, node: OpcodeNode },
    Literal(String),
    Invalid { text: String, reason: String },
}

impl Token {
    /// The raw source text this token was built from.
    pub fn text(&self) -> &str {
        match self {
            Token::Directive(t)
            | Token::StorageDirective(t)
            | Token::MemoryDirective(t)
            | Token::MemoryOption(t)
            | Token::Operator(t)
            | Token::Literal(t) => t,
            Token::Punctuator { text, .. } => text,
            Token::Expression { text, .. } => text,
            Token::Symbol { text, .. } => text,
            Token::Instruction { text, .. } => text,
            Token::Invalid { text, .. } => text,
        }
    }

    /// A short tag naming this token's kind, for diagnostics and dispatch.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Directive(_) => "Directive",
            Token::StorageDirective(_) => "StorageDirective",
            Token::MemoryDirective(_) => "MemoryDirective",
            Token::MemoryOption(_) => "MemoryOption",
            Token::Operator(_) => "Operator",
            Token::Punctuator { side: Some(PunctuatorSide::Begin), .. } => "BeginPunctuator",
            Token::Punctuator { side: Some(PunctuatorSide::End), .. } => "EndPunctuator",
            Token::Punctuator { .. } => "Punctuator",
            Token::Expression { .. } => "Expression",
            Token::Symbol { .. } => "Symbol",
            Token::Instruction { .. } => "Instruction",
            Token::Literal(_) => "Literal",
            Token::Invalid { .. } => "Invalid",
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Token::Directive(_))
    }

    pub fn is_storage_directive(&self) -> bool {
        matches!(self, Token::StorageDirective(_))
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self, Token::Instruction { .. })
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Token::Symbol { .. })
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Token::Expression { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Token::Symbol { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_instruction_node(&self) -> Option<&OpcodeNode> {
        match self {
            Token::Instruction { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// An ordered sequence of tokens produced from one logical source line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenGroup {
    tokens: Vec<Token>,
}

impl TokenGroup {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenGroup { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn slice(&self, start: usize) -> TokenGroup {
        TokenGroup::new(self.tokens[start.min(self.tokens.len())..].to_vec())
    }

    pub fn slice_range(&self, start: usize, end: usize) -> TokenGroup {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        TokenGroup::new(self.tokens[start..end].to_vec())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Linear search for a token whose raw text equals `value`.
    pub fn find_by_value(&self, value: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.text().eq_ignore_ascii_case(value))
    }

    /// Linear search for the first token whose kind name equals `kind`.
    pub fn find_by_kind(&self, kind: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.kind_name() == kind)
    }
}

impl std::ops::Index<usize> for TokenGroup {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenGroup {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_name_distinguishes_punctuator_sides() {
        let begin = Token::Punctuator { text: "(".to_string(), side: Some(PunctuatorSide::Begin) };
        let end = Token::Punctuator { text: ")".to_string(), side: Some(PunctuatorSide::End) };
        assert_eq!(begin.kind_name(), "BeginPunctuator");
        assert_eq!(end.kind_name(), "EndPunctuator");
    }

    #[test]
    fn find_by_value_is_case_insensitive() {
        let group = TokenGroup::new(vec![Token::Directive("def".to_string())]);
        assert_eq!(group.find_by_value("DEF"), Some(0));
    }

    #[test]
    fn slice_clamps_to_length() {
        let group = TokenGroup::new(vec![Token::Literal("a".to_string())]);
        assert_eq!(group.slice(5).len(), 0);
    }
}
