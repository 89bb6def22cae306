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

//! [`Symbol`] (name bound to an address, scoped by affix) and its
//! process-wide store.

use std::collections::HashMap;

use crate::errors::AssemblyError;
use crate::value::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Private,
    Local,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub clean_name: String,
    pub address: Expression,
}

/// Strip any scope affixes from `name`, returning the bare name and, if an
/// affix was present, which scope it encodes. A name with no trailing colon
/// carries no scope at all — per the reference, a symbol is only a symbol
/// once it names its scope; a bare identifier is left for lookups (which
/// tolerate the affix being typed or omitted), not for construction.
fn strip_affixes(name: &str) -> (String, Option<SymbolScope>) {
    let is_private = name.starts_with('.');
    let is_global = name.ends_with("::");
    let is_local = !is_global && name.ends_with(':');

    if is_private && is_local {
        let stripped = &name[1..name.len() - 1];
        return (stripped.to_string(), Some(SymbolScope::Private));
    }
    if is_global {
        let stripped = &name[..name.len() - 2];
        return (stripped.to_string(), Some(SymbolScope::Global));
    }
    if is_local {
        let stripped = &name[..name.len() - 1];
        return (stripped.to_string(), Some(SymbolScope::Local));
    }
    (name.to_string(), None)
}

fn clean_name(name: &str) -> Result<(String, SymbolScope), AssemblyError> {
    let (stripped, scope) = strip_affixes(name);
    let scope = scope.ok_or_else(|| {
        AssemblyError::InvalidSymbolScope(format!(
            "Symbol must end with a single or double colon affix: {name}"
        ))
    })?;
    Ok((stripped, scope))
}

fn validate_clean_name(clean: &str, original: &str) -> Result<(), AssemblyError> {
    let mut chars = clean.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = clean.chars().skip(1).all(|c| c.is_ascii_alphanumeric() || c == '_');

    if clean.is_empty() || !starts_with_letter || !rest_ok {
        return Err(AssemblyError::InvalidSymbolName(format!(
            "Symbol name must start with a letter and contain only [A-Za-z0-9_]: {original}"
        )));
    }
    if clean.chars().count() > 32 {
        return Err(AssemblyError::InvalidSymbolName(format!(
            "Symbol name exceeds 32 characters: {original}"
        )));
    }
    Ok(())
}

impl Symbol {
    pub fn new(name: &str, address: Expression) -> Result<Symbol, AssemblyError> {
        let (clean, scope) = clean_name(name)?;
        validate_clean_name(&clean, name)?;
        Ok(Symbol { name: name.to_string(), scope, clean_name: clean, address })
    }

    pub fn key(&self) -> String {
        self.clean_name.to_ascii_uppercase()
    }
}

/// The process-wide symbol registry. Key is `upper(clean_name)`.
#[derive(Default)]
pub struct SymbolStore {
    entries: HashMap<String, Symbol>,
    order: Vec<String>,
}

impl SymbolStore {
    pub fn new() -> Self {
        SymbolStore::default()
    }

    /// Insert `symbol`. Returns true on success; on key collision, overwrites
    /// and returns true only if `replace` is set, else leaves the existing
    /// entry untouched and returns false.
    pub fn push(&mut self, symbol: Symbol, replace: bool) -> bool {
        let key = symbol.key();
        if self.entries.contains_key(&key) {
            if !replace {
                return false;
            }
        } else {
            self.order.push(key.clone());
        }
        self.entries.insert(key, symbol);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        let (clean, _) = strip_affixes(name);
        self.entries.get(&clean.to_ascii_uppercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Symbol> {
        let (clean, _) = strip_affixes(name);
        let key = clean.to_ascii_uppercase();
        self.order.retain(|k| k != &key);
        self.entries.remove(&key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(move |key| self.entries.get(key))
    }
}
