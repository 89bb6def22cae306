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

//! [`Label`] (name bound to a plain value, no scope affixes) and its store.
//! Disjoint from [`crate::symbol::Symbol`]: labels hold values, symbols hold
//! addresses.

use std::collections::HashMap;

use crate::errors::AssemblyError;
use crate::value::Expression;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub value: Expression,
}

fn validate_name(name: &str) -> Result<(), AssemblyError> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = name.chars().skip(1).all(|c| c.is_ascii_alphanumeric() || c == '_');
    if name.is_empty() || !starts_with_letter || !rest_ok {
        return Err(AssemblyError::InvalidSymbolName(format!(
            "Label name must start with a letter and contain only [A-Za-z0-9_]: {name}"
        )));
    }
    Ok(())
}

impl Label {
    pub fn new(name: &str, value: Expression) -> Result<Label, AssemblyError> {
        validate_name(name)?;
        Ok(Label { name: name.to_string(), value })
    }

    pub fn key(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}

#[derive(Default)]
pub struct LabelStore {
    entries: HashMap<String, Label>,
    order: Vec<String>,
}

impl LabelStore {
    pub fn new() -> Self {
        LabelStore::default()
    }

    pub fn push(&mut self, label: Label, replace: bool) -> bool {
        let key = label.key();
        if self.entries.contains_key(&key) {
            if !replace {
                return false;
            }
        } else {
            self.order.push(key.clone());
        }
        self.entries.insert(key, label);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Label> {
        self.entries.get(&name.to_ascii_uppercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Label> {
        let key = name.to_ascii_uppercase();
        self.order.retain(|k| k != &key);
        self.entries.remove(&key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.order.iter().filter_map(move |key| self.entries.get(key))
    }
}
