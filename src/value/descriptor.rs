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

//! Descriptors: the (char-count range, value range, base, charset) tuples
//! that validate a numeric or string literal's digits.

use crate::errors::AssemblyError;

/// A base-10 min/max pair. `max` is exclusive, matching the reference's use
/// of Python's `range(min, max)` for both character-count and value bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMax {
    pub min: i64,
    pub max: i64,
}

impl MinMax {
    pub const fn new(min: i64, max: i64) -> Self {
        MinMax { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value < self.max
    }
}

/// The base a literal's digits are expressed in. `Label` and `Str` are the
/// two non-numeric sentinel bases from spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Binary,
    Octal,
    Decimal,
    Hex,
    Label,
    Str,
}

impl Base {
    /// The numeric radix for this base, or `None` for the two sentinel bases.
    pub fn radix(self) -> Option<u32> {
        match self {
            Base::Binary => Some(2),
            Base::Octal => Some(8),
            Base::Decimal => Some(10),
            Base::Hex => Some(16),
            Base::Label | Base::Str => None,
        }
    }

    fn char_allowed(self, c: char) -> bool {
        match self {
            Base::Binary => matches!(c, '0' | '1'),
            Base::Octal => c.is_digit(8),
            Base::Decimal => c.is_ascii_digit(),
            Base::Hex => c.is_ascii_hexdigit(),
            Base::Label => c.is_ascii_alphanumeric() || c == '_',
            Base::Str => {
                c.is_ascii_alphanumeric()
                    || c == ' '
                    || (c.is_ascii_punctuation() && c != '\'' && c != '"')
            }
        }
    }
}

/// A descriptor: valid character-count range, valid value range (numeric
/// bases only), and the base that dictates the charset.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub chars: MinMax,
    pub limits: MinMax,
    pub base: Base,
}

pub const HEX_DSC: Descriptor = Descriptor {
    chars: MinMax::new(2, 3),
    limits: MinMax::new(0, 0x100),
    base: Base::Hex,
};

pub const HEX16_DSC: Descriptor = Descriptor {
    chars: MinMax::new(2, 5),
    limits: MinMax::new(0, 0x1_0000),
    base: Base::Hex,
};

pub const DEC_DSC: Descriptor = Descriptor {
    chars: MinMax::new(1, 6),
    limits: MinMax::new(0, 0x1_0000),
    base: Base::Decimal,
};

pub const BIN_DSC: Descriptor = Descriptor {
    chars: MinMax::new(2, 9),
    limits: MinMax::new(0, 0x100),
    base: Base::Binary,
};

pub const OCT_DSC: Descriptor = Descriptor {
    chars: MinMax::new(1, 7),
    limits: MinMax::new(0, 0x1_0000),
    base: Base::Octal,
};

pub const LBL_DSC: Descriptor = Descriptor {
    chars: MinMax::new(1, 33),
    limits: MinMax::new(0, 0),
    base: Base::Label,
};

pub const STR_DSC: Descriptor = Descriptor {
    chars: MinMax::new(1, 256),
    limits: MinMax::new(0, 0),
    base: Base::Str,
};

/// Validate `value` (digits only, affixes already stripped) against `desc`.
///
/// Three steps, in order: charset, character count, then (for numeric bases)
/// the integer value range. Label/string bases additionally require the
/// first character to be a letter.
pub fn validate(desc: &Descriptor, value: &str) -> Result<(), AssemblyError> {
    if value.is_empty() || !value.chars().all(|c| desc.base.char_allowed(c)) {
        return Err(AssemblyError::ExpressionDescriptor(format!(
            "{value} has characters invalid for base {:?}",
            desc.base
        )));
    }

    let len = value.chars().count() as i64;
    if !desc.chars.contains(len) {
        return Err(AssemblyError::ExpressionDescriptor(format!(
            "{value} must be between {} and {} characters",
            desc.chars.min,
            desc.chars.max - 1
        )));
    }

    match desc.base.radix() {
        Some(radix) => {
            let dec = i64::from_str_radix(value, radix).map_err(|_| {
                AssemblyError::ExpressionDescriptor(format!(
                    "{value} is not a valid base-{radix} value"
                ))
            })?;
            if !desc.limits.contains(dec) {
                return Err(AssemblyError::ExpressionDescriptor(format!(
                    "{dec} outside range {}..{}",
                    desc.limits.min, desc.limits.max
                )));
            }
        }
        None => {
            if !value.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                return Err(AssemblyError::ExpressionDescriptor(format!(
                    "{value} has invalid first char"
                )));
            }
        }
    }
    Ok(())
}
