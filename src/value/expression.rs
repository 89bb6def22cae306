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

//! A validated numeric or string literal: [`Expression`].

use super::descriptor::{self, Base, Descriptor, BIN_DSC, DEC_DSC, HEX16_DSC, HEX_DSC, OCT_DSC, STR_DSC};
use crate::errors::AssemblyError;

/// Prefixes tried, longest-match-first. `0x` must be tried before `0`, and
/// `$$` before `$`, or the shorter prefix would always win.
const PREFIXES: [&str; 8] = ["0x", "0", "$$", "$", "&", "%", "'", "\""];

/// A validated literal, carrying its prefix, un-affixed digits, base, the
/// descriptor that validated it, and a cached integer value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    prefix: String,
    word: String,
    suffix: String,
    base: Base,
    descriptor: Descriptor,
    int_value: i64,
}

impl Expression {
    /// Parse and validate `text` into an `Expression`.
    pub fn new(text: &str) -> Result<Expression, AssemblyError> {
        let expr = text.trim();
        if expr.chars().count() < 3 {
            return Err(AssemblyError::ExpressionSyntax(format!(
                "Expression length must be > 2: [{expr}]"
            )));
        }

        let prefix = *PREFIXES
            .iter()
            .find(|p| expr.starts_with(**p))
            .ok_or_else(|| {
                AssemblyError::ExpressionSyntax(format!("Invalid prefix in expression: [{expr}]"))
            })?;

        let rest = &expr[prefix.len()..];
        let (word, suffix): (&str, &str) = if prefix == "'" || prefix == "\"" {
            if rest.len() >= prefix.len() && rest.ends_with(prefix) {
                (&rest[..rest.len() - prefix.len()], prefix)
            } else {
                return Err(AssemblyError::ExpressionSyntax(format!(
                    "Mismatched string affix [{expr}]"
                )));
            }
        } else {
            (rest, "")
        };

        let (descriptor, base) = match prefix {
            "$" | "0x" => {
                if word.chars().count() > 2 {
                    (HEX16_DSC, Base::Hex)
                } else {
                    (HEX_DSC, Base::Hex)
                }
            }
            "$$" => (HEX16_DSC, Base::Hex),
            "0" => (DEC_DSC, Base::Decimal),
            "'" | "\"" => (STR_DSC, Base::Str),
            "%" => (BIN_DSC, Base::Binary),
            "&" => (OCT_DSC, Base::Octal),
            _ => unreachable!("prefix list covers all cases"),
        };

        descriptor::validate(&descriptor, word)?;

        let int_value = match base.radix() {
            Some(radix) => i64::from_str_radix(word, radix).unwrap_or(0),
            None => 0,
        };

        Ok(Expression {
            prefix: prefix.to_string(),
            word: word.to_string(),
            suffix: suffix.to_string(),
            base,
            descriptor,
            int_value,
        })
    }

    /// Return true if `text` (after trimming) starts with a recognized
    /// expression prefix, without validating or building the value.
    pub fn has_valid_prefix(text: &str) -> bool {
        let expr = text.trim();
        PREFIXES.iter().any(|p| expr.starts_with(*p))
    }

    pub fn integer_value(&self) -> i64 {
        self.int_value
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn prefixless_value(&self) -> &str {
        &self.word
    }

    pub fn base(&self) -> Base {
        self.base
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// True if this expression's descriptor tops out at 255 (an 8-bit value).
    pub fn is_8_bit(&self) -> bool {
        self.descriptor.limits.max <= 0x100
    }

    /// The full text this Expression was parsed from (prefix + word + suffix).
    pub fn cleaned_str(&self) -> String {
        format!("{}{}{}", self.prefix, self.word, self.suffix)
    }

    fn new_from_same_format(&self, value: i64) -> Result<Expression, AssemblyError> {
        let rendered = match (self.prefix.as_str(), self.base) {
            ("$", Base::Hex) if self.descriptor.limits.max <= 0x100 => format!("${value:02X}"),
            ("$", Base::Hex) => format!("${value:04X}"),
            ("$$", Base::Hex) => format!("$${value:04X}"),
            ("0x", Base::Hex) if self.descriptor.limits.max <= 0x100 => format!("0x{value:02X}"),
            ("0x", Base::Hex) => format!("0x{value:04X}"),
            ("0", Base::Decimal) => format!("0{value}"),
            ("%", Base::Binary) => format!("%{value:08b}"),
            ("&", Base::Octal) => format!("&{value:o}"),
            _ => {
                return Err(AssemblyError::ExpressionSyntax(
                    "Arithmetic is only defined for numeric expressions".to_string(),
                ));
            }
        };
        Expression::new(&rendered)
    }

    fn require_numeric(&self, other: &Expression) -> Result<(), AssemblyError> {
        if self.base.radix().is_none() || other.base.radix().is_none() {
            return Err(AssemblyError::ExpressionSyntax(
                "Operand must be a numeric expression".to_string(),
            ));
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Expression) -> Result<Expression, AssemblyError> {
        self.require_numeric(other)?;
        let val = self.int_value + other.int_value;
        if val > self.descriptor.limits.max - 1 {
            return Err(AssemblyError::ExpressionDescriptor(
                "Operation would exceed bounds".to_string(),
            ));
        }
        self.new_from_same_format(val)
    }

    pub fn checked_sub(&self, other: &Expression) -> Result<Expression, AssemblyError> {
        self.require_numeric(other)?;
        let val = self.int_value - other.int_value;
        if val < 0 {
            return Err(AssemblyError::ExpressionDescriptor(
                "Resulting Expression cannot be negative".to_string(),
            ));
        }
        self.new_from_same_format(val)
    }

    pub fn bitand(&self, other: &Expression) -> Result<Expression, AssemblyError> {
        self.require_numeric(other)?;
        self.new_from_same_format(self.int_value & other.int_value)
    }

    pub fn bitor(&self, other: &Expression) -> Result<Expression, AssemblyError> {
        self.require_numeric(other)?;
        self.new_from_same_format(self.int_value | other.int_value)
    }

    pub fn bitxor(&self, other: &Expression) -> Result<Expression, AssemblyError> {
        self.require_numeric(other)?;
        self.new_from_same_format(self.int_value ^ other.int_value)
    }
}

impl PartialOrd for Expression {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.int_value.cmp(&other.int_value))
    }
}

impl Ord for Expression {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.int_value.cmp(&other.int_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex8_round_trip() {
        let e = Expression::new("$FF").unwrap();
        assert_eq!(e.integer_value(), 255);
        assert!(e.is_8_bit());
    }

    #[test]
    fn hex16_from_four_digits() {
        let e = Expression::new("$0100").unwrap();
        assert_eq!(e.integer_value(), 256);
        assert!(!e.is_8_bit());
    }

    #[test]
    fn dollar_dollar_is_always_16_bit() {
        let e = Expression::new("$$00AB").unwrap();
        assert_eq!(e.integer_value(), 0xAB);
        assert!(!e.is_8_bit());
    }

    #[test]
    fn decimal_strips_leading_marker_digit() {
        let e = Expression::new("0100").unwrap();
        assert_eq!(e.integer_value(), 100);
    }

    #[test]
    fn binary_is_8_bit() {
        let e = Expression::new("%00001010").unwrap();
        assert_eq!(e.integer_value(), 10);
    }

    #[test]
    fn octal_value() {
        let e = Expression::new("&17").unwrap();
        assert_eq!(e.integer_value(), 15);
    }

    #[test]
    fn string_literal() {
        let e = Expression::new("\"Hi\"").unwrap();
        assert_eq!(e.prefixless_value(), "Hi");
    }

    #[test]
    fn mismatched_quotes_rejected() {
        assert!(Expression::new("\"Hi'").is_err());
    }

    #[test]
    fn too_short_rejected() {
        assert!(Expression::new("$F").is_err());
    }

    #[test]
    fn cleaned_str_round_trips_integer_value() {
        let e = Expression::new("$2A").unwrap();
        let reparsed = Expression::new(&e.cleaned_str()).unwrap();
        assert_eq!(e.integer_value(), reparsed.integer_value());
    }

    #[test]
    fn add_overflow_is_rejected() {
        let a = Expression::new("$FF").unwrap();
        let b = Expression::new("$01").unwrap();
        assert!(a.checked_add(&b).is_err());
    }

    #[test]
    fn add_preserves_prefix_and_width() {
        let a = Expression::new("$10").unwrap();
        let b = Expression::new("$01").unwrap();
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.integer_value(), 0x11);
        assert_eq!(sum.prefix(), "$");
    }

    #[test]
    fn sub_below_zero_is_rejected() {
        let a = Expression::new("$01").unwrap();
        let b = Expression::new("$02").unwrap();
        assert!(a.checked_sub(&b).is_err());
    }
}
