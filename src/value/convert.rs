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

//! Plain numeric conversions between an [`Expression`]'s cached integer value
//! and the representations the emitter and directive handlers need.

use crate::errors::AssemblyError;

use super::descriptor::Base;
use super::expression::Expression;

/// Decimal value of `expr`.
pub fn to_decimal(expr: &Expression) -> i64 {
    expr.integer_value()
}

/// Low byte of `expr`'s value, as an 8-bit hex quantity.
pub fn to_hex(expr: &Expression) -> u8 {
    (expr.integer_value() & 0xFF) as u8
}

/// Full value of `expr`, as a 16-bit hex quantity.
pub fn to_hex16(expr: &Expression) -> u16 {
    (expr.integer_value() & 0xFFFF) as u16
}

/// `expr`'s value re-expressed as an `&`-prefixed octal Expression.
pub fn to_octal(expr: &Expression) -> Result<Expression, AssemblyError> {
    Expression::new(&format!("&{:o}", expr.integer_value()))
}

/// `expr`'s value re-expressed as a `%`-prefixed, zero-padded 8-bit binary
/// Expression. Only defined for values the binary descriptor can hold
/// (0..=255), matching `BIN_DSC`'s value range.
pub fn to_binary(expr: &Expression) -> Result<Expression, AssemblyError> {
    Expression::new(&format!("%{:08b}", expr.integer_value()))
}

/// Two uppercase hex digits, e.g. `"2A"`.
pub fn to_hex_string(expr: &Expression) -> String {
    format!("{:02X}", to_hex(expr))
}

/// Four uppercase hex digits, e.g. `"0100"`.
pub fn to_hex16_string(expr: &Expression) -> String {
    format!("{:04X}", to_hex16(expr))
}

/// Pack `expr`'s value into little-endian bytes for image emission: one byte
/// for an 8-bit expression, two for a 16-bit one, or the raw ASCII bytes of
/// the word for a string-base expression.
pub fn to_code(expr: &Expression) -> Vec<u8> {
    if expr.base() == Base::Str {
        return expr.prefixless_value().bytes().collect();
    }
    if expr.is_8_bit() {
        vec![to_hex(expr)]
    } else {
        let v = to_hex16(expr);
        vec![(v & 0xFF) as u8, (v >> 8) as u8]
    }
}
