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

//! The value model: validated literals ([`Expression`]), their descriptors,
//! and conversions between them and the byte representations the rest of
//! the pipeline needs.

pub mod convert;
pub mod descriptor;
pub mod expression;

pub use descriptor::{Base, Descriptor, MinMax};
pub use expression::Expression;
