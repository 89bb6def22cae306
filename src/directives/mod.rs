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

//! Directive handlers: `DEF`, `SECTION`, and the storage directives
//! (`DS`/`DB`/`DW`). Each consumes a prefix of a [`TokenGroup`] and returns
//! the index of the first unconsumed token.

pub mod define;
pub mod section;
pub mod storage;
