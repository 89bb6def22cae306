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

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AssemblyError;

pub trait FileReader {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>>;
}

// production file reader
pub struct AsmFileReader;

impl FileReader for AsmFileReader {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}

// Enum to hold either text or binary data
#[derive(Clone)]
enum FileData {
    Text(String),
    Binary(Vec<u8>),
}

// mock file reader for testing
#[derive(Default)]
pub struct MockFileReader {
    files: HashMap<PathBuf, FileData>,
}

impl MockFileReader {
    pub fn add_file(&mut self, path: &str, content: &str) {
        self.files
            .insert(PathBuf::from(path), FileData::Text(content.to_string()));
    }

    pub fn add_binary_file(&mut self, path: &str, content: &[u8]) {
        self.files
            .insert(PathBuf::from(path), FileData::Binary(content.to_vec()));
    }
}

impl FileReader for MockFileReader {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.files.get(path) {
            Some(FileData::Text(content)) => Ok(content.clone()),
            Some(FileData::Binary(_)) => {
                Err(anyhow::anyhow!("Cannot read binary file as string: {}", path.display()))
            }
            None => Err(anyhow::anyhow!("Mock file not found: {}", path.display())),
        }
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        match self.files.get(path) {
            Some(FileData::Binary(content)) => Ok(content.clone()),
            Some(FileData::Text(_)) => {
                Err(anyhow::anyhow!("Cannot read text file as binary: {}", path.display()))
            }
            None => Err(anyhow::anyhow!("Mock file not found: {}", path.display())),
        }
    }
}

/// Join backslash-terminated physical lines with the line that follows.
fn join_continuations(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buffer = String::new();
    for line in text.lines() {
        let trimmed_end = line.trim_end();
        if let Some(stripped) = trimmed_end.strip_suffix('\\') {
            buffer.push_str(stripped);
            buffer.push(' ');
        } else {
            buffer.push_str(trimmed_end);
            out.push(std::mem::take(&mut buffer));
        }
    }
    if !buffer.is_empty() {
        out.push(buffer);
    }
    out
}

/// Strip a `;`-comment, drop the whole line if it starts with `*`, and trim
/// trailing whitespace. Leading whitespace is left alone.
fn strip_comment_and_trim(line: &str) -> String {
    if line.trim_start().starts_with('*') {
        return String::new();
    }
    let stripped = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    stripped.trim_end().to_string()
}

/// If `line` is an `INCLUDE "path"`/`INCLUDE 'path'` directive, the quoted
/// path; `None` otherwise.
fn include_target(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let mut words = trimmed.splitn(2, char::is_whitespace);
    let first = words.next()?;
    if !first.eq_ignore_ascii_case("INCLUDE") {
        return None;
    }
    let rest = words.next()?.trim();
    let unquoted = rest.trim_matches(|c| c == '"' || c == '\'');
    if unquoted.is_empty() { None } else { Some(unquoted.to_string()) }
}

/// Read `path` through `reader` and return its logical lines with comments
/// stripped, continuations joined, and `INCLUDE`d files spliced in at the
/// point of inclusion. A file already open on the include stack is rejected
/// as a cyclic include rather than silently skipped.
pub fn logical_lines<F: FileReader>(
    reader: &F,
    path: &Path,
) -> Result<Vec<String>, AssemblyError> {
    let mut open = HashSet::new();
    collect_logical_lines(reader, path, &mut open)
}

fn collect_logical_lines<F: FileReader>(
    reader: &F,
    path: &Path,
    open: &mut HashSet<PathBuf>,
) -> Result<Vec<String>, AssemblyError> {
    let key = path.to_path_buf();
    if !open.insert(key.clone()) {
        return Err(AssemblyError::StructuralError {
            line: 0,
            reason: format!("cyclic INCLUDE of {}", path.display()),
        });
    }

    let raw = reader.read_to_string(path).map_err(|e| AssemblyError::StructuralError {
        line: 0,
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let mut out = Vec::new();
    for (idx, raw_line) in join_continuations(&raw).iter().enumerate() {
        let logical = strip_comment_and_trim(raw_line);
        match include_target(&logical) {
            Some(include_path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                let resolved = dir.join(include_path);
                let included = collect_logical_lines(reader, &resolved, open)
                    .map_err(|e| e.on_line(idx + 1))?;
                out.extend(included);
            }
            None => out.push(logical),
        }
    }

    open.remove(&key);
    Ok(out)
}
