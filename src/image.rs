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

//! [`Image`]: the append-only, address-tagged byte output the driver builds
//! as it assembles each line.

use crate::instruction_pointer::InstructionPointer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub base_addr: u16,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Image {
    segments: Vec<Segment>,
}

impl Image {
    pub fn new() -> Self {
        Image { segments: Vec::new() }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Start a new run at `addr`.
    pub fn new_segment(&mut self, addr: u16) {
        self.segments.push(Segment { base_addr: addr, bytes: Vec::new() });
    }

    /// Extend the most recent run (creating one at `ip`'s current position if
    /// none exists yet) and advance `ip` by the number of bytes appended.
    pub fn append(&mut self, bytes: &[u8], ip: &mut InstructionPointer) {
        if self.segments.is_empty() {
            self.new_segment(ip.current());
        }
        self.segments.last_mut().expect("segment just ensured").bytes.extend_from_slice(bytes);
        ip.move_relative(bytes.len() as i32).expect("byte run must stay within address space");
    }

    /// Overwrite `bytes` at `addr`, in place, within whichever segment
    /// already covers that whole range. Used to patch a forward-reference
    /// placeholder once the reference it names has resolved. Returns `false`
    /// (no segment touched) if no single segment covers the full range.
    pub fn patch(&mut self, addr: u16, bytes: &[u8]) -> bool {
        let addr = addr as usize;
        for segment in self.segments.iter_mut() {
            let start = segment.base_addr as usize;
            let end = start + segment.bytes.len();
            if addr >= start && addr + bytes.len() <= end {
                segment.bytes[addr - start..addr - start + bytes.len()].copy_from_slice(bytes);
                return true;
            }
        }
        false
    }

    /// Flatten into a zero-filled 64 KiB ROM image. Later segments overwrite
    /// earlier ones at overlapping addresses.
    pub fn flatten(&self) -> Vec<u8> {
        let mut out = vec![0u8; 0x1_0000];
        for segment in &self.segments {
            let start = segment.base_addr as usize;
            for (i, byte) in segment.bytes.iter().enumerate() {
                if start + i < out.len() {
                    out[start + i] = *byte;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_creates_segment_at_current_ip() {
        let mut image = Image::new();
        let mut ip = InstructionPointer::new();
        ip.set_base_addr(0x0100);
        image.append(&[0x01, 0x02], &mut ip);
        assert_eq!(image.segments().len(), 1);
        assert_eq!(image.segments()[0].base_addr, 0x0100);
        assert_eq!(image.segments()[0].bytes, vec![0x01, 0x02]);
        assert_eq!(ip.current(), 0x0102);
    }

    #[test]
    fn append_extends_most_recent_segment() {
        let mut image = Image::new();
        let mut ip = InstructionPointer::new();
        image.new_segment(0x0000);
        image.append(&[0xAA], &mut ip);
        image.append(&[0xBB], &mut ip);
        assert_eq!(image.segments().len(), 1);
        assert_eq!(image.segments()[0].bytes, vec![0xAA, 0xBB]);
    }

    #[test]
    fn patch_overwrites_bytes_already_in_a_segment() {
        let mut image = Image::new();
        let mut ip = InstructionPointer::new();
        ip.set_base_addr(0x0000);
        image.append(&[0xC3, 0x00, 0x00], &mut ip);
        assert!(image.patch(0x0001, &[0xD2, 0xFF]));
        assert_eq!(image.segments()[0].bytes, vec![0xC3, 0xD2, 0xFF]);
    }

    #[test]
    fn patch_refuses_a_range_outside_every_segment() {
        let mut image = Image::new();
        image.new_segment(0x0000);
        image.segments.last_mut().unwrap().bytes = vec![0x00];
        assert!(!image.patch(0x0010, &[0xFF]));
    }

    #[test]
    fn flatten_zero_fills_gaps() {
        let mut image = Image::new();
        image.new_segment(0x0002);
        image.segments.last_mut().unwrap().bytes = vec![0x42];
        let flat = image.flatten();
        assert_eq!(flat[0], 0);
        assert_eq!(flat[2], 0x42);
    }
}
