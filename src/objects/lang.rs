//! Localized text tables.
//!
//! The gameplay file carries eight of these, one per language, all sharing
//! one layout:
//!
//! ```text
//! 0x00 count u32
//! 0x04 byteLen u32
//! 0x08 zero pad to 0x10
//! 0x10 count * { textOffset u32, id u32 }
//!      string pool
//! ```
//!
//! `textOffset` is relative to the section start. Strings are NUL-terminated
//! and each starts on a 4-byte boundary. Text is kept as raw bytes because
//! the pools are not valid UTF-8 in every language; [`LanguageEntry::text`]
//! gives a lossy view. Offsets and `byteLen` are recomputed from the entries
//! actually written, so editing a string never needs a manual table fixup.

use std::borrow::Cow;

use crate::bytes;
use crate::error::Result;

/// One string with its game-facing id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageEntry {
    pub id: u32,
    /// Raw bytes without the terminating NUL.
    pub text: Vec<u8>,
}

impl LanguageEntry {
    pub fn new(id: u32, text: &str) -> Self {
        LanguageEntry {
            id,
            text: text.as_bytes().to_vec(),
        }
    }

    /// Lossy decoded view of the raw bytes.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

/// One language's table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTable {
    pub entries: Vec<LanguageEntry>,
}

impl LanguageTable {
    pub fn decode(block: &[u8]) -> Result<Self> {
        let count = bytes::read_u32(block, 0x00)? as usize;
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let at = 0x10 + i * 8;
            let text_offset = bytes::read_u32(block, at)? as usize;
            let id = bytes::read_u32(block, at + 4)?;
            let mut end = text_offset;
            while bytes::read_u8(block, end)? != 0 {
                end += 1;
            }
            entries.push(LanguageEntry {
                id,
                text: block[text_offset..end].to_vec(),
            });
        }
        Ok(LanguageTable { entries })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        bytes::write_u32(&mut buf, self.entries.len() as u32);
        bytes::write_u32(&mut buf, 0); // byteLen, patched once the pool is laid out
        bytes::pad_to(&mut buf, 0x10);
        let table_at = buf.len();
        bytes::write_zeros(&mut buf, self.entries.len() * 8);
        for (i, entry) in self.entries.iter().enumerate() {
            bytes::pad_to(&mut buf, 4);
            let text_offset = buf.len() as u32;
            bytes::write_u32_at(&mut buf, table_at + i * 8, text_offset);
            bytes::write_u32_at(&mut buf, table_at + i * 8 + 4, entry.id);
            buf.extend_from_slice(&entry.text);
            buf.push(0);
        }
        bytes::pad_to(&mut buf, 4);
        let total = buf.len() as u32;
        bytes::write_u32_at(&mut buf, 0x04, total);
        buf
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LanguageTable {
        LanguageTable {
            entries: vec![
                LanguageEntry::new(300, "Press \x11 to extend the Swingshot."),
                LanguageEntry::new(301, "A"),
                LanguageEntry::new(302, "Grind rail ahead"),
            ],
        }
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let table = sample();
        let back = LanguageTable::decode(&table.encode()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn strings_start_on_four_byte_boundaries() {
        let buf = sample().encode();
        for i in 0..3 {
            let offset = bytes::read_u32(&buf, 0x10 + i * 8).unwrap();
            assert_eq!(offset % 4, 0, "entry {} at 0x{:X}", i, offset);
        }
    }

    #[test]
    fn byte_len_covers_the_whole_section() {
        let buf = sample().encode();
        assert_eq!(bytes::read_u32(&buf, 0x04).unwrap() as usize, buf.len());
        assert_eq!(buf.len() % 4, 0);
    }

    #[test]
    fn offsets_are_recomputed_after_an_edit() {
        let mut table = sample();
        table.entries[0].text = b"A considerably longer replacement string".to_vec();
        let buf = table.encode();
        let back = LanguageTable::decode(&buf).unwrap();
        assert_eq!(back.entries[0].text(), "A considerably longer replacement string");
        assert_eq!(back.entries[1].text(), "A");
        assert_eq!(back.entries[2].id, 302);
        assert_eq!(bytes::read_u32(&buf, 0x04).unwrap() as usize, buf.len());
    }

    #[test]
    fn non_utf8_bytes_survive_and_decode_lossily() {
        let table = LanguageTable {
            entries: vec![LanguageEntry {
                id: 7,
                text: vec![b'H', b'i', 0xFF, b'!'],
            }],
        };
        let back = LanguageTable::decode(&table.encode()).unwrap();
        assert_eq!(back.entries[0].text, table.entries[0].text);
        assert_eq!(back.entries[0].text(), "Hi\u{FFFD}!");
    }

    #[test]
    fn empty_table_is_a_bare_header() {
        let buf = LanguageTable::default().encode();
        assert_eq!(buf.len(), 0x10);
        assert!(LanguageTable::decode(&buf).unwrap().is_empty());
    }
}
