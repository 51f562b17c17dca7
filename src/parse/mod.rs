//! Whole-file readers. Each submodule parses one archive file into an
//! owned struct; `level` assembles them into the aggregate.

use std::fs;
use std::path::Path;

use crate::bytes;
use crate::error::{LevelError, Result};

pub mod chunk;
pub mod engine;
pub mod gameplay;
pub mod side;

/// Read a whole archive file. A missing path becomes [`LevelError::MissingFile`]
/// so callers can tell "not there" apart from real I/O failures.
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LevelError::MissingFile {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Tail slice starting at a header pointer. Counted sections bound their own
/// reads, so the slice runs to the end of the file.
pub(crate) fn section(data: &[u8], pointer: u32) -> Result<&[u8]> {
    bytes::bytes(data, pointer as usize, data.len() - (pointer as usize).min(data.len()))
}

/// Read `count` pvar spans through their `{offset, size}` entry table.
/// Offsets are relative to the data pointer. Shared by the gameplay and
/// mission readers.
pub(crate) fn read_pvars(data: &[u8], table: u32, base: u32, count: usize) -> Result<Vec<Vec<u8>>> {
    let table = table as usize;
    let base = base as usize;
    let mut pvars = Vec::with_capacity(count);
    for i in 0..count {
        let offset = bytes::read_u32(data, table + i * 8)? as usize;
        let size = bytes::read_u32(data, table + i * 8 + 4)? as usize;
        pvars.push(bytes::bytes(data, base + offset, size)?.to_vec());
    }
    Ok(pvars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_get_their_own_error() {
        let path = Path::new("/nonexistent/engine.ps3");
        match read_file(path) {
            Err(LevelError::MissingFile { path: p }) => assert_eq!(p, path),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn sections_are_tail_slices() {
        let data = [0u8, 1, 2, 3, 4, 5];
        assert_eq!(section(&data, 4).unwrap(), &[4, 5]);
        assert_eq!(section(&data, 6).unwrap(), &[] as &[u8]);
        assert!(section(&data, 7).is_err());
    }
}
