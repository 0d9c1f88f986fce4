//! Secure erase — overwrite a file's bytes before unlinking it.
//!
//! Three full passes (random, `0xFF`, random) are written over the
//! file's original length in 4 KiB chunks, each followed by a sync to
//! durable storage, and only then is the file removed.
//!
//! This is best-effort.  Journaling filesystems, copy-on-write
//! filesystems, and SSD wear-levelling can all keep old blocks around
//! that no overwrite through the file API will ever reach.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use rand::RngCore;
use tracing::{debug, warn};

use crate::errors::{FileVaultError, Result};

/// Size of each overwrite write in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// What a single overwrite pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Fresh CSPRNG output for every chunk.
    Random,
    /// A constant byte.
    Fill(u8),
}

/// The pass sequence applied by `overwrite_all`.
pub const PASSES: [Pattern; 3] = [Pattern::Random, Pattern::Fill(0xFF), Pattern::Random];

/// Something that can be overwritten in place and forced to durable storage.
///
/// Implemented for `std::fs::File`; tests substitute in-memory stubs.
pub trait ErasableFile: Write + Seek {
    /// Flush OS buffers to the device (`fsync`).
    fn sync(&mut self) -> io::Result<()>;
}

impl ErasableFile for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Write one pass of `pattern` over the first `len` bytes of `file`,
/// then sync.
pub fn overwrite_pass<F: ErasableFile>(file: &mut F, len: u64, pattern: Pattern) -> io::Result<()> {
    file.seek(SeekFrom::Start(0))?;

    let mut buf = [0u8; CHUNK_SIZE];
    if let Pattern::Fill(byte) = pattern {
        buf.fill(byte);
    }
    let mut rng = rand::rng();

    let mut remaining = len;
    while remaining > 0 {
        // Never exceeds CHUNK_SIZE, so the cast is lossless.
        let chunk = remaining.min(CHUNK_SIZE as u64) as usize;
        if pattern == Pattern::Random {
            rng.fill_bytes(&mut buf[..chunk]);
        }
        file.write_all(&buf[..chunk])?;
        remaining -= chunk as u64;
    }

    file.flush()?;
    file.sync()
}

/// Run every pass in `PASSES`, stopping at the first failure.
pub fn overwrite_all<F: ErasableFile>(file: &mut F, len: u64) -> io::Result<()> {
    for pattern in PASSES {
        overwrite_pass(file, len, pattern)?;
    }
    Ok(())
}

/// Overwrite `path` three times and delete it.
///
/// Returns `InvalidInput` if the path is missing or not a regular file,
/// and `EraseFailed` if any pass or the final unlink fails.  A failed
/// pass never proceeds to the unlink.
pub fn secure_erase(path: &Path) -> Result<()> {
    // symlink_metadata so a link is refused instead of erasing its target.
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FileVaultError::InvalidInput(format!(
                "cannot erase {}: file does not exist",
                path.display()
            )));
        }
        Err(e) => return Err(erase_failed(path, &e)),
    };
    if !meta.is_file() {
        return Err(FileVaultError::InvalidInput(format!(
            "cannot erase {}: not a regular file",
            path.display()
        )));
    }

    let len = meta.len();
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|mut file| overwrite_all(&mut file, len))
        .map_err(|e| erase_failed(path, &e))?;

    fs::remove_file(path).map_err(|e| erase_failed(path, &e))?;

    debug!(path = %path.display(), bytes = len, "securely erased file");
    Ok(())
}

/// Boolean form of `secure_erase`: `true` only if the file was
/// overwritten and removed.
pub fn erase(path: &Path) -> bool {
    secure_erase(path).is_ok()
}

fn erase_failed(path: &Path, err: &io::Error) -> FileVaultError {
    warn!(path = %path.display(), error = %err, "secure erase failed");
    FileVaultError::EraseFailed {
        path: path.to_path_buf(),
        entry_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records how many bytes each pass wrote and what the last pass left.
    #[derive(Default)]
    struct CountingFile {
        pos: usize,
        data: Vec<u8>,
        pass_bytes: Vec<usize>,
        syncs: usize,
        fail_on_pass: Option<usize>,
    }

    impl Write for CountingFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_on_pass == Some(self.pass_bytes.len()) {
                return Err(io::Error::other("disk full"));
            }
            let end = self.pos + buf.len();
            if self.data.len() < end {
                self.data.resize(end, 0);
            }
            self.data[self.pos..end].copy_from_slice(buf);
            self.pos = end;
            if let Some(last) = self.pass_bytes.last_mut() {
                *last += buf.len();
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for CountingFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            // Every pass starts with a rewind; use it to open a new counter.
            if pos == SeekFrom::Start(0) {
                self.pass_bytes.push(0);
                self.pos = 0;
            }
            Ok(self.pos as u64)
        }
    }

    impl ErasableFile for CountingFile {
        fn sync(&mut self) -> io::Result<()> {
            self.syncs += 1;
            Ok(())
        }
    }

    #[test]
    fn each_pass_writes_exactly_len_bytes() {
        let len = 10_000u64;
        let mut file = CountingFile::default();
        overwrite_all(&mut file, len).unwrap();

        assert_eq!(file.pass_bytes, vec![10_000, 10_000, 10_000]);
        assert_eq!(file.syncs, 3);
        assert_eq!(file.data.len(), 10_000);
    }

    #[test]
    fn fill_pass_writes_ff() {
        let mut file = CountingFile::default();
        overwrite_pass(&mut file, 5_000, Pattern::Fill(0xFF)).unwrap();
        assert!(file.data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn zero_length_file_writes_nothing_but_still_syncs() {
        let mut file = CountingFile::default();
        overwrite_all(&mut file, 0).unwrap();
        assert_eq!(file.pass_bytes, vec![0, 0, 0]);
        assert_eq!(file.syncs, 3);
    }

    #[test]
    fn failing_pass_aborts_remaining_passes() {
        let mut file = CountingFile {
            fail_on_pass: Some(2),
            ..CountingFile::default()
        };
        let result = overwrite_all(&mut file, 100);

        assert!(result.is_err());
        assert_eq!(file.pass_bytes.len(), 2, "third pass must not start");
        assert_eq!(file.syncs, 1);
    }
}
