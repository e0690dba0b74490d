//! File reading and content digests.
//!
//! Both are traits so the pipeline can be driven with an instrumented reader
//! (bound checks, injected failures) or another digest function.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::types::Digest;
use crate::utils::config::HashingConsts;

/// Pure function from bytes to a fixed-size digest. Cannot fail once the bytes are in memory.
pub trait ContentDigest: Send + Sync {
    fn digest(&self, bytes: &[u8]) -> Digest;
}

/// Blake3 over the whole buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Digest;

impl ContentDigest for Blake3Digest {
    fn digest(&self, bytes: &[u8]) -> Digest {
        *blake3::hash(bytes).as_bytes()
    }
}

/// Whole contents of one file: owned buffer or a read-only mapping.
pub enum FileBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Owned(v) => v,
            FileBytes::Mapped(m) => m,
        }
    }
}

impl From<Vec<u8>> for FileBytes {
    fn from(v: Vec<u8>) -> Self {
        FileBytes::Owned(v)
    }
}

/// Blocking whole-file read. Each call holds at most one open descriptor until it returns.
pub trait FileReader: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<FileBytes>;
}

/// Default reader: `fs::read`, or mmap above [`HashingConsts::MMAP_THRESHOLD`].
#[derive(Clone, Copy, Debug)]
pub struct FsReader {
    pub mmap_threshold: u64,
}

impl Default for FsReader {
    fn default() -> Self {
        Self {
            mmap_threshold: HashingConsts::MMAP_THRESHOLD,
        }
    }
}

impl FileReader for FsReader {
    fn read_file(&self, path: &Path) -> io::Result<FileBytes> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size > self.mmap_threshold {
            // SAFETY: read-only mapping; a concurrent truncate can still SIGBUS, same as any mmap reader.
            let mmap = unsafe { Mmap::map(&file)? };
            return Ok(FileBytes::Mapped(mmap));
        }
        use std::io::Read;
        let mut buf = Vec::with_capacity(size as usize);
        let mut file = file;
        file.read_to_end(&mut buf)?;
        Ok(FileBytes::Owned(buf))
    }
}

/// Reader and digest function used by one run. Shared by every worker.
#[derive(Clone)]
pub struct DigestBackend {
    pub reader: Arc<dyn FileReader>,
    pub digester: Arc<dyn ContentDigest>,
}

impl Default for DigestBackend {
    fn default() -> Self {
        Self {
            reader: Arc::new(FsReader::default()),
            digester: Arc::new(Blake3Digest),
        }
    }
}

impl DigestBackend {
    /// Default digest function over a custom reader.
    pub fn with_reader(reader: Arc<dyn FileReader>) -> Self {
        Self {
            reader,
            ..Self::default()
        }
    }

    pub fn digest_file(&self, path: &Path) -> io::Result<Digest> {
        digest_file(self.reader.as_ref(), self.digester.as_ref(), path)
    }
}

/// Read `path` with `reader` and digest it.
pub fn digest_file(
    reader: &dyn FileReader,
    digester: &dyn ContentDigest,
    path: &Path,
) -> io::Result<Digest> {
    let bytes = reader.read_file(path)?;
    Ok(digester.digest(&bytes))
}

/// Lowercase hex of a digest.
pub fn digest_to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blake3_digest_matches_reference() {
        let d = Blake3Digest.digest(b"hello");
        assert_eq!(d, *blake3::hash(b"hello").as_bytes());
        assert_ne!(d, Blake3Digest.digest(b"world"));
    }

    #[test]
    fn test_fs_reader_small_and_mapped_agree() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&vec![0xABu8; 8192]).unwrap();
        f.flush().unwrap();

        let owned = FsReader::default().read_file(f.path()).unwrap();
        assert!(matches!(owned, FileBytes::Owned(_)));
        let mapped = FsReader { mmap_threshold: 0 }.read_file(f.path()).unwrap();
        assert!(matches!(mapped, FileBytes::Mapped(_)));
        assert_eq!(&*owned, &*mapped);
    }

    #[test]
    fn test_digest_file_missing_is_error() {
        let err = digest_file(
            &FsReader::default(),
            &Blake3Digest,
            Path::new("/definitely/not/here.txt"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_digest_to_hex() {
        let hex = digest_to_hex(&[0u8; 32]);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c == '0'));
    }
}
