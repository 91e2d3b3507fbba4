//! Content digests identifying a chart source.
//!
//! Both digests are fed from one pass over the bytes, so a [`DigestReader`] can sit between the
//! file and the decoder.

use std::{
    io::{self, Read},
    path::PathBuf,
};

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::model::ChartIdentity;

/// Lowercase hex MD5 and SHA-256 digests of a chart source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartDigest {
    /// MD5 digest.
    pub md5: String,
    /// SHA-256 digest.
    pub sha256: String,
}

impl ChartDigest {
    /// Digests bytes in memory.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut reader = DigestReader::new(io::empty());
        reader.update(bytes);
        reader.finish()
    }

    /// Identity of the chart at `path` with these digests.
    #[must_use]
    pub fn into_identity(self, path: impl Into<PathBuf>) -> ChartIdentity {
        ChartIdentity {
            md5: self.md5,
            sha256: self.sha256,
            path: path.into(),
        }
    }
}

/// A reader digesting every byte read through it.
#[derive(Debug)]
pub struct DigestReader<R> {
    inner: R,
    md5: Md5,
    sha256: Sha256,
}

impl<R> DigestReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            md5: Md5::new(),
            sha256: Sha256::new(),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        self.md5.update(bytes);
        self.sha256.update(bytes);
    }

    /// Digests of the bytes read so far.
    #[must_use]
    pub fn finish(self) -> ChartDigest {
        ChartDigest {
            md5: format!("{:x}", self.md5.finalize()),
            sha256: format!("{:x}", self.sha256.finalize()),
        }
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.update(buf.get(..read).unwrap_or_default());
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn known_digests_of_empty_input() {
        let digest = ChartDigest::of(b"");
        assert_eq!(digest.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            digest.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn reader_matches_in_memory_digest() {
        let bytes = b"osu file format v14\n\n[General]\nMode: 3\n".repeat(100);
        let mut reader = DigestReader::new(bytes.as_slice());
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).expect("read from slice");
        assert_eq!(sink, bytes);
        assert_eq!(reader.finish(), ChartDigest::of(&bytes));
    }
}
