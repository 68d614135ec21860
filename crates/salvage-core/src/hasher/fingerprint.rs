use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const READ_CHUNK_LENGTH: usize = 8192; // 8KB

/// BLAKE3 digest of a file's full content. Stands in for byte equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 6 hex characters, for console summaries.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(6);
        hex
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<blake3::Hash> for ContentFingerprint {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

/// Stream `file` through BLAKE3 in fixed-size chunks.
pub fn fingerprint_file(file: &Path) -> io::Result<ContentFingerprint> {
    let mut f = File::open(file)?;
    fingerprint_reader(&mut f)
}

pub fn fingerprint_reader<R: Read>(reader: &mut R) -> io::Result<ContentFingerprint> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; READ_CHUNK_LENGTH];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hasher.finalize().into())
}

pub fn fingerprint_data(data: &[u8]) -> ContentFingerprint {
    blake3::hash(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_streamed_matches_one_shot() {
        // Larger than one read chunk so the loop runs more than once.
        let data: Vec<u8> = (0..(READ_CHUNK_LENGTH * 3 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, &data).unwrap();

        assert_eq!(fingerprint_file(&path).unwrap(), fingerprint_data(&data));
    }

    #[test]
    fn test_different_content_differs() {
        assert_ne!(fingerprint_data(b"let a = 1"), fingerprint_data(b"let a = 2"));
    }

    #[test]
    fn test_hex_and_short() {
        let fp = fingerprint_data(b"");
        let hex = fp.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(fp.short(), &hex[..6]);
        assert_eq!(fp.to_string(), hex);
    }

    #[test]
    fn test_missing_file_errors() {
        let dir = tempdir().unwrap();
        assert!(fingerprint_file(&dir.path().join("gone.swift")).is_err());
    }
}
