//! Text/binary classification from a file prefix.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Number of leading bytes inspected when classifying a file.
pub const SNIFF_PREFIX_BYTES: u64 = 1024;

/// Result of sniffing a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Text,
    Binary,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Text => write!(f, "text"),
            Classification::Binary => write!(f, "binary"),
        }
    }
}

/// Classify a byte buffer. Only the first [`SNIFF_PREFIX_BYTES`] are considered.
pub fn classify_bytes(bytes: &[u8]) -> Classification {
    let end = bytes.len().min(SNIFF_PREFIX_BYTES as usize);
    match std::str::from_utf8(&bytes[..end]) {
        Ok(_) => Classification::Text,
        Err(_) => Classification::Binary,
    }
}

/// Classify a file by reading at most [`SNIFF_PREFIX_BYTES`] of it.
///
/// Never fails: unreadable files are reported as [`Classification::Binary`].
/// A multi-byte character cut by the prefix boundary also counts as binary.
pub fn classify(path: &Path) -> Classification {
    let mut prefix = Vec::with_capacity(SNIFF_PREFIX_BYTES as usize);

    let read = File::open(path).and_then(|file| file.take(SNIFF_PREFIX_BYTES).read_to_end(&mut prefix));

    match read {
        Ok(_) => {
            let classification = classify_bytes(&prefix);
            debug!(path = %path.display(), %classification, "sniffed file");
            classification
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error reading file, treating as binary");
            Classification::Binary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_plain_text_is_text() {
        let file = write_temp("hello, wörld\n".as_bytes());
        assert_eq!(classify(file.path()), Classification::Text);
    }

    #[test]
    fn test_empty_file_is_text() {
        let file = write_temp(b"");
        assert_eq!(classify(file.path()), Classification::Text);
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        let file = write_temp(&[0x49, 0x44, 0x33, 0xff, 0xfe, 0x00]);
        assert_eq!(classify(file.path()), Classification::Binary);
    }

    #[test]
    fn test_missing_file_is_binary() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            classify(&dir.path().join("nope.txt")),
            Classification::Binary
        );
    }

    #[test]
    fn test_only_prefix_is_inspected() {
        let mut bytes = vec![b'a'; SNIFF_PREFIX_BYTES as usize];
        bytes.extend_from_slice(&[0xff, 0xff, 0xff]);
        let file = write_temp(&bytes);
        assert_eq!(classify(file.path()), Classification::Text);
    }

    #[test]
    fn test_character_split_at_boundary_is_binary() {
        // 'é' is two bytes; place its first byte at the last prefix position
        let mut bytes = vec![b'a'; SNIFF_PREFIX_BYTES as usize - 1];
        bytes.extend_from_slice("é".as_bytes());
        assert_eq!(classify_bytes(&bytes), Classification::Binary);
    }
}
