//! Content identity for downloaded documents
//!
//! A document's canonical identity is the lowercase hex SHA-256 of its
//! full byte content. Two files with identical bytes are the same
//! document regardless of filename or source URL; the hash doubles as
//! the search engine document id and the manifest key.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Computes the content id of an in-memory byte buffer
pub fn content_id_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Computes the content id of a file on disk
///
/// Reads the full file; document files are small enough that streaming
/// the hash is not worth the complexity.
pub fn content_id(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(content_id_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn known_vector() {
        // sha256("hello world")
        assert_eq!(
            content_id_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn lowercase_hex_of_expected_length() {
        let id = content_id_bytes(b"");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn identical_bytes_same_id_regardless_of_name() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("first.pdf");
        let path_b = dir.path().join("second.pdf");
        for path in [&path_a, &path_b] {
            let mut file = std::fs::File::create(path).unwrap();
            file.write_all(b"%PDF-1.4 same bytes").unwrap();
        }

        assert_eq!(content_id(&path_a).unwrap(), content_id(&path_b).unwrap());
    }

    #[test]
    fn different_bytes_different_id() {
        assert_ne!(content_id_bytes(b"one"), content_id_bytes(b"two"));
    }
}
