//! Content fingerprints of migration sources.
//!
//! The digest covers the raw bytes of the whole defining unit, not just the
//! operation it registers: editing a comment or reformatting the file changes
//! the fingerprint and fails every store that already applied it.

use std::{fs::File, io};

use sha2::{Digest, Sha256};

use crate::migration::Source;

/// Returns the lowercase hex SHA-256 digest of `source`.
pub fn fingerprint(source: &Source) -> io::Result<String> {
    let mut hasher = Sha256::new();

    match source {
        Source::File(path) => {
            let mut file = File::open(path)?;
            io::copy(&mut file, &mut hasher)?;
        }
        Source::Embedded(bytes) => hasher.update(*bytes),
    }

    Ok(hex::encode(hasher.finalize()))
}
