//! VM script representation.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// An immutable, hashable sequence of bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    bytes: Vec<u8>,
}

impl Script {
    /// Wraps raw bytecode as a script.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytecode.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of bytes in the script.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the script is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Computes the 20-byte script hash (SHA-256 then RIPEMD-160, matching
    /// the NEO convention for deriving contract hashes from bytecode).
    pub fn hash(&self) -> [u8; 20] {
        let sha = Sha256::digest(&self.bytes);
        let ripemd = Ripemd160::digest(sha);
        let mut out = [0u8; 20];
        out.copy_from_slice(&ripemd);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = Script::new(vec![0x51, 0x66]);
        let b = Script::new(vec![0x51, 0x66]);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn different_scripts_hash_differently() {
        let a = Script::new(vec![0x51]);
        let b = Script::new(vec![0x52]);
        assert_ne!(a.hash(), b.hash());
    }
}
