use core::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A symmetric key held only for the duration of a call.
///
/// The bytes are wiped when the value is dropped and never appear in `Debug`
/// output. It is not `PartialEq`; equality checks go through `expose()`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Draws a fresh key of `len` bytes from the operating system CSPRNG.
    pub fn generate(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Secret { bytes }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Secret { bytes }
    }

    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {}])", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_len_and_freshness() {
        let a = Secret::generate(32);
        let b = Secret::generate(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn test_debug_redacts() {
        let s = Secret::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let out = format!("{:?}", s);
        assert!(!out.contains("de"));
        assert!(out.contains("REDACTED"));
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut s = Secret::from_bytes(vec![1, 2, 3]);
        s.zeroize();
        assert!(s.is_empty());
    }
}
