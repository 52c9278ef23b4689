//! Stable name hashing.
//!
//! Entries are keyed by the 64-bit FNV-1a hash of their UTF-8 name. Two equal
//! names always produce the same [`NameHash`]; two different names that happen
//! to collide are treated as the same entry.

use std::fmt;

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// Computes the 64-bit FNV-1a hash of `bytes`.
pub const fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// The registry key for an entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameHash(u64);

impl NameHash {
    /// Hashes `name`. Usable in `const` context so hot code can pre-hash names.
    pub const fn of(name: &str) -> Self {
        Self(fnv1a64(name.as_bytes()))
    }
}

impl From<&str> for NameHash {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

impl From<&String> for NameHash {
    fn from(name: &String) -> Self {
        Self::of(name)
    }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn const_and_runtime_hashes_agree() {
        const HASHED: NameHash = NameHash::of("render.fov");
        let name = String::from("render.fov");
        assert_eq!(HASHED, NameHash::from(&name));
        assert_ne!(HASHED, NameHash::of("render.fow"));
    }
}
