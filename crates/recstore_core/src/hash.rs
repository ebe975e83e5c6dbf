//! Query identity hashing.

use sha1::{Digest, Sha1};

/// Calculates the cache key for a query.
///
/// The key is `hex(SHA1(salt + query))`, with a process-wide salt so that
/// deployments sharing one cache server do not collide. The hash addresses
/// cache entries only; it is never used to address physical storage.
#[must_use]
pub fn query_hash(salt: &str, query: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(salt.as_bytes());
    hasher.update(query.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
