//! Content hashing.

/// Stable content hash of a source file, stored on the migrated record
/// as `sourceHash`.
///
/// Unchanged hash across runs means the upsert can be skipped entirely.
#[inline]
pub fn source_hash<T: AsRef<[u8]> + ?Sized>(raw: &T) -> String {
    hex::encode(blake3::hash(raw.as_ref()).as_bytes())
}
