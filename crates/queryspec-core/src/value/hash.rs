use crate::value::Value;
use xxhash_rust::xxh3::Xxh3;

/// Value-hash format version byte used by canonical digest encoding.
pub(crate) const VALUE_HASH_VERSION: u8 = 1;

/// Stable XXH3 seed used by canonical value hashing.
pub(crate) const VALUE_HASH_SEED: u64 = 0;

///
/// StableHash
///
/// Fixed-width hash identifier derived from the leading 64 bits of the
/// canonical 128-bit digest.
///

pub(crate) type StableHash = u64;

pub(crate) fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}

pub(crate) fn feed_u32(h: &mut Xxh3, x: u32) {
    h.update(&x.to_be_bytes());
}

pub(crate) fn feed_i64(h: &mut Xxh3, x: i64) {
    h.update(&x.to_be_bytes());
}

pub(crate) fn feed_u64(h: &mut Xxh3, x: u64) {
    h.update(&x.to_be_bytes());
}

#[expect(clippy::cast_possible_truncation)]
pub(crate) fn feed_str(h: &mut Xxh3, s: &str) {
    feed_u32(h, s.len() as u32);
    h.update(s.as_bytes());
}

/// Canonical tag per variant; frozen so digests stay stable across releases.
const fn canonical_tag(value: &Value) -> u8 {
    match value {
        Value::Null => 0x00,
        Value::Bool(_) => 0x01,
        Value::Int(_) => 0x02,
        Value::Uint(_) => 0x03,
        Value::Float64(_) => 0x04,
        Value::Text(_) => 0x05,
        Value::List(_) => 0x06,
    }
}

#[expect(clippy::cast_possible_truncation)]
pub(crate) fn write_to_hasher(value: &Value, h: &mut Xxh3) {
    feed_u8(h, canonical_tag(value));

    match value {
        Value::Bool(b) => feed_u8(h, u8::from(*b)),
        Value::Float64(v) => h.update(&v.to_be_bytes()),
        Value::Int(i) => feed_i64(h, *i),
        Value::List(xs) => {
            feed_u32(h, xs.len() as u32);
            for x in xs {
                feed_u8(h, 0xFF);
                write_to_hasher(x, h);
            }
        }
        Value::Text(s) => feed_str(h, s),
        Value::Uint(u) => feed_u64(h, *u),
        Value::Null => {
            // No additional payload beyond canonical tag.
        }
    }
}

/// Start a versioned hasher shared by value and spec fingerprints.
pub(crate) fn new_hasher() -> Xxh3 {
    let mut h = Xxh3::with_seed(VALUE_HASH_SEED);
    feed_u8(&mut h, VALUE_HASH_VERSION);
    h
}

/// Derive one stable 64-bit hash from a canonical 128-bit digest.
#[must_use]
pub(crate) const fn stable_hash_from_digest(digest: [u8; 16]) -> StableHash {
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Finish a hasher into the stable 64-bit identifier.
#[must_use]
pub(crate) fn finish(h: &Xxh3) -> StableHash {
    stable_hash_from_digest(h.digest128().to_be_bytes())
}

///
/// TESTS
///
