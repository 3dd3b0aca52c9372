//! Fixed-layout binary record types and their lineage.
//!
//! `Track` → `ExtrapTrack` → `DelayTrack` → `FinalTrack`, each a superset of
//! the previous with fields appended only. All multi-byte fields are
//! little-endian; positions/velocities are IEEE-754 binary64 in ECEF.

mod delay_track;
mod extrap_track;
mod final_track;
mod track;

pub use delay_track::DelayTrack;
pub use extrap_track::ExtrapTrack;
pub use final_track::FinalTrack;
pub use track::Track;

use crate::error::DecodeError;

pub(crate) fn check_finite(components: &[f64]) -> Result<(), DecodeError> {
    if components.iter().any(|c| !c.is_finite()) {
        return Err(DecodeError::NonFinite);
    }
    Ok(())
}

pub(crate) fn check_track_id(track_id: i32) -> Result<(), DecodeError> {
    if track_id < 1 {
        return Err(DecodeError::InvalidTrackId);
    }
    Ok(())
}

pub(crate) fn check_timestamps(timestamps: &[i64]) -> Result<(), DecodeError> {
    if timestamps.iter().any(|&t| t < 0) {
        return Err(DecodeError::NegativeTimestamp);
    }
    Ok(())
}

pub(crate) fn expect_len(bytes: &[u8], expected: usize) -> Result<(), DecodeError> {
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Reads a little-endian field out of `bytes` at `offset`, advancing a
/// running cursor. Kept tiny and inline rather than pulling in a byte-order
/// crate the rest of this codebase has no other use for.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn read_i32(&mut self) -> i32 {
        let v = i32::from_le_bytes(self.bytes[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        v
    }

    pub(crate) fn read_i64(&mut self) -> i64 {
        let v = i64::from_le_bytes(self.bytes[self.pos..self.pos + 8].try_into().unwrap());
        self.pos += 8;
        v
    }

    pub(crate) fn read_f64(&mut self) -> f64 {
        let v = f64::from_le_bytes(self.bytes[self.pos..self.pos + 8].try_into().unwrap());
        self.pos += 8;
        v
    }
}

/// Appends little-endian bytes to `buf`. Mirrors `Cursor` for encoding.
pub(crate) trait PutLe {
    fn put_i32(&mut self, v: i32);
    fn put_i64(&mut self, v: i64);
    fn put_f64(&mut self, v: f64);
}

impl PutLe for Vec<u8> {
    fn put_i32(&mut self, v: i32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_f64(&mut self, v: f64) {
        self.extend_from_slice(&v.to_le_bytes());
    }
}
