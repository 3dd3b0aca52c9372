use super::{check_finite, check_timestamps, check_track_id, expect_len, Cursor, PutLe};
use crate::error::DecodeError;

/// Raw kinematic track as produced at the origin, 8 Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub track_id: i32,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub original_update_time: i64,
}

impl Track {
    pub const WIRE_SIZE: usize = 60;

    /// True iff the record satisfies the field invariants independent of how it
    /// was constructed (decoded, or built in-process).
    pub fn valid(&self) -> bool {
        check_finite(&[self.vx, self.vy, self.vz, self.px, self.py, self.pz]).is_ok()
            && check_track_id(self.track_id).is_ok()
            && check_timestamps(&[self.original_update_time]).is_ok()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        buf.put_i32(self.track_id);
        buf.put_f64(self.vx);
        buf.put_f64(self.vy);
        buf.put_f64(self.vz);
        buf.put_f64(self.px);
        buf.put_f64(self.py);
        buf.put_f64(self.pz);
        buf.put_i64(self.original_update_time);
        debug_assert_eq!(buf.len(), Self::WIRE_SIZE);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, Self::WIRE_SIZE)?;
        let mut c = Cursor::new(bytes);
        let record = Self {
            track_id: c.read_i32(),
            vx: c.read_f64(),
            vy: c.read_f64(),
            vz: c.read_f64(),
            px: c.read_f64(),
            py: c.read_f64(),
            pz: c.read_f64(),
            original_update_time: c.read_i64(),
        };
        check_finite(&[record.vx, record.vy, record.vz, record.px, record.py, record.pz])?;
        check_track_id(record.track_id)?;
        check_timestamps(&[record.original_update_time])?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let t = Track {
            track_id: 1234,
            vx: 100.0,
            vy: 200.0,
            vz: 50.0,
            px: 4_000_000.0,
            py: 3_000_000.0,
            pz: 5_000_000.0,
            original_update_time: 1_700_000_000_000,
        };
        let bytes = t.encode();
        assert_eq!(bytes.len(), Track::WIRE_SIZE);
        let decoded = Track::decode(&bytes).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn rejects_short_buffer() {
        let bytes = vec![0u8; Track::WIRE_SIZE - 1];
        assert_eq!(
            Track::decode(&bytes),
            Err(DecodeError::TooShort {
                expected: Track::WIRE_SIZE,
                actual: Track::WIRE_SIZE - 1
            })
        );
    }

    #[test]
    fn rejects_non_finite_position() {
        let mut t = Track {
            track_id: 1,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            px: f64::NAN,
            py: 0.0,
            pz: 0.0,
            original_update_time: 0,
        };
        assert!(!t.valid());
        let bytes = t.encode();
        assert_eq!(Track::decode(&bytes), Err(DecodeError::NonFinite));

        t.px = f64::INFINITY;
        let bytes = t.encode();
        assert_eq!(Track::decode(&bytes), Err(DecodeError::NonFinite));
    }

    #[test]
    fn rejects_invalid_track_id() {
        let t = Track {
            track_id: 0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            px: 0.0,
            py: 0.0,
            pz: 0.0,
            original_update_time: 0,
        };
        let bytes = t.encode();
        assert_eq!(Track::decode(&bytes), Err(DecodeError::InvalidTrackId));
    }

    #[test]
    fn ignores_trailing_bytes() {
        let t = Track {
            track_id: 5,
            vx: 1.0,
            vy: 2.0,
            vz: 3.0,
            px: 4.0,
            py: 5.0,
            pz: 6.0,
            original_update_time: 10,
        };
        let mut bytes = t.encode();
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(Track::decode(&bytes).unwrap(), t);
    }
}
