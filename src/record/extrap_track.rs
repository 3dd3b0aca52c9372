use super::{check_finite, check_timestamps, check_track_id, expect_len, Cursor, PutLe, Track};
use crate::error::DecodeError;

/// `Track` extrapolated to the 100 Hz output rate, stamped with the time it
/// left stage A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapTrack {
    pub track_id: i32,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub original_update_time: i64,
    pub update_time: i64,
    pub first_hop_sent_time: i64,
}

impl ExtrapTrack {
    pub const WIRE_SIZE: usize = 76;

    pub fn valid(&self) -> bool {
        check_finite(&[self.vx, self.vy, self.vz, self.px, self.py, self.pz]).is_ok()
            && check_track_id(self.track_id).is_ok()
            && check_timestamps(&[
                self.original_update_time,
                self.update_time,
                self.first_hop_sent_time,
            ])
            .is_ok()
    }

    /// The `Track` prefix of this record (fields are a strict superset).
    pub fn as_track(&self) -> Track {
        Track {
            track_id: self.track_id,
            vx: self.vx,
            vy: self.vy,
            vz: self.vz,
            px: self.px,
            py: self.py,
            pz: self.pz,
            original_update_time: self.original_update_time,
        }
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
        buf.put_i64(self.update_time);
        buf.put_i64(self.first_hop_sent_time);
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
            update_time: c.read_i64(),
            first_hop_sent_time: c.read_i64(),
        };
        check_finite(&[record.vx, record.vy, record.vz, record.px, record.py, record.pz])?;
        check_track_id(record.track_id)?;
        check_timestamps(&[
            record.original_update_time,
            record.update_time,
            record.first_hop_sent_time,
        ])?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtrapTrack {
        ExtrapTrack {
            track_id: 1234,
            vx: 100.0,
            vy: 200.0,
            vz: 50.0,
            px: 4_000_000.0,
            py: 3_000_000.0,
            pz: 5_000_000.0,
            original_update_time: 1_700_000_000_000,
            update_time: 1_700_000_000_000_000,
            first_hop_sent_time: 1_700_000_000_100,
        }
    }

    #[test]
    fn round_trip() {
        let t = sample();
        let bytes = t.encode();
        assert_eq!(bytes.len(), ExtrapTrack::WIRE_SIZE);
        assert_eq!(ExtrapTrack::decode(&bytes).unwrap(), t);
    }

    #[test]
    fn rejects_negative_timestamp() {
        let mut t = sample();
        t.first_hop_sent_time = -1;
        let bytes = t.encode();
        assert_eq!(
            ExtrapTrack::decode(&bytes),
            Err(DecodeError::NegativeTimestamp)
        );
    }
}
